//! Terraform resources.
//!
//! Every engine-addressable resource is a typed model driven by one generic
//! [`ModelResource`]. `ipm_action` is the exception: it dispatches one-shot
//! actions and never reads anything back.

pub mod action;
pub mod dsc;
pub mod module_carrier;
pub mod ndu;
pub mod ndu_edfa;
pub mod ndu_port;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Diagnostics, DynamicValue, PrivateStateData};
use tracing::Instrument;

use crate::api::Transport;
use crate::engine::{self, Creation, Deletion, EngineError, Tracked};

pub use action::ActionResource;

/// Private-state key set by import; the next read populates with force
pub(crate) const FORCE_POPULATE_KEY: &str = "force_populate";

/// A typed resource state the generic resource can drive
pub trait ResourceModel:
    Tracked + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    const TYPE_NAME: &'static str;

    fn schema() -> Schema;

    /// Request body carrying the user-settable config, in API field names
    fn config_body(&self) -> Value;
}

/// Builds an API request body from the fields that are set
#[derive(Debug, Default)]
pub(crate) struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: Clone + Into<Value>>(mut self, key: &str, value: &Option<T>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.clone().into());
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

/// `id`, `parent_id`, `href` and `col_id`, all server-assigned
pub(crate) fn with_header(builder: SchemaBuilder) -> SchemaBuilder {
    builder
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .description("Server-assigned identifier")
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("parent_id", AttributeType::String)
                .description("Identifier of the containing resource")
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("href", AttributeType::String)
                .description("Server-issued link to this resource")
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("col_id", AttributeType::Number)
                .description("Position within the parent collection")
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
}

/// Config attribute the server may fill in on create and import
pub(crate) fn config_attribute(name: &str, type_: AttributeType) -> AttributeBuilder {
    AttributeBuilder::new(name, type_)
        .optional()
        .computed()
        .plan_modifier(UseStateForUnknown)
}

fn identifier_attribute(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional()
        .plan_modifier(RequiresReplace)
        .build()
}

/// Hierarchical identifier block. Changing any field replaces the resource.
pub(crate) fn identifier_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(identifier_attribute("device_id", "Owning device"))
        .attribute(identifier_attribute("grand_parent_col_id", "Column id two levels up"))
        .attribute(identifier_attribute("parent_col_id", "Column id of the parent"))
        .attribute(identifier_attribute("col_id", "Column id within the parent"))
        .attribute(identifier_attribute("aid", "Device-assigned alias"))
        .attribute(identifier_attribute("id", "Server-assigned id"))
        .attribute(identifier_attribute("href", "Server-issued link"))
        .build()
}

/// Device-level identifier block
pub(crate) fn device_identifier_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(identifier_attribute("device_id", "Device id"))
        .attribute(identifier_attribute("href", "Server-issued link"))
        .build()
}

/// Read-only `state` object attribute
pub(crate) fn state_attribute(fields: &[(&str, AttributeType)]) -> tfplug::schema::Attribute {
    let fields = fields
        .iter()
        .map(|(name, type_)| (name.to_string(), type_.clone()))
        .collect();
    AttributeBuilder::new("state", AttributeType::Object(fields))
        .description("Values reported by the device")
        .computed()
        .plan_modifier(UseStateForUnknown)
        .build()
}

pub(crate) fn engine_diagnostic(summary: &str, err: &EngineError) -> Diagnostic {
    let diagnostic = Diagnostic::error(summary, err.to_string());
    match err {
        EngineError::MissingIdentifier | EngineError::IncompleteIdentifier { .. } => {
            diagnostic.with_attribute(AttributePath::new("identifier"))
        }
        _ => diagnostic,
    }
}

fn decode<M: ResourceModel>(value: &DynamicValue, diagnostics: &mut Diagnostics) -> Option<M> {
    match value.to_model::<M>() {
        Ok(model) => Some(model),
        Err(e) => {
            diagnostics.add_error(format!("Invalid {} value", M::TYPE_NAME), e.to_string());
            None
        }
    }
}

fn encode<M: ResourceModel>(model: &M, fallback: DynamicValue, diagnostics: &mut Diagnostics) -> DynamicValue {
    match DynamicValue::from_model(model) {
        Ok(value) => value,
        Err(e) => {
            diagnostics.add_error(format!("Failed to encode {} state", M::TYPE_NAME), e.to_string());
            fallback
        }
    }
}

/// Terraform resource over any [`ResourceModel`]
pub struct ModelResource<M> {
    transport: Arc<dyn Transport>,
    _model: PhantomData<fn() -> M>,
}

impl<M: ResourceModel> ModelResource<M> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _model: PhantomData,
        }
    }
}

#[async_trait]
impl<M: ResourceModel> Resource for ModelResource<M> {
    fn type_name(&self) -> &str {
        M::TYPE_NAME
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: M::schema(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(mut model) = decode::<M>(&request.planned_state, &mut diagnostics) else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                private: PrivateStateData::new(),
                diagnostics,
            };
        };

        let body = model.config_body();
        match engine::create(self.transport.as_ref(), &mut model, body)
            .instrument(ctx.span().clone())
            .await
        {
            Ok(Creation::Confirmed) => {}
            Ok(Creation::Unaddressed) => diagnostics.add_warning(
                format!("{} created without an address", M::TYPE_NAME),
                "The server accepted the request but returned no href or id. \
                 Set identifier.device_id or import the resource by href.",
            ),
            Err(e) => {
                tracing::error!(parent: ctx.span(), error = %e, "create failed");
                diagnostics.push(engine_diagnostic(&format!("Failed to create {}", M::TYPE_NAME), &e));
            }
        }

        CreateResourceResponse {
            new_state: encode(&model, request.planned_state, &mut diagnostics),
            private: PrivateStateData::new(),
            diagnostics,
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = Diagnostics::new();
        let mut private = request.private;
        let force = private.remove_key(FORCE_POPULATE_KEY).is_some();

        let Some(mut model) = decode::<M>(&request.current_state, &mut diagnostics) else {
            return ReadResourceResponse {
                new_state: Some(request.current_state),
                private,
                diagnostics,
            };
        };

        match engine::read(self.transport.as_ref(), &mut model, force)
            .instrument(ctx.span().clone())
            .await
        {
            Ok(()) => {}
            Err(EngineError::NotFound) => {
                tracing::warn!(parent: ctx.span(), "resource gone, removing from state");
                return ReadResourceResponse {
                    new_state: None,
                    private,
                    diagnostics,
                };
            }
            Err(e) => {
                diagnostics.push(engine_diagnostic(&format!("Failed to read {}", M::TYPE_NAME), &e));
            }
        }

        ReadResourceResponse {
            new_state: Some(encode(&model, request.current_state, &mut diagnostics)),
            private,
            diagnostics,
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(mut model) = decode::<M>(&request.planned_state, &mut diagnostics) else {
            return UpdateResourceResponse {
                new_state: request.planned_state,
                private: request.private,
                diagnostics,
            };
        };

        let body = model.config_body();
        if let Err(e) = engine::update(self.transport.as_ref(), &mut model, body)
            .instrument(ctx.span().clone())
            .await
        {
            tracing::error!(parent: ctx.span(), error = %e, "update failed");
            diagnostics.push(engine_diagnostic(&format!("Failed to update {}", M::TYPE_NAME), &e));
        }

        UpdateResourceResponse {
            new_state: encode(&model, request.planned_state, &mut diagnostics),
            private: request.private,
            diagnostics,
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(model) = decode::<M>(&request.prior_state, &mut diagnostics) else {
            return DeleteResourceResponse { diagnostics };
        };

        match engine::delete(self.transport.as_ref(), &model)
            .instrument(ctx.span().clone())
            .await
        {
            Ok(Deletion::Deleted) => {}
            Ok(Deletion::Forgotten) => diagnostics.add_warning(
                format!("{} removed from state only", M::TYPE_NAME),
                "The entity is backed by hardware and stays on the device.",
            ),
            Err(e) => {
                diagnostics.push(engine_diagnostic(&format!("Failed to delete {}", M::TYPE_NAME), &e));
            }
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_importable(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl<M: ResourceModel> ResourceWithImportState for ModelResource<M> {
    /// The import id is the resource href, e.g. `/ndus/n1/ports/3`
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: Vec::new(),
            diagnostics: Diagnostics::new(),
        };

        if !request.id.starts_with('/') {
            response.diagnostics.add_error(
                "Invalid import id",
                format!("expected an href such as /ndus/<id>, got {:?}", request.id),
            );
            return response;
        }

        let mut private = PrivateStateData::new();
        private.set_key(FORCE_POPULATE_KEY, b"true".to_vec());
        import_state_passthrough_id(
            &ctx,
            M::TYPE_NAME,
            AttributePath::new("href"),
            private,
            &request,
            &mut response,
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::RecordingTransport;
    use crate::api::Method;
    use ndu::NduModel;
    use ndu_edfa::NduEdfaModel;
    use serde_json::json;
    use tfplug::types::Dynamic;

    fn value(json: Value) -> DynamicValue {
        DynamicValue::new(serde_json::from_value::<Dynamic>(json).unwrap())
    }

    #[tokio::test]
    async fn read_without_any_address_is_an_identifier_error() {
        let transport = Arc::new(RecordingTransport::new());
        let resource = ModelResource::<NduEdfaModel>::new(transport.clone());

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    current_state: value(json!({"identifier": {"device_id": "dev1"}})),
                    private: PrivateStateData::new(),
                },
            )
            .await;

        assert!(response.diagnostics.has_errors());
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("identifier"))
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_nested_resource_only_warns() {
        let transport = Arc::new(RecordingTransport::new());
        let resource = ModelResource::<NduEdfaModel>::new(transport.clone());

        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    prior_state: value(json!({"href": "/ndus/dev1/ports/3/edfa/7"})),
                },
            )
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_device_sends_delete() {
        let transport = Arc::new(RecordingTransport::new());
        let resource = ModelResource::<NduModel>::new(transport.clone());

        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    prior_state: value(json!({"href": "/ndus/n1", "identifier": null})),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(transport.calls()[0].method, Method::DELETE);
        assert_eq!(transport.calls()[0].path, "/ndus/n1");
    }

    #[tokio::test]
    async fn accepted_create_without_address_warns() {
        let transport = Arc::new(RecordingTransport::new().respond_status(202, ""));
        let resource = ModelResource::<NduModel>::new(transport.clone());
        let plan = value(json!({"config": {"name": "ndu-1"}}));

        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    planned_state: plan.clone(),
                    config: plan,
                },
            )
            .await;

        assert!(!response.diagnostics.has_errors());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("without an address"));
        assert_eq!(transport.paths(), vec!["/ndus".to_string()]);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("config").attribute("name"))
                .unwrap(),
            "ndu-1"
        );
    }

    #[tokio::test]
    async fn import_requires_an_href() {
        let resource = ModelResource::<NduModel>::new(Arc::new(RecordingTransport::new()));

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    id: "n1".to_string(),
                },
            )
            .await;
        assert!(response.diagnostics.has_errors());
        assert!(response.imported_resources.is_empty());

        let response = resource
            .import_state(
                Context::new(),
                ImportResourceStateRequest {
                    id: "/ndus/n1".to_string(),
                },
            )
            .await;
        let imported = &response.imported_resources[0];
        assert_eq!(imported.type_name, "ipm_ndu");
        assert!(imported.private.get_key(FORCE_POPULATE_KEY).is_some());
    }

    #[tokio::test]
    async fn undecodable_state_is_reported() {
        let resource = ModelResource::<NduModel>::new(Arc::new(RecordingTransport::new()));

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    current_state: value(json!({"col_id": "not a number"})),
                    private: PrivateStateData::new(),
                },
            )
            .await;

        assert!(response.diagnostics.has_errors());
        assert!(response.new_state.is_some());
    }

    #[test]
    fn body_skips_unset_fields() {
        let body = Body::new()
            .field("name", &Some("x".to_string()))
            .field::<i64>("frequency", &None)
            .field("enabled", &Some(false))
            .build();
        assert_eq!(body, json!({"name": "x", "enabled": false}));
    }

    #[test]
    fn config_written_on_create_is_computed() {
        let schemas = [
            NduModel::schema(),
            ndu_port::NduPortModel::schema(),
            NduEdfaModel::schema(),
            module_carrier::ModuleCarrierModel::schema(),
            dsc::DscModel::schema(),
        ];
        for schema in schemas {
            let config = schema.nested_block("config").unwrap();
            for attribute in &config.block.attributes {
                assert!(attribute.optional, "{}", attribute.name);
                assert!(attribute.computed, "{}", attribute.name);
                assert_eq!(attribute.plan_modifiers.len(), 1, "{}", attribute.name);
            }
        }
    }
}
