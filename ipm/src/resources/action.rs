//! `ipm_action`: fires a one-shot action such as `coldStart` or `retry`.
//!
//! Every input forces replacement, so a changed action runs again. Reading
//! never touches the API and deleting only forgets the record.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceSchemaRequest,
    ResourceSchemaResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestingMode, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Diagnostics, DynamicValue, PrivateStateData};
use tfplug::validator::{StringOneOf, StringPattern};
use tracing::Instrument;

use super::engine_diagnostic;
use crate::api::Transport;
use crate::engine::{self, ResourceIdentifier};

pub const TYPE_NAME: &str = "ipm_action";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionModel {
    pub resource_type: Option<String>,
    pub action: Option<String>,
    /// JSON request body, sent as is
    pub body: Option<String>,
    pub identifier: Option<ResourceIdentifier>,
    pub id: Option<String>,
    pub result: Option<String>,
}

pub struct ActionResource {
    transport: Arc<dyn Transport>,
}

impl ActionResource {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn schema_static() -> Schema {
        let col_id = |name: &str| {
            AttributeBuilder::new(name, AttributeType::String)
                .optional()
                .validator(StringPattern::digits())
                .plan_modifier(RequiresReplace)
                .build()
        };
        let plain = |name: &str| {
            AttributeBuilder::new(name, AttributeType::String)
                .optional()
                .plan_modifier(RequiresReplace)
                .build()
        };
        let identifier = SchemaBuilder::new()
            .attribute(plain("device_id"))
            .attribute(col_id("grand_parent_col_id"))
            .attribute(col_id("parent_col_id"))
            .attribute(col_id("col_id"))
            .attribute(plain("aid"))
            .attribute(plain("id"))
            .attribute(plain("href"))
            .build();

        SchemaBuilder::new()
            .description("Runs an action against an IPM resource")
            .attribute(
                AttributeBuilder::new("resource_type", AttributeType::String)
                    .description("Target type, e.g. \"NDU Port\", or raw_action to send action as a full path")
                    .required()
                    .validator(StringOneOf::new(engine::action_type_names()))
                    .plan_modifier(RequiresReplace)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("action", AttributeType::String)
                    .description("Action name, e.g. coldStart")
                    .required()
                    .plan_modifier(RequiresReplace)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("body", AttributeType::String)
                    .description("Optional JSON request body")
                    .optional()
                    .plan_modifier(RequiresReplace)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Path the action was posted to")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("result", AttributeType::String)
                    .description("Response text; empty when the action was only accepted")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .block("identifier", NestingMode::Single, identifier)
            .build()
    }

    async fn run(&self, model: &mut ActionModel, diagnostics: &mut Diagnostics) {
        let resource_type = model.resource_type.clone().unwrap_or_default();
        let action = model.action.clone().unwrap_or_default();
        let identifier = model.identifier.clone().unwrap_or_default();

        let body = match model.body.as_deref().filter(|b| !b.trim().is_empty()) {
            None => None,
            Some(raw) => match serde_json::from_str(raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    diagnostics.push(
                        Diagnostic::error("Invalid action body", e.to_string())
                            .with_attribute(AttributePath::new("body")),
                    );
                    return;
                }
            },
        };

        match engine::dispatch_action(self.transport.as_ref(), &resource_type, &identifier, &action, body).await {
            Ok(dispatched) => {
                tracing::info!(path = %dispatched.path, "action dispatched");
                model.id = Some(dispatched.path);
                model.result = Some(dispatched.response);
            }
            Err(e) => diagnostics.push(engine_diagnostic(&format!("Action {} failed", action), &e)),
        }
    }
}

#[async_trait]
impl Resource for ActionResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _ctx: Context, _request: ResourceSchemaRequest) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = Diagnostics::new();
        let mut model: ActionModel = match request.planned_state.to_model() {
            Ok(model) => model,
            Err(e) => {
                diagnostics.add_error("Invalid ipm_action value", e.to_string());
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    private: PrivateStateData::new(),
                    diagnostics,
                };
            }
        };

        self.run(&mut model, &mut diagnostics)
            .instrument(ctx.span().clone())
            .await;

        let new_state = match DynamicValue::from_model(&model) {
            Ok(state) => state,
            Err(e) => {
                diagnostics.add_error("Failed to encode ipm_action state", e.to_string());
                request.planned_state
            }
        };
        CreateResourceResponse {
            new_state,
            private: PrivateStateData::new(),
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            private: request.private,
            diagnostics: Diagnostics::new(),
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            private: request.private,
            diagnostics: Diagnostics::new(),
        }
    }

    async fn delete(&self, _ctx: Context, _request: DeleteResourceRequest) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: Diagnostics::new(),
        }
    }
}
