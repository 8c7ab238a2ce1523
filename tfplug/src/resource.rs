//! Resource trait and related types
//!
//! This module defines the Resource trait and the optional import trait.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostics, DynamicValue, PrivateStateData};
use async_trait::async_trait;

/// Base trait for resources - implement CRUD operations.
/// Type name should be constant and match the name the provider registers.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. "ipm_ndu"
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(&self, ctx: Context, request: ResourceSchemaRequest) -> ResourceSchemaResponse;

    /// Called during plan to validate configuration. Runs the schema validators by default.
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let schema = self.schema(ctx, ResourceSchemaRequest).await.schema;
        ValidateResourceConfigResponse {
            diagnostics: schema.validate(&request.config.value),
        }
    }

    /// Applies the schema plan modifiers to the proposed state
    async fn modify_plan(&self, ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let schema = self.schema(ctx, ResourceSchemaRequest).await.schema;
        let mut planned_state = request.proposed_new_state;
        let outcome = schema.modify_plan(
            &request.config.value,
            &request.prior_state.value,
            &mut planned_state.value,
        );
        ModifyPlanResponse {
            planned_state,
            requires_replace: outcome.requires_replace,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Must populate all attributes in response.new_state, computed ones included
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// Returns `new_state: None` when the remote object no longer exists
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;

    /// Import support, for resources that implement ResourceWithImportState
    fn as_importable(&self) -> Option<&dyn ResourceWithImportState> {
        None
    }
}

pub struct ResourceMetadataRequest;

pub struct ResourceMetadataResponse {
    pub type_name: String,
}

pub struct ResourceSchemaRequest;

pub struct ResourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

pub struct ValidateResourceConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Diagnostics,
}

pub struct ModifyPlanRequest {
    pub config: DynamicValue,
    pub prior_state: DynamicValue,
    pub proposed_new_state: DynamicValue,
}

pub struct ModifyPlanResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Diagnostics,
}

pub struct CreateResourceRequest {
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub private: PrivateStateData,
    pub diagnostics: Diagnostics,
}

pub struct ReadResourceRequest {
    pub current_state: DynamicValue,
    pub private: PrivateStateData,
}

pub struct ReadResourceResponse {
    pub new_state: Option<DynamicValue>,
    pub private: PrivateStateData,
    pub diagnostics: Diagnostics,
}

pub struct UpdateResourceRequest {
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
    pub private: PrivateStateData,
}

pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub private: PrivateStateData,
    pub diagnostics: Diagnostics,
}

pub struct DeleteResourceRequest {
    pub prior_state: DynamicValue,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Diagnostics,
}

/// Optional interface for import functionality
#[async_trait]
pub trait ResourceWithImportState: Resource {
    /// Called during "terraform import". The returned state is read right after.
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;
}

pub struct ImportResourceStateRequest {
    pub id: String,
}

pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Diagnostics,
}

pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
    pub private: PrivateStateData,
}
