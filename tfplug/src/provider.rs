//! Provider trait
//!
//! A provider is configured once, then acts as the factory for every resource
//! and data source instance. Factories hand each instance the client it needs.

use crate::context::Context;
use crate::data_source::DataSource;
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Diagnostics, DynamicValue};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by all resource type names, e.g. "ipm"
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Fails with "Provider not configured" until configure has succeeded
    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;

    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>>;

    fn resource_names(&self) -> Vec<&'static str>;

    fn data_source_names(&self) -> Vec<&'static str>;
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Diagnostics,
}
