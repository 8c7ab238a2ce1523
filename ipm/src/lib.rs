pub mod api;
pub mod data_sources;
pub mod engine;
pub mod resources;

use std::sync::Arc;

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Diagnostics, DynamicValue};
use tfplug::{DataSource, Resource, TfplugError};

use api::{Client, ClientConfig, Transport};
use resources::dsc::DscModel;
use resources::module_carrier::ModuleCarrierModel;
use resources::ndu::NduModel;
use resources::ndu_edfa::NduEdfaModel;
use resources::ndu_port::NduPortModel;
use resources::{ActionResource, ModelResource, ResourceModel};

pub struct IpmProvider {
    transport: Option<Arc<dyn Transport>>,
}

impl Default for IpmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IpmProvider {
    pub fn new() -> Self {
        Self { transport: None }
    }

    /// A provider that talks through `transport` instead of configuring a client
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    fn transport(&self) -> tfplug::Result<Arc<dyn Transport>> {
        self.transport
            .clone()
            .ok_or(TfplugError::ProviderNotConfigured)
    }
}

fn config_string(config: &DynamicValue, name: &str, env: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .or_else(|| std::env::var(env).ok())
        .filter(|v| !v.is_empty())
}

fn missing(name: &str, env: &str) -> Diagnostic {
    Diagnostic::error(
        format!("{} is required", name),
        format!("Set {} in the provider block or the {} environment variable", name, env),
    )
    .with_attribute(AttributePath::new(name))
}

#[async_trait]
impl Provider for IpmProvider {
    fn type_name(&self) -> &str {
        "ipm"
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .description("Optical-network management (IPM) provider")
            .attribute(
                AttributeBuilder::new("host", AttributeType::String)
                    .description("IPM base URL, e.g. https://ipm.example.com (IPM_HOST)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("IPM user (IPM_USERNAME)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("IPM password (IPM_PASSWORD)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification (IPM_INSECURE)")
                    .optional()
                    .build(),
            )
            .build()
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let config = &request.config;
        let host = config_string(config, "host", "IPM_HOST");
        let username = config_string(config, "username", "IPM_USERNAME");
        let password = config_string(config, "password", "IPM_PASSWORD");
        let insecure = config
            .get_bool(&AttributePath::new("insecure"))
            .ok()
            .or_else(|| {
                std::env::var("IPM_INSECURE")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
            })
            .unwrap_or(false);

        let mut diagnostics = Diagnostics::new();
        match (host, username, password) {
            (Some(host), Some(username), Some(password)) => {
                let client_config = ClientConfig::new(&host, &username, &password).insecure(insecure);
                match Client::new(client_config) {
                    Ok(client) => {
                        tracing::info!(parent: ctx.span(), host = %host, insecure, "provider configured");
                        self.transport = Some(Arc::new(client));
                    }
                    Err(e) => diagnostics.push(
                        Diagnostic::error("Failed to create API client", e.to_string())
                            .with_attribute(AttributePath::new("host")),
                    ),
                }
            }
            (host, username, password) => {
                if host.is_none() {
                    diagnostics.push(missing("host", "IPM_HOST"));
                }
                if username.is_none() {
                    diagnostics.push(missing("username", "IPM_USERNAME"));
                }
                if password.is_none() {
                    diagnostics.push(missing("password", "IPM_PASSWORD"));
                }
            }
        }

        ConfigureProviderResponse { diagnostics }
    }

    async fn create_resource(&self, name: &str) -> tfplug::Result<Box<dyn Resource>> {
        let transport = self.transport()?;

        match name {
            NduModel::TYPE_NAME => Ok(Box::new(ModelResource::<NduModel>::new(transport))),
            NduPortModel::TYPE_NAME => Ok(Box::new(ModelResource::<NduPortModel>::new(transport))),
            NduEdfaModel::TYPE_NAME => Ok(Box::new(ModelResource::<NduEdfaModel>::new(transport))),
            ModuleCarrierModel::TYPE_NAME => {
                Ok(Box::new(ModelResource::<ModuleCarrierModel>::new(transport)))
            }
            DscModel::TYPE_NAME => Ok(Box::new(ModelResource::<DscModel>::new(transport))),
            resources::action::TYPE_NAME => Ok(Box::new(ActionResource::new(transport))),
            _ => Err(TfplugError::ResourceNotFound(name.to_string())),
        }
    }

    async fn create_data_source(&self, name: &str) -> tfplug::Result<Box<dyn DataSource>> {
        let transport = self.transport()?;

        match name {
            data_sources::events::TYPE_NAME => {
                Ok(Box::new(data_sources::EventsDataSource::new(transport)))
            }
            _ => Err(TfplugError::DataSourceNotFound(name.to_string())),
        }
    }

    fn resource_names(&self) -> Vec<&'static str> {
        vec![
            NduModel::TYPE_NAME,
            NduPortModel::TYPE_NAME,
            NduEdfaModel::TYPE_NAME,
            ModuleCarrierModel::TYPE_NAME,
            DscModel::TYPE_NAME,
            resources::action::TYPE_NAME,
        ]
    }

    fn data_source_names(&self) -> Vec<&'static str> {
        vec![data_sources::events::TYPE_NAME]
    }
}
