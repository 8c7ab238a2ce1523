//! `ipm_ndu`: a network device unit, the top of the NDU hierarchy

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::schema::{AttributeType, NestingMode, Schema, SchemaBuilder};

use super::{
    config_attribute, device_identifier_schema, state_attribute, with_header, Body, ResourceModel,
};
use crate::engine::{
    DeviceIdentifier, EngineError, MergePolicy, Populate, Populator, ResourceIdentifier,
    ResourceKind, StateHeader, Tracked,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NduConfig {
    pub name: Option<String>,
    pub location: Option<String>,
    pub host_name: Option<String>,
}

impl Populate for NduConfig {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "name" => p.string(key, value, &mut self.name, MergePolicy::OverwriteIfPresent),
            "location" => p.string(key, value, &mut self.location, MergePolicy::OverwriteIfPresent),
            "hostName" => p.string(key, value, &mut self.host_name, MergePolicy::OverwriteIfPresent),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NduState {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub software_version: Option<String>,
    pub lifecycle_state: Option<String>,
    pub port_count: Option<i64>,
}

impl Populate for NduState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "name" => p.string(key, value, &mut self.name, policy),
            "serialNumber" => p.string(key, value, &mut self.serial_number, policy),
            "softwareVersion" => p.string(key, value, &mut self.software_version, policy),
            "lifecycleState" => p.string(key, value, &mut self.lifecycle_state, policy),
            "portCount" => p.integer(key, value, &mut self.port_count, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NduModel {
    pub identifier: Option<DeviceIdentifier>,
    #[serde(flatten)]
    pub header: StateHeader,
    pub config: Option<NduConfig>,
    pub state: Option<NduState>,
}

impl Populate for NduModel {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
            "state" => p.object(key, value, &mut self.state, MergePolicy::AlwaysOverwrite),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

impl Tracked for NduModel {
    const KIND: ResourceKind = ResourceKind::Ndu;

    fn identifier(&self) -> ResourceIdentifier {
        self.identifier.clone().map(Into::into).unwrap_or_default()
    }

    fn header(&self) -> &StateHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut StateHeader {
        &mut self.header
    }
}

impl ResourceModel for NduModel {
    const TYPE_NAME: &'static str = "ipm_ndu";

    fn schema() -> Schema {
        let config = SchemaBuilder::new()
            .attribute(
                config_attribute("name", AttributeType::String)
                    .description("Display name")
                    .build(),
            )
            .attribute(config_attribute("location", AttributeType::String).build())
            .attribute(
                config_attribute("host_name", AttributeType::String)
                    .description("Management host name")
                    .build(),
            )
            .build();

        with_header(SchemaBuilder::new())
            .version(0)
            .description("Network device unit managed by IPM")
            .block("identifier", NestingMode::Single, device_identifier_schema())
            .block("config", NestingMode::Single, config)
            .attribute(state_attribute(&[
                ("name", AttributeType::String),
                ("serial_number", AttributeType::String),
                ("software_version", AttributeType::String),
                ("lifecycle_state", AttributeType::String),
                ("port_count", AttributeType::Number),
            ]))
            .build()
    }

    fn config_body(&self) -> Value {
        let Some(config) = &self.config else {
            return Body::new().build();
        };
        Body::new()
            .field("name", &config.name)
            .field("location", &config.location)
            .field("hostName", &config.host_name)
            .build()
    }
}
