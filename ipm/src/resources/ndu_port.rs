//! `ipm_ndu_port`: a port on an NDU together with its pluggables and amplifiers

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::schema::{AttributeBuilder, AttributeType, NestingMode, Schema, SchemaBuilder};

use super::{config_attribute, identifier_schema, state_attribute, with_header, Body, ResourceModel};
use crate::engine::{
    EngineError, MergePolicy, Populate, Populator, ResourceIdentifier, ResourceKind, StateHeader,
    Tracked,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    pub name: Option<String>,
    pub admin_state: Option<String>,
}

impl Populate for PortConfig {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "name" => p.string(key, value, &mut self.name, MergePolicy::OverwriteIfPresent),
            "adminState" => p.string(key, value, &mut self.admin_state, MergePolicy::OverwriteIfPresent),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortState {
    pub port_aid: Option<String>,
    pub port_type: Option<String>,
    pub oper_state: Option<String>,
}

impl Populate for PortState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "portAid" => p.string(key, value, &mut self.port_aid, policy),
            "portType" => p.string(key, value, &mut self.port_type, policy),
            "operState" => p.string(key, value, &mut self.oper_state, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildState {
    pub aid: Option<String>,
    pub oper_state: Option<String>,
}

impl Populate for ChildState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "tomAid" | "xrAid" | "edfaAid" => p.string(key, value, &mut self.aid, policy),
            "operState" => p.string(key, value, &mut self.oper_state, policy),
            _ => Ok(()),
        }
    }
}

/// A TOM, XR or EDFA reported under the port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortChild {
    #[serde(flatten)]
    pub header: StateHeader,
    pub state: Option<ChildState>,
}

impl Populate for PortChild {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "state" => p.object(key, value, &mut self.state, MergePolicy::AlwaysOverwrite),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NduPortModel {
    pub identifier: Option<ResourceIdentifier>,
    #[serde(flatten)]
    pub header: StateHeader,
    pub config: Option<PortConfig>,
    pub state: Option<PortState>,
    pub toms: Option<Vec<PortChild>>,
    pub xrs: Option<Vec<PortChild>>,
    pub edfas: Option<Vec<PortChild>>,
}

impl Populate for NduPortModel {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
            "state" => p.object(key, value, &mut self.state, policy),
            "tom" => p.list(key, value, &mut self.toms, policy),
            "xr" => p.list(key, value, &mut self.xrs, policy),
            "edfa" => p.list(key, value, &mut self.edfas, policy),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

impl Tracked for NduPortModel {
    const KIND: ResourceKind = ResourceKind::NduPort;

    fn identifier(&self) -> ResourceIdentifier {
        self.identifier.clone().unwrap_or_default()
    }

    fn header(&self) -> &StateHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut StateHeader {
        &mut self.header
    }
}

fn children_attribute(name: &str, description: &str) -> tfplug::schema::Attribute {
    let state = HashMap::from([
        ("aid".to_string(), AttributeType::String),
        ("oper_state".to_string(), AttributeType::String),
    ]);
    let child = HashMap::from([
        ("id".to_string(), AttributeType::String),
        ("parent_id".to_string(), AttributeType::String),
        ("href".to_string(), AttributeType::String),
        ("col_id".to_string(), AttributeType::Number),
        ("state".to_string(), AttributeType::Object(state)),
    ]);
    AttributeBuilder::new(name, AttributeType::List(Box::new(AttributeType::Object(child))))
        .description(description)
        .computed()
        .build()
}

impl ResourceModel for NduPortModel {
    const TYPE_NAME: &'static str = "ipm_ndu_port";

    fn schema() -> Schema {
        let config = SchemaBuilder::new()
            .attribute(config_attribute("name", AttributeType::String).build())
            .attribute(
                config_attribute("admin_state", AttributeType::String)
                    .description("unlock or lock")
                    .build(),
            )
            .build();

        with_header(SchemaBuilder::new())
            .description("Port on a network device unit")
            .block("identifier", NestingMode::Single, identifier_schema())
            .block("config", NestingMode::Single, config)
            .attribute(state_attribute(&[
                ("port_aid", AttributeType::String),
                ("port_type", AttributeType::String),
                ("oper_state", AttributeType::String),
            ]))
            .attribute(children_attribute("toms", "Transceiver optical modules in the port"))
            .attribute(children_attribute("xrs", "XR pluggables in the port"))
            .attribute(children_attribute("edfas", "Amplifiers in the port"))
            .build()
    }

    fn config_body(&self) -> Value {
        let config = self.config.clone().unwrap_or_default();
        Body::new()
            .field("name", &config.name)
            .field("adminState", &config.admin_state)
            .build()
    }
}
