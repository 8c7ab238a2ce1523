//! `ipm_module_carrier`: an optical carrier on a module line PTP

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::schema::{AttributeType, NestingMode, Schema, SchemaBuilder};
use tfplug::validator::StringOneOf;

use super::{config_attribute, identifier_schema, state_attribute, with_header, Body, ResourceModel};
use crate::engine::{
    EngineError, MergePolicy, Populate, Populator, ResourceIdentifier, ResourceKind, StateHeader,
    Tracked,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub name: Option<String>,
    /// MHz
    pub frequency: Option<i64>,
    pub modulation: Option<String>,
    pub tx_clp_target: Option<f64>,
    pub client_port_mode: Option<String>,
}

impl Populate for CarrierConfig {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "name" => p.string(key, value, &mut self.name, MergePolicy::OverwriteIfPresent),
            "frequency" => p.integer(key, value, &mut self.frequency, MergePolicy::OverwriteIfPresent),
            "modulation" => p.string(key, value, &mut self.modulation, MergePolicy::OverwriteIfPresent),
            "txCLPtarget" => p.float(key, value, &mut self.tx_clp_target, MergePolicy::OverwriteIfPresent),
            "clientPortMode" => {
                p.string(key, value, &mut self.client_port_mode, MergePolicy::OverwriteIfPresent)
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierState {
    pub carrier_aid: Option<String>,
    pub frequency: Option<i64>,
    pub modulation: Option<String>,
    pub baud_rate: Option<f64>,
    pub operational_state: Option<String>,
}

impl Populate for CarrierState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "carrierAid" => p.string(key, value, &mut self.carrier_aid, policy),
            "frequency" => p.integer(key, value, &mut self.frequency, policy),
            "modulation" => p.string(key, value, &mut self.modulation, policy),
            "baudRate" => p.float(key, value, &mut self.baud_rate, policy),
            "operationalState" => p.string(key, value, &mut self.operational_state, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleCarrierModel {
    pub identifier: Option<ResourceIdentifier>,
    #[serde(flatten)]
    pub header: StateHeader,
    pub config: Option<CarrierConfig>,
    pub state: Option<CarrierState>,
}

impl Populate for ModuleCarrierModel {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
            "state" => p.object(key, value, &mut self.state, MergePolicy::AlwaysOverwrite),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

impl Tracked for ModuleCarrierModel {
    const KIND: ResourceKind = ResourceKind::ModuleCarrier;

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

impl ResourceModel for ModuleCarrierModel {
    const TYPE_NAME: &'static str = "ipm_module_carrier";

    fn schema() -> Schema {
        let config = SchemaBuilder::new()
            .attribute(config_attribute("name", AttributeType::String).build())
            .attribute(
                config_attribute("frequency", AttributeType::Number)
                    .description("Centre frequency in MHz")
                    .build(),
            )
            .attribute(
                config_attribute("modulation", AttributeType::String)
                    .validator(StringOneOf::new(["16QAM", "8QAM", "QPSK"]))
                    .build(),
            )
            .attribute(
                config_attribute("tx_clp_target", AttributeType::Number)
                    .description("Transmit constant-launch-power target in dBm")
                    .build(),
            )
            .attribute(
                config_attribute("client_port_mode", AttributeType::String)
                    .validator(StringOneOf::new(["ethernet", "otn"]))
                    .build(),
            )
            .build();

        with_header(SchemaBuilder::new())
            .description("Carrier on a module line PTP")
            .block("identifier", NestingMode::Single, identifier_schema())
            .block("config", NestingMode::Single, config)
            .attribute(state_attribute(&[
                ("carrier_aid", AttributeType::String),
                ("frequency", AttributeType::Number),
                ("modulation", AttributeType::String),
                ("baud_rate", AttributeType::Number),
                ("operational_state", AttributeType::String),
            ]))
            .build()
    }

    fn config_body(&self) -> Value {
        let config = self.config.clone().unwrap_or_default();
        Body::new()
            .field("name", &config.name)
            .field("frequency", &config.frequency)
            .field("modulation", &config.modulation)
            .field("txCLPtarget", &config.tx_clp_target)
            .field("clientPortMode", &config.client_port_mode)
            .build()
    }
}
