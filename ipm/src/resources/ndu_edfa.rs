//! `ipm_ndu_edfa`: an optical amplifier seated in an NDU port

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
pub struct EdfaConfig {
    pub name: Option<String>,
    pub gain_mode: Option<String>,
    /// dB
    pub target_gain: Option<f64>,
    pub enabled: Option<bool>,
}

impl Populate for EdfaConfig {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "name" => p.string(key, value, &mut self.name, MergePolicy::OverwriteIfPresent),
            "gainMode" => p.string(key, value, &mut self.gain_mode, MergePolicy::OverwriteIfPresent),
            "targetGain" => p.float(key, value, &mut self.target_gain, MergePolicy::OverwriteIfPresent),
            "enabled" => p.boolean(key, value, &mut self.enabled, MergePolicy::OverwriteIfPresent),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdfaState {
    pub edfa_aid: Option<String>,
    pub actual_gain: Option<f64>,
    pub input_power: Option<f64>,
    pub output_power: Option<f64>,
    pub oper_state: Option<String>,
}

impl Populate for EdfaState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "edfaAid" => p.string(key, value, &mut self.edfa_aid, policy),
            "actualGain" => p.float(key, value, &mut self.actual_gain, policy),
            "inputPower" => p.float(key, value, &mut self.input_power, policy),
            "outputPower" => p.float(key, value, &mut self.output_power, policy),
            "operState" => p.string(key, value, &mut self.oper_state, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NduEdfaModel {
    pub identifier: Option<ResourceIdentifier>,
    #[serde(flatten)]
    pub header: StateHeader,
    pub config: Option<EdfaConfig>,
    pub state: Option<EdfaState>,
}

impl Populate for NduEdfaModel {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
            "state" => p.object(key, value, &mut self.state, MergePolicy::AlwaysOverwrite),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

impl Tracked for NduEdfaModel {
    const KIND: ResourceKind = ResourceKind::NduEdfa;

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

impl ResourceModel for NduEdfaModel {
    const TYPE_NAME: &'static str = "ipm_ndu_edfa";

    fn schema() -> Schema {
        let config = SchemaBuilder::new()
            .attribute(config_attribute("name", AttributeType::String).build())
            .attribute(
                config_attribute("gain_mode", AttributeType::String)
                    .validator(StringOneOf::new(["auto", "manual"]))
                    .build(),
            )
            .attribute(
                config_attribute("target_gain", AttributeType::Number)
                    .description("Target gain in dB")
                    .build(),
            )
            .attribute(config_attribute("enabled", AttributeType::Bool).build())
            .build();

        with_header(SchemaBuilder::new())
            .description("EDFA amplifier in an NDU port. Removing it only drops it from state.")
            .block("identifier", NestingMode::Single, identifier_schema())
            .block("config", NestingMode::Single, config)
            .attribute(state_attribute(&[
                ("edfa_aid", AttributeType::String),
                ("actual_gain", AttributeType::Number),
                ("input_power", AttributeType::Number),
                ("output_power", AttributeType::Number),
                ("oper_state", AttributeType::String),
            ]))
            .build()
    }

    fn config_body(&self) -> Value {
        let config = self.config.clone().unwrap_or_default();
        Body::new()
            .field("name", &config.name)
            .field("gainMode", &config.gain_mode)
            .field("targetGain", &config.target_gain)
            .field("enabled", &config.enabled)
            .build()
    }
}
