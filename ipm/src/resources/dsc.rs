//! `ipm_module_dsc`: a digital subcarrier under a module carrier

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::schema::{AttributeType, NestingMode, Schema, SchemaBuilder};

use super::{
    config_attribute, identifier_schema, state_attribute, with_header, Body, ResourceModel,
};
use crate::engine::{
    EngineError, MergePolicy, Populate, Populator, ResourceIdentifier, ResourceKind, StateHeader,
    Tracked,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DscConfig {
    pub tx_enabled: Option<bool>,
    pub rx_enabled: Option<bool>,
}

impl Populate for DscConfig {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "txEnabled" => p.boolean(key, value, &mut self.tx_enabled, MergePolicy::OverwriteIfPresent),
            "rxEnabled" => p.boolean(key, value, &mut self.rx_enabled, MergePolicy::OverwriteIfPresent),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DscState {
    pub dsc_aid: Option<String>,
    pub cdsc: Option<i64>,
    pub tx_status: Option<String>,
    pub rx_status: Option<String>,
    pub relative_dpo: Option<f64>,
}

impl Populate for DscState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "dscAid" => p.string(key, value, &mut self.dsc_aid, policy),
            "cDsc" => p.integer(key, value, &mut self.cdsc, policy),
            "txStatus" => p.string(key, value, &mut self.tx_status, policy),
            "rxStatus" => p.string(key, value, &mut self.rx_status, policy),
            "relativeDPO" => p.float(key, value, &mut self.relative_dpo, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DscModel {
    pub identifier: Option<ResourceIdentifier>,
    #[serde(flatten)]
    pub header: StateHeader,
    pub config: Option<DscConfig>,
    pub state: Option<DscState>,
}

impl Populate for DscModel {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        match key {
            "config" => p.object(key, value, &mut self.config, MergePolicy::OverwriteIfPresent),
            "state" => p.object(key, value, &mut self.state, MergePolicy::AlwaysOverwrite),
            _ => self.header.populate_field(key, value, p),
        }
    }
}

impl Tracked for DscModel {
    const KIND: ResourceKind = ResourceKind::Dsc;

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

impl ResourceModel for DscModel {
    const TYPE_NAME: &'static str = "ipm_module_dsc";

    fn schema() -> Schema {
        let config = SchemaBuilder::new()
            .attribute(config_attribute("tx_enabled", AttributeType::Bool).build())
            .attribute(config_attribute("rx_enabled", AttributeType::Bool).build())
            .build();

        with_header(SchemaBuilder::new())
            .description("Digital subcarrier. Addressed by device_id, grand_parent_col_id (line PTP), parent_col_id (carrier) and col_id.")
            .block("identifier", NestingMode::Single, identifier_schema())
            .block("config", NestingMode::Single, config)
            .attribute(state_attribute(&[
                ("dsc_aid", AttributeType::String),
                ("cdsc", AttributeType::Number),
                ("tx_status", AttributeType::String),
                ("rx_status", AttributeType::String),
                ("relative_dpo", AttributeType::Number),
            ]))
            .build()
    }

    fn config_body(&self) -> Value {
        let config = self.config.clone().unwrap_or_default();
        Body::new()
            .field("txEnabled", &config.tx_enabled)
            .field("rxEnabled", &config.rx_enabled)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::positional_path;
    use serde_json::json;
    use tfplug::types::DynamicValue;

    fn identifier() -> ResourceIdentifier {
        ResourceIdentifier {
            device_id: Some("m1".to_string()),
            grand_parent_col_id: Some("1".to_string()),
            parent_col_id: Some("2".to_string()),
            col_id: Some("5".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn addressed_through_the_full_chain() {
        let model = DscModel {
            identifier: Some(identifier()),
            ..Default::default()
        };
        assert_eq!(
            positional_path(DscModel::KIND, &model.identifier()).unwrap(),
            "/modules/m1/linePtps/1/carriers/2/dscs/5"
        );
    }

    #[test]
    fn response_populates_config_and_state() {
        let response = json!({
            "id": "dsc-5",
            "parentId": "carrier-2",
            "href": "/modules/m1/linePtps/1/carriers/2/dscs/5",
            "colid": 5,
            "config": {"txEnabled": false, "rxEnabled": true},
            "state": {"dscAid": "1-1-L1-2-5", "cDsc": 5, "txStatus": "enabled", "relativeDPO": -0.5}
        });
        let mut model = DscModel {
            identifier: Some(identifier()),
            config: Some(DscConfig {
                tx_enabled: Some(true),
                rx_enabled: None,
            }),
            ..Default::default()
        };

        Populator::new(false)
            .populate(&mut model, response.as_object().unwrap())
            .unwrap();

        assert_eq!(model.header.parent_id.as_deref(), Some("carrier-2"));
        assert_eq!(model.header.col_id, Some(5));
        let config = model.config.clone().unwrap();
        assert_eq!(config.tx_enabled, Some(false));
        assert_eq!(config.rx_enabled, None);
        let state = model.state.clone().unwrap();
        assert_eq!(state.cdsc, Some(5));
        assert_eq!(state.relative_dpo, Some(-0.5));
        assert_eq!(state.rx_status, None);

        let value = DynamicValue::from_model(&model).unwrap();
        let back: DscModel = value.to_model().unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn body_uses_api_field_names() {
        let model = DscModel {
            config: Some(DscConfig {
                tx_enabled: Some(true),
                rx_enabled: Some(false),
            }),
            ..Default::default()
        };
        assert_eq!(model.config_body(), json!({"txEnabled": true, "rxEnabled": false}));
        assert_eq!(DscModel::default().config_body(), json!({}));
    }
}
