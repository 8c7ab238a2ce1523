use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::context::Context;
use tfplug::data_source::{
    DataSource, DataSourceSchemaRequest, DataSourceSchemaResponse, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{Diagnostics, DynamicValue};
use tfplug::validator::StringOneOf;
use tracing::Instrument;

use crate::api::Transport;
use crate::engine::{
    self, EngineError, MergePolicy, Populate, Populator, ResourceKind,
};

pub const TYPE_NAME: &str = "ipm_events";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventState {
    pub severity: Option<String>,
    pub condition_type: Option<String>,
    pub description: Option<String>,
    pub resource: Option<String>,
    pub raised_time: Option<String>,
}

impl Populate for EventState {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "severity" => p.string(key, value, &mut self.severity, policy),
            "conditionType" => p.string(key, value, &mut self.condition_type, policy),
            "description" => p.string(key, value, &mut self.description, policy),
            "resource" => p.string(key, value, &mut self.resource, policy),
            "raisedTime" => p.string(key, value, &mut self.raised_time, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    pub href: Option<String>,
    pub state: Option<EventState>,
}

impl Populate for Event {
    fn populate_field(&mut self, key: &str, value: &Value, p: &Populator) -> Result<(), EngineError> {
        let policy = MergePolicy::AlwaysOverwrite;
        match key {
            "id" => p.string(key, value, &mut self.id, policy),
            "href" => p.string(key, value, &mut self.href, policy),
            "state" => p.object(key, value, &mut self.state, policy),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsModel {
    pub severity: Option<String>,
    pub events: Option<Vec<Event>>,
}

/// Path listing events, narrowed to one severity when given
pub fn events_path(severity: Option<&str>) -> String {
    let root = ResourceKind::Event.descriptor().root;
    match severity.filter(|s| !s.is_empty()) {
        Some(severity) => engine::filter_path(root, "state.severity", severity),
        None => engine::expanded(root),
    }
}

pub struct EventsDataSource {
    transport: Arc<dyn Transport>,
}

impl EventsDataSource {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn schema_static() -> Schema {
        let state = HashMap::from([
            ("severity".to_string(), AttributeType::String),
            ("condition_type".to_string(), AttributeType::String),
            ("description".to_string(), AttributeType::String),
            ("resource".to_string(), AttributeType::String),
            ("raised_time".to_string(), AttributeType::String),
        ]);
        let event = HashMap::from([
            ("id".to_string(), AttributeType::String),
            ("href".to_string(), AttributeType::String),
            ("state".to_string(), AttributeType::Object(state)),
        ]);

        SchemaBuilder::new()
            .description("Events raised by managed devices")
            .attribute(
                AttributeBuilder::new("severity", AttributeType::String)
                    .description("Only return events of this severity")
                    .optional()
                    .validator(StringOneOf::new([
                        "critical", "major", "minor", "warning", "cleared",
                    ]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "events",
                    AttributeType::List(Box::new(AttributeType::Object(event))),
                )
                .computed()
                .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for EventsDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    async fn schema(&self, _ctx: Context, _request: DataSourceSchemaRequest) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = Diagnostics::new();
        let mut model: EventsModel = match request.config.to_model() {
            Ok(model) => model,
            Err(e) => {
                diagnostics.add_error("Invalid ipm_events config", e.to_string());
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics,
                };
            }
        };

        let path = events_path(model.severity.as_deref());
        match engine::fetch_all::<Event>(self.transport.as_ref(), &path)
            .instrument(ctx.span().clone())
            .await
        {
            Ok(events) => {
                tracing::debug!(parent: ctx.span(), count = events.len(), "events listed");
                model.events = Some(events);
            }
            Err(e) => diagnostics.add_error("Failed to list events", e.to_string()),
        }

        let state = match DynamicValue::from_model(&model) {
            Ok(state) => state,
            Err(e) => {
                diagnostics.add_error("Failed to encode ipm_events state", e.to_string());
                request.config
            }
        };
        ReadDataSourceResponse { state, diagnostics }
    }
}
