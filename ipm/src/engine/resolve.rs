//! Read-path resolution.
//!
//! Precedence, first match wins:
//! state href, identifier href, state id, identifier aid, identifier id,
//! then the positional col id (device id for top-level kinds).

use serde_json::json;

use super::error::EngineError;
use super::identifier::ResourceIdentifier;
use super::registry::ResourceKind;

const EXPANDED: &str = "content=expanded";

/// Everything a read may be addressed by
#[derive(Debug, Clone, Copy)]
pub struct ReadTarget<'a> {
    pub href: Option<&'a str>,
    pub id: Option<&'a str>,
    pub identifier: &'a ResourceIdentifier,
}

/// Which addressing field produced a read path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Href,
    IdentifierHref,
    Id,
    IdentifierAid,
    IdentifierId,
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPath {
    pub path: String,
    pub source: ReadSource,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Collection query listing every member
pub fn expanded(collection: &str) -> String {
    format!("{}?{}", collection, EXPANDED)
}

fn expand_href(href: &str) -> String {
    if href.contains('?') {
        href.to_string()
    } else {
        format!("{}?{}", href, EXPANDED)
    }
}

/// Collection query matching one state field, e.g. `/ndus?content=expanded&q={"id":"42"}`.
/// The filter is percent-encoded so `&`, `+` and `#` in values stay inside `q`.
pub fn filter_path(collection: &str, field: &str, value: &str) -> String {
    let mut filter = serde_json::Map::new();
    filter.insert(field.to_string(), json!(value));
    let filter = serde_json::Value::Object(filter).to_string();
    format!(
        "{}?{}&q={}",
        collection,
        EXPANDED,
        urlencoding::encode(&filter)
    )
}

pub fn resolve_read_path(kind: ResourceKind, target: ReadTarget<'_>) -> Result<ReadPath, EngineError> {
    let identifier = target.identifier;
    let descriptor = kind.descriptor();

    let (path, source) = if let Some(href) = non_empty(target.href) {
        (expand_href(href), ReadSource::Href)
    } else if let Some(href) = non_empty(identifier.href.as_deref()) {
        (expand_href(href), ReadSource::IdentifierHref)
    } else if let Some(id) = non_empty(target.id) {
        let collection = descriptor.collection_path(identifier)?;
        (filter_path(&collection, "id", id), ReadSource::Id)
    } else if let (Some(aid), Some(field)) =
        (non_empty(identifier.aid.as_deref()), descriptor.aid_field)
    {
        let collection = descriptor.collection_path(identifier)?;
        (
            filter_path(&collection, &format!("state.{}", field), aid),
            ReadSource::IdentifierAid,
        )
    } else if let Some(id) = non_empty(identifier.id.as_deref()) {
        let collection = descriptor.collection_path(identifier)?;
        (filter_path(&collection, "id", id), ReadSource::IdentifierId)
    } else if identifier.slot(descriptor.leaf_slot()).is_some() {
        let instance = descriptor.instance_path(identifier)?;
        (expanded(&instance), ReadSource::Position)
    } else {
        return Err(EngineError::MissingIdentifier);
    };

    tracing::debug!(?kind, ?source, %path, "resolved read path");
    Ok(ReadPath { path, source })
}
