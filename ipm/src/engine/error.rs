use thiserror::Error;

use super::registry::ResourceKind;
use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no identifier set: one of href, id, identifier.aid, identifier.id or identifier.col_id is required")]
    MissingIdentifier,

    #[error("{kind} identifier is missing {field}")]
    IncompleteIdentifier {
        kind: ResourceKind,
        field: &'static str,
    },

    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("action name is required")]
    MissingActionName,

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("malformed response at '{field}': expected {expected}, got {actual}")]
    MalformedResponse {
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("resource not found")]
    NotFound,
}

impl EngineError {
    pub(crate) fn malformed(field: impl Into<String>, expected: &'static str, actual: impl Into<String>) -> Self {
        EngineError::MalformedResponse {
            field: field.into(),
            expected,
            actual: actual.into(),
        }
    }
}
