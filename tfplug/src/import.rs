//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue, PrivateStateData};

/// Writes the import ID into one attribute of an otherwise empty state.
/// `private` travels with the imported state to the read that follows.
///
/// Example: ID "/ndus/abc" -> state.href = "/ndus/abc"
pub fn import_state_passthrough_id(
    _ctx: &Context,
    type_name: &str,
    attr_path: AttributePath,
    private: PrivateStateData,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::null();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!("Could not set attribute '{}' to value '{}'", attr_path, request.id),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: type_name.to_string(),
        state,
        private,
    });
}
