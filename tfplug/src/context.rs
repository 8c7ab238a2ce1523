//! Request-scoped context for provider operations
//!
//! Every resource and data source call receives a Context carrying the
//! tracing span the operation logs under.

use tracing::Span;

/// Pass it as the first parameter of every async trait method.
#[derive(Clone, Debug)]
pub struct Context {
    span: Span,
}

impl Context {
    pub fn new() -> Self {
        Self { span: Span::none() }
    }

    /// Context for one operation on one type, e.g. `("read", "ipm_ndu")`
    pub fn for_operation(operation: &str, type_name: &str) -> Self {
        Self {
            span: tracing::info_span!("tfplug", op = operation, type_name = type_name),
        }
    }

    /// The span operations on this context log under
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
