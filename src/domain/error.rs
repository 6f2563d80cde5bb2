//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed records or tree nodes.
/// These are independent of where the data was loaded from.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("missing field `{field}` in {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("field `{field}` in {context} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
        context: String,
    },

    #[error("expected a JSON object for {context}")]
    NotAnObject { context: String },

    #[error("expected a JSON array of {what}")]
    NotAnArray { what: &'static str },
}
