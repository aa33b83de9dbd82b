//! Decoding errors.

use thiserror::Error;

/// Errors raised while decoding a service response.
///
/// [`DecodeError::MalformedResponse`] stops decoding altogether. The other
/// variants concern a single field and are collected next to whatever did
/// decode (see [`super::DecodedResult::field_errors`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The body failed the well-formedness check or is not a JSON object.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A field has the right type but an inconsistent structure.
    #[error("Malformed '{field}' payload: {reason}")]
    MalformedPayload { field: &'static str, reason: String },

    /// A field exists but has the wrong JSON type.
    #[error("Field '{field}' has the wrong type: expected {expected}")]
    FieldTypeError {
        field: &'static str,
        expected: &'static str,
    },
}

impl DecodeError {
    /// Returns the field concerned, if the error is field-level.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DecodeError::MalformedResponse(_) => None,
            DecodeError::MalformedPayload { field, .. } => Some(field),
            DecodeError::FieldTypeError { field, .. } => Some(field),
        }
    }
}
