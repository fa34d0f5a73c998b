//! Error types for the invoice editor.

use crate::draft::FieldKey;
use crate::row::RowId;
use std::fmt;

/// Result type for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// The rendering boundary ([`crate::editor::Banner`]) matches on this tag
/// instead of on message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing customer, product or quantity. Recoverable by editing.
    Validation,
    /// The requested invoice does not exist.
    NotFound,
    /// Any other collaborator failure.
    Network,
    /// The caller asked for something the current state does not allow.
    Usage,
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the error is attached to.
    pub field: FieldKey,
    /// Human readable message, e.g. "Product is required".
    pub message: String,
}

impl FieldError {
    pub fn new(field: FieldKey, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error types for the invoice editor.
///
/// All editor and collaborator operations return `Result<T>` where `Result` is
/// defined as `std::result::Result<T, Error>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The draft has no customer.
    ///
    /// Raised by the payload transformer. The editor reports the same
    /// condition as a field error before the transformer is ever reached.
    MissingCustomer,

    /// A line has no product.
    ///
    /// `line` is the zero-based position of the offending line in the draft.
    MissingProduct { line: usize },

    /// Field-level validation failed.
    ///
    /// Carries every failing field so the caller can annotate each one.
    /// Never reaches the network layer.
    Validation(Vec<FieldError>),

    /// The invoice was not found (HTTP 404 or equivalent).
    ///
    /// Terminal for an edit session that is still hydrating.
    NotFound(String),

    /// Any other collaborator failure.
    ///
    /// Common causes:
    /// - Connection lost or refused
    /// - Server error
    /// - Malformed response
    ///
    /// **Recovery:** Re-invoke the same action; the draft is kept.
    Network(String),

    /// The draft was finalized and can no longer be edited.
    Locked,

    /// The invoice was deleted; the editor accepts no further actions.
    Deleted,

    /// The line addressed by a field edit is not in the draft.
    UnknownRow(RowId),

    /// The operation needs a persisted invoice (edit mode) but the editor is
    /// in create mode.
    MissingIdentifier,

    /// Collaborator operation not provided by this implementation.
    NotImplemented(String),

    /// JSON encoding of a payload failed.
    Serialization(String),
}

impl Error {
    /// Classify this error for rendering.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingCustomer | Error::MissingProduct { .. } | Error::Validation(_) => {
                ErrorKind::Validation
            }
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Network(_) | Error::NotImplemented(_) | Error::Serialization(_) => {
                ErrorKind::Network
            }
            Error::Locked | Error::Deleted | Error::UnknownRow(_) | Error::MissingIdentifier => {
                ErrorKind::Usage
            }
        }
    }

    /// Field errors carried by this error, if any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingCustomer => write!(f, "Customer is required"),
            Error::MissingProduct { line } => {
                write!(f, "Product is required for line {}", line)
            }
            Error::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", error)?;
                }
                Ok(())
            }
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Locked => write!(f, "Invoice is finalized and can no longer be edited"),
            Error::Deleted => write!(f, "Invoice was deleted"),
            Error::UnknownRow(row) => write!(f, "No line {} in this invoice", row),
            Error::MissingIdentifier => write!(f, "Operation requires a saved invoice"),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Network(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::MissingCustomer.to_string(), "Customer is required");
        assert_eq!(
            Error::MissingProduct { line: 2 }.to_string(),
            "Product is required for line 2"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::MissingCustomer.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::NotFound("invoice 1".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::Network("500".to_string()).kind(), ErrorKind::Network);
        assert_eq!(Error::Locked.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = Error::Validation(vec![
            FieldError::new(FieldKey::Customer, "Customer is required"),
            FieldError::new(FieldKey::Quantity(RowId::new(3)), "Quantity is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: customer: Customer is required, lines[#3].quantity: Quantity is required"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
