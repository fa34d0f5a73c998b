//! Editor modes and submission kinds.
//!
//! Two small enums drive the editor instead of boolean flags:
//!
//! | Enum | Variant | Meaning |
//! |------|---------|---------|
//! | `EditorMode` | `Create` | New invoice, submit calls `create_invoice` |
//! | `EditorMode` | `Edit(id)` | Persisted invoice, submit calls `update_invoice`, delete allowed |
//! | `SubmitMode` | `Draft` | Save without finalizing |
//! | `SubmitMode` | `Finalize` | Finalize and lock on success |

use crate::model::InvoiceId;
use std::fmt;

/// Whether the editor works on a new or an existing invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Create,
    Edit(InvoiceId),
}

impl EditorMode {
    /// Identifier of the persisted invoice, if any.
    pub fn invoice_id(self) -> Option<InvoiceId> {
        match self {
            EditorMode::Create => None,
            EditorMode::Edit(id) => Some(id),
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::Create => write!(f, "Create"),
            EditorMode::Edit(id) => write!(f, "Edit({})", id),
        }
    }
}

/// How a submission treats finalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// **Draft**: save, keep the invoice editable.
    #[default]
    Draft,

    /// **Finalize**: mark finalized, then save.
    ///
    /// A successful finalize locks the editor for good.
    Finalize,
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitMode::Draft => write!(f, "Draft"),
            SubmitMode::Finalize => write!(f, "Finalize"),
        }
    }
}
