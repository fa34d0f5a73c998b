//! # invoice-kit
//!
//! A headless, type-safe invoice editor core.
//!
//! ## Features
//!
//! - **Draft State Machine:** One editor per session, create or edit mode, with
//!   finalization locking and confirmed deletion
//! - **Row-Scoped Validation:** Field errors stay attached to their line when
//!   other lines are removed
//! - **Wire Payloads:** Pure draft-to-JSON transformation, identifiers only
//! - **Client Agnostic:** The network sits behind the [`InvoiceApi`] trait;
//!   an in-memory implementation ships for tests
//! - **Production Ready:** Built-in logging, metrics hooks, and retry with
//!   backoff
//!
//! ## Quick Start
//!
//! ### Creating an invoice
//!
//! ```ignore
//! use invoice_kit::{EditorConfig, InMemoryInvoiceApi, InvoiceEditor, SubmitMode};
//!
//! let api = InMemoryInvoiceApi::new();
//! let mut editor = InvoiceEditor::new(EditorConfig::default());
//! let row = editor.draft().lines.as_slice()[0].row();
//!
//! editor.set_customer(Some(customer))?;
//! editor.set_product(row, Some(product))?;
//! editor.submit(&api, SubmitMode::Draft).await?;
//!
//! assert_eq!(editor.banner().unwrap().message(), "Invoice Created!");
//! ```
//!
//! ### Editing an existing invoice
//!
//! ```ignore
//! use invoice_kit::{load_editor, EditorConfig, LoadOutcome};
//!
//! match load_editor(&api, 42, EditorConfig::default()).await {
//!     LoadOutcome::Ready(mut editor) => {
//!         editor.finalize(&api).await?;
//!         assert!(editor.is_locked());
//!     }
//!     outcome => show(outcome.banner()),
//! }
//! ```

#[macro_use]
extern crate log;

pub mod api;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod listing;
pub mod loader;
pub mod mode;
pub mod model;
pub mod observability;
pub mod payload;
pub mod row;

// Re-exports for convenience
pub use api::{InMemoryInvoiceApi, InvoiceApi};
pub use config::EditorConfig;
pub use draft::{FieldKey, Finalization, InvoiceDraft, InvoiceLine, LineCollection, LineValues};
pub use editor::{
    Banner, Confirm, Controls, DeleteOutcome, EditorStatus, InvoiceEditor, Submission,
};
pub use error::{Error, ErrorKind, FieldError, Result};
pub use listing::{load_invoice_rows, InvoiceRow, InvoiceStatus};
pub use loader::{load_editor, LoadOutcome};
pub use mode::{EditorMode, SubmitMode};
pub use model::{
    Amount, Customer, CustomerId, Invoice, InvoiceId, InvoiceLineRecord, Product, ProductId,
    Quantity, Unit,
};
pub use observability::{EditorMetrics, NoOpMetrics};
pub use payload::{to_wire_payload, InvoiceEnvelope, InvoiceWirePayload, WireLine};
pub use row::RowId;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
