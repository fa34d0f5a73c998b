//! Edit-mode hydration: fetch an invoice, then its customer, then open an
//! editor on it.
//!
//! The customer lookup is issued only after the invoice fetch has succeeded;
//! the two calls never run in parallel. Any failure is terminal for the
//! session: there is nothing to edit, so the whole view is replaced.

use crate::api::InvoiceApi;
use crate::config::EditorConfig;
use crate::editor::{error_message, Banner, InvoiceEditor};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{Customer, CustomerId, InvoiceId};

/// Result of loading an invoice for editing.
pub enum LoadOutcome {
    /// The editor is ready.
    Ready(InvoiceEditor),
    /// The invoice does not exist.
    NotFound,
    /// Any other failure.
    Failed(Error),
}

impl LoadOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }

    /// The editor, if loading succeeded.
    pub fn into_editor(self) -> Option<InvoiceEditor> {
        match self {
            LoadOutcome::Ready(editor) => Some(editor),
            LoadOutcome::NotFound | LoadOutcome::Failed(_) => None,
        }
    }

    /// Alert replacing the view for a failed load.
    pub fn banner(&self) -> Option<Banner> {
        match self {
            LoadOutcome::Ready(editor) => editor.banner(),
            LoadOutcome::NotFound => Some(Banner::Error(
                error_message(ErrorKind::NotFound).to_string(),
            )),
            LoadOutcome::Failed(error) => {
                Some(Banner::Error(error_message(error.kind()).to_string()))
            }
        }
    }
}

impl std::fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Ready(editor) => write!(f, "Ready({})", editor.mode()),
            LoadOutcome::NotFound => write!(f, "NotFound"),
            LoadOutcome::Failed(error) => write!(f, "Failed({})", error),
        }
    }
}

/// Load invoice `id` and open an editor on it.
pub async fn load_editor<A: InvoiceApi>(api: &A, id: InvoiceId, config: EditorConfig) -> LoadOutcome {
    debug!("» Loading invoice {}", id);

    let invoice = match api.fetch_invoice(id).await {
        Ok(invoice) => invoice,
        Err(Error::NotFound(msg)) => {
            warn!("Invoice {} not found: {}", id, msg);
            return LoadOutcome::NotFound;
        }
        Err(e) => {
            warn!("✗ Loading invoice {} failed: {}", id, e);
            return LoadOutcome::Failed(e);
        }
    };

    let customer = match lookup_customer(api, invoice.customer_id).await {
        Ok(customer) => customer,
        Err(e) => {
            warn!("✗ Customer lookup for invoice {} failed: {}", id, e);
            return LoadOutcome::Failed(e);
        }
    };

    info!("✓ Invoice {} loaded", id);
    LoadOutcome::Ready(InvoiceEditor::from_invoice(&invoice, customer, config))
}

/// Recover the customer object of `customer_id` from the customer's invoices.
///
/// `None` for an absent id or when no invoice embeds the customer.
///
/// # Errors
/// Returns `Err` if the search call fails
pub async fn lookup_customer<A: InvoiceApi>(
    api: &A,
    customer_id: Option<CustomerId>,
) -> Result<Option<Customer>> {
    let Some(customer_id) = customer_id else {
        debug!("Invoice has no customer, skipping lookup");
        return Ok(None);
    };

    let invoices = api.search_invoices_by_customer(customer_id).await?;
    Ok(invoices
        .into_iter()
        .next()
        .and_then(|invoice| invoice.customer))
}
