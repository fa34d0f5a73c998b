//! Invoice list rows and their derived status.

use crate::api::InvoiceApi;
use crate::error::{Error, Result};
use crate::model::{Invoice, InvoiceId};
use std::fmt;

/// Message shown when the list cannot be loaded.
pub const LIST_ERROR_MESSAGE: &str = "Network error";

/// Payment status of a listed invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
}

impl InvoiceStatus {
    /// Not finalized: `Draft`; finalized: `Paid` or `Pending`.
    pub fn of(invoice: &Invoice) -> Self {
        match (invoice.finalized, invoice.paid) {
            (false, _) => InvoiceStatus::Draft,
            (true, true) => InvoiceStatus::Paid,
            (true, false) => InvoiceStatus::Pending,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "Draft"),
            InvoiceStatus::Pending => write!(f, "Pending"),
            InvoiceStatus::Paid => write!(f, "Paid"),
        }
    }
}

/// One row of the invoice list.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: InvoiceId,
    pub date: Option<String>,
    pub customer_name: Option<String>,
    pub total: Option<String>,
    pub status: InvoiceStatus,
}

impl From<&Invoice> for InvoiceRow {
    fn from(invoice: &Invoice) -> Self {
        InvoiceRow {
            id: invoice.id,
            date: invoice.date.clone(),
            customer_name: invoice.customer.as_ref().map(|c| c.display_name()),
            total: invoice.total.clone(),
            status: InvoiceStatus::of(invoice),
        }
    }
}

/// Fetch every invoice as a list row.
///
/// # Errors
/// Any failure is reported as `Error::Network`
pub async fn load_invoice_rows<A: InvoiceApi>(api: &A) -> Result<Vec<InvoiceRow>> {
    match api.list_invoices().await {
        Ok(invoices) => {
            debug!("Listed {} invoice(s)", invoices.len());
            Ok(invoices.iter().map(InvoiceRow::from).collect())
        }
        Err(e) => {
            warn!("✗ Listing invoices failed: {}", e);
            Err(Error::Network(e.to_string()))
        }
    }
}
