//! Mapping between the editable draft and the wire shape.
//!
//! Everything here is a pure function of its input: no state is kept between
//! calls, so transforming the same draft twice yields identical payloads.
//!
//! # Wire format
//!
//! ```text
//! {
//!   "customer_id": 6773,
//!   "date": "2021-02-03",          // "" when absent
//!   "deadline": "",                // "" when absent
//!   "finalized": true,             // omitted when never chosen
//!   "invoice_lines_attributes": [
//!     { "product_id": 67, "quantity": 1, "label": null,
//!       "price": null, "tax": null, "unit": null }
//!   ]
//! }
//! ```

use crate::draft::{Finalization, InvoiceDraft, InvoiceLine, LineCollection, LineValues};
use crate::error::{Error, Result};
use crate::model::{
    Amount, Customer, CustomerId, Invoice, InvoiceId, InvoiceLineRecord, Product, ProductId,
    Quantity, Unit,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Body of a create or update call.
///
/// Carries identifiers only, never the customer or product objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceWirePayload {
    pub customer_id: CustomerId,
    pub date: String,
    pub deadline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized: Option<bool>,
    pub invoice_lines_attributes: Vec<WireLine>,
}

/// One line of a wire payload.
///
/// Absent overrides are encoded as `null` so every line has the same key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLine {
    pub product_id: ProductId,
    pub quantity: Option<Quantity>,
    pub label: Option<String>,
    pub price: Option<Amount>,
    pub tax: Option<Amount>,
    pub unit: Option<Unit>,
}

/// Request envelope: `{ "invoice": { "id"?: .., ...payload } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEnvelope {
    pub invoice: EnvelopeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InvoiceId>,
    #[serde(flatten)]
    pub payload: InvoiceWirePayload,
}

impl InvoiceWirePayload {
    /// Wrap for transport. `id` is set for updates only.
    pub fn into_envelope(self, id: Option<InvoiceId>) -> InvoiceEnvelope {
        InvoiceEnvelope {
            invoice: EnvelopeBody { id, payload: self },
        }
    }

    /// Encode as a JSON value.
    ///
    /// # Errors
    /// Returns `Error::Serialization` if encoding fails
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Build the wire payload for `draft`.
///
/// # Errors
///
/// - `Error::MissingCustomer`: the draft has no customer
/// - `Error::MissingProduct { line }`: line `line` has no product
pub fn to_wire_payload(draft: &InvoiceDraft) -> Result<InvoiceWirePayload> {
    let customer = draft.customer.as_ref().ok_or(Error::MissingCustomer)?;

    let invoice_lines_attributes = draft
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| wire_line(index, line))
        .collect::<Result<Vec<_>>>()?;

    Ok(InvoiceWirePayload {
        customer_id: customer.id,
        date: format_wire_date(draft.date),
        deadline: format_wire_date(draft.deadline),
        finalized: draft.finalization.as_wire(),
        invoice_lines_attributes,
    })
}

fn wire_line(index: usize, line: &InvoiceLine) -> Result<WireLine> {
    let product = line
        .product
        .as_ref()
        .ok_or(Error::MissingProduct { line: index })?;

    Ok(WireLine {
        product_id: product.id,
        quantity: line.quantity.clone(),
        label: line.label.clone(),
        price: line.price.clone(),
        tax: line.tax.clone(),
        unit: line.unit,
    })
}

/// `YYYY-MM-DD` from the calendar components, `""` when absent.
pub fn format_wire_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()),
        None => String::new(),
    }
}

/// Parse a `YYYY-MM-DD` date. Empty or malformed input yields `None`.
pub fn parse_wire_date(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring malformed date {:?}: {}", raw, e);
            None
        }
    }
}

/// Editable values of a persisted line.
///
/// A record without an embedded product keeps its identity through
/// [`Product::reference`].
pub fn line_from_record(record: &InvoiceLineRecord) -> LineValues {
    LineValues {
        product: Some(
            record
                .product
                .clone()
                .unwrap_or_else(|| Product::reference(record.product_id)),
        ),
        quantity: record.quantity.clone(),
        label: record.label.clone(),
        unit: record.unit,
        price: record.price.clone(),
        tax: record.tax.clone(),
    }
}

/// Editable draft of a persisted invoice.
///
/// `customer` comes from the secondary lookup; see [`crate::loader`].
pub fn draft_from_invoice(
    invoice: &Invoice,
    customer: Option<Customer>,
    default_quantity: Option<Quantity>,
) -> InvoiceDraft {
    InvoiceDraft {
        customer,
        finalization: Finalization::from_flag(invoice.finalized),
        date: parse_wire_date(invoice.date.as_deref()),
        deadline: parse_wire_date(invoice.deadline.as_deref()),
        lines: LineCollection::from_values(
            invoice.invoice_lines.iter().map(line_from_record),
            default_quantity,
        ),
    }
}
