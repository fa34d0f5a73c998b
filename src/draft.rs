//! The editable invoice: draft aggregate, line collection and validation.

use crate::error::FieldError;
use crate::model::{Amount, Customer, Product, Quantity, Unit};
use crate::row::{RowAllocator, RowId};
use chrono::NaiveDate;
use std::fmt;

pub const CUSTOMER_REQUIRED: &str = "Customer is required";
pub const PRODUCT_REQUIRED: &str = "Product is required";
pub const QUANTITY_REQUIRED: &str = "Quantity is required";

/// Finalization flag of a draft.
///
/// One flag for the whole draft, never per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finalization {
    /// Never chosen (new invoice). Not sent on the wire.
    #[default]
    Unspecified,
    /// Saved as a draft (`finalized: false`).
    Draft,
    /// Finalized (`finalized: true`).
    Finalized,
}

impl Finalization {
    /// Map a persisted boolean flag.
    pub fn from_flag(finalized: bool) -> Self {
        if finalized {
            Finalization::Finalized
        } else {
            Finalization::Draft
        }
    }

    /// Top-level `finalized` value of a submission, if any.
    pub fn as_wire(self) -> Option<bool> {
        match self {
            Finalization::Unspecified => None,
            Finalization::Draft => Some(false),
            Finalization::Finalized => Some(true),
        }
    }

    pub fn is_finalized(self) -> bool {
        self == Finalization::Finalized
    }
}

/// Address of an editable field, used to scope validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Customer,
    Date,
    Deadline,
    Product(RowId),
    Quantity(RowId),
    Label(RowId),
    Unit(RowId),
    Price(RowId),
    Tax(RowId),
}

impl FieldKey {
    /// Line the field belongs to, `None` for header fields.
    pub fn row(self) -> Option<RowId> {
        match self {
            FieldKey::Customer | FieldKey::Date | FieldKey::Deadline => None,
            FieldKey::Product(row)
            | FieldKey::Quantity(row)
            | FieldKey::Label(row)
            | FieldKey::Unit(row)
            | FieldKey::Price(row)
            | FieldKey::Tax(row) => Some(row),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Customer => write!(f, "customer"),
            FieldKey::Date => write!(f, "date"),
            FieldKey::Deadline => write!(f, "deadline"),
            FieldKey::Product(row) => write!(f, "lines[{}].product", row),
            FieldKey::Quantity(row) => write!(f, "lines[{}].quantity", row),
            FieldKey::Label(row) => write!(f, "lines[{}].label", row),
            FieldKey::Unit(row) => write!(f, "lines[{}].unit", row),
            FieldKey::Price(row) => write!(f, "lines[{}].price", row),
            FieldKey::Tax(row) => write!(f, "lines[{}].tax", row),
        }
    }
}

/// One editable invoice line.
///
/// `label`, `unit`, `price` and `tax` are free overrides, independent of the
/// referenced product's own pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    row: RowId,
    pub product: Option<Product>,
    pub quantity: Option<Quantity>,
    pub label: Option<String>,
    pub unit: Option<Unit>,
    pub price: Option<Amount>,
    pub tax: Option<Amount>,
}

impl InvoiceLine {
    fn blank(row: RowId, quantity: Option<Quantity>) -> Self {
        InvoiceLine {
            row,
            product: None,
            quantity,
            label: None,
            unit: None,
            price: None,
            tax: None,
        }
    }

    pub fn row(&self) -> RowId {
        self.row
    }

    fn validate_into(&self, errors: &mut Vec<FieldError>) {
        if self.product.is_none() {
            errors.push(FieldError::new(FieldKey::Product(self.row), PRODUCT_REQUIRED));
        }
        if self.quantity.is_none() {
            errors.push(FieldError::new(
                FieldKey::Quantity(self.row),
                QUANTITY_REQUIRED,
            ));
        }
    }
}

/// Line values without a row identity, used to seed a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineValues {
    pub product: Option<Product>,
    pub quantity: Option<Quantity>,
    pub label: Option<String>,
    pub unit: Option<Unit>,
    pub price: Option<Amount>,
    pub tax: Option<Amount>,
}

/// Ordered, owned line sequence with stable row identities.
///
/// Always holds at least one line: the first line can never be removed.
#[derive(Debug, Clone)]
pub struct LineCollection {
    lines: Vec<InvoiceLine>,
    rows: RowAllocator,
}

impl LineCollection {
    /// A collection holding a single blank line.
    pub fn new(default_quantity: Option<Quantity>) -> Self {
        let mut rows = RowAllocator::new();
        let first = InvoiceLine::blank(rows.allocate(), default_quantity);
        LineCollection {
            lines: vec![first],
            rows,
        }
    }

    /// Build from existing values. An empty input yields one blank line.
    pub fn from_values<I>(values: I, default_quantity: Option<Quantity>) -> Self
    where
        I: IntoIterator<Item = LineValues>,
    {
        let mut rows = RowAllocator::new();
        let mut lines: Vec<InvoiceLine> = values
            .into_iter()
            .map(|v| InvoiceLine {
                row: rows.allocate(),
                product: v.product,
                quantity: v.quantity,
                label: v.label,
                unit: v.unit,
                price: v.price,
                tax: v.tax,
            })
            .collect();

        if lines.is_empty() {
            lines.push(InvoiceLine::blank(rows.allocate(), default_quantity));
        }

        LineCollection { lines, rows }
    }

    /// Append a blank line and return its row.
    pub fn push_blank(&mut self, quantity: Option<Quantity>) -> RowId {
        let row = self.rows.allocate();
        self.lines.push(InvoiceLine::blank(row, quantity));
        row
    }

    /// Append a line with the given values and return its row.
    pub fn push(&mut self, values: LineValues) -> RowId {
        let row = self.push_blank(None);
        if let Some(line) = self.lines.last_mut() {
            line.product = values.product;
            line.quantity = values.quantity;
            line.label = values.label;
            line.unit = values.unit;
            line.price = values.price;
            line.tax = values.tax;
        }
        row
    }

    /// Remove the line at `index`.
    ///
    /// Index 0 and out-of-range indexes are ignored and return `None`.
    pub fn remove(&mut self, index: usize) -> Option<InvoiceLine> {
        if index == 0 || index >= self.lines.len() {
            return None;
        }
        Some(self.lines.remove(index))
    }

    pub fn get(&self, row: RowId) -> Option<&InvoiceLine> {
        self.lines.iter().find(|line| line.row == row)
    }

    pub fn get_mut(&mut self, row: RowId) -> Option<&mut InvoiceLine> {
        self.lines.iter_mut().find(|line| line.row == row)
    }

    /// Current position of `row`.
    pub fn position(&self, row: RowId) -> Option<usize> {
        self.lines.iter().position(|line| line.row == row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InvoiceLine> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> IntoIterator for &'a LineCollection {
    type Item = &'a InvoiceLine;
    type IntoIter = std::slice::Iter<'a, InvoiceLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// The editable invoice, root aggregate of one edit session.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer: Option<Customer>,
    pub finalization: Finalization,
    pub date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub lines: LineCollection,
}

impl InvoiceDraft {
    /// An empty draft with one blank line.
    pub fn new(default_quantity: Option<Quantity>) -> Self {
        InvoiceDraft {
            customer: None,
            finalization: Finalization::Unspecified,
            date: None,
            deadline: None,
            lines: LineCollection::new(default_quantity),
        }
    }

    /// Every missing required field, header first then lines in order.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.customer.is_none() {
            errors.push(FieldError::new(FieldKey::Customer, CUSTOMER_REQUIRED));
        }
        for line in &self.lines {
            line.validate_into(&mut errors);
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
