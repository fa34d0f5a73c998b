//! Reference data exchanged with the invoice API.
//!
//! These are the read-side shapes: customers and products picked from search,
//! and invoices fetched for editing. None of them is edited directly; the
//! editable shape lives in [`crate::draft`].

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::str::FromStr;

/// Invoice identifier.
pub type InvoiceId = u64;

/// Customer identifier.
pub type CustomerId = u64;

/// Product identifier.
pub type ProductId = u64;

/// A customer selected from search. Never edited by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
}

impl Customer {
    /// "First Last", trimmed when one part is empty.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A product selected from search.
///
/// Only the identifier reaches the wire; the pricing fields are informational
/// and never copied into a line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub vat_rate: String,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub unit_price_without_tax: String,
    #[serde(default)]
    pub unit_tax: String,
}

impl Product {
    /// A product known only by its identifier.
    pub fn reference(id: ProductId) -> Self {
        Product {
            id,
            ..Default::default()
        }
    }
}

/// Billing unit of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Hour,
    Day,
    Piece,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Hour => write!(f, "hour"),
            Unit::Day => write!(f, "day"),
            Unit::Piece => write!(f, "piece"),
        }
    }
}

impl FromStr for Unit {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Unit::Hour),
            "day" => Ok(Unit::Day),
            "piece" => Ok(Unit::Piece),
            other => Err(ParseValueError::new("unit", other)),
        }
    }
}

/// Failure to read a user-typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseValueError {
    field: &'static str,
    input: String,
}

impl ParseValueError {
    fn new(field: &'static str, input: &str) -> Self {
        ParseValueError {
            field,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.field, self.input)
    }
}

impl std::error::Error for ParseValueError {}

/// Line quantity.
///
/// Kept as the JSON number it was entered or fetched as, so it passes through
/// to the wire without rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Number);

impl Quantity {
    /// `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Quantity)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Quantity(Number::from(value))
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity(Number::from(value))
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity(Number::from(value))
    }
}

impl FromStr for Quantity {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return Ok(Quantity::from(int));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Quantity::from_f64)
            .ok_or_else(|| ParseValueError::new("quantity", s))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price or tax override: a JSON number or a decimal string, as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::Number(Number::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount::Number(Number::from(value))
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Text(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A persisted invoice as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
    #[serde(default)]
    pub tax: Option<String>,
    #[serde(default)]
    pub invoice_lines: Vec<InvoiceLineRecord>,
}

/// A persisted invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub vat_rate: Option<String>,
    #[serde(default)]
    pub price: Option<Amount>,
    #[serde(default)]
    pub tax: Option<Amount>,
}
