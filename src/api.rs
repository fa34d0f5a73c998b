//! Invoice API trait for abstracting the network client.
//!
//! The `InvoiceApi` trait decouples the editor from any HTTP client. Implement
//! it over reqwest, a generated OpenAPI client, or anything else that can
//! fetch and store invoices.
//!
//! # Mocking for Tests
//!
//! [`InMemoryInvoiceApi`] keeps invoices in memory, records every call it
//! receives and can be told to fail a given operation:
//!
//! ```ignore
//! use invoice_kit::api::{ApiOperation, InMemoryInvoiceApi};
//! use invoice_kit::Error;
//!
//! let api = InMemoryInvoiceApi::new();
//! api.fail(ApiOperation::CreateInvoice, Error::Network("500".into()));
//!
//! // submit fails, draft is kept
//! assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());
//!
//! api.recover(ApiOperation::CreateInvoice);
//! editor.submit(&api, SubmitMode::Draft).await?;
//! assert_eq!(api.call_count(ApiOperation::CreateInvoice), 2);
//! ```
//!
//! # Error Handling
//!
//! Implementations return:
//! - `Error::NotFound` when the invoice does not exist (HTTP 404)
//! - `Error::Network` for any other failure

use crate::error::{Error, Result};
use crate::model::{Customer, CustomerId, Invoice, InvoiceId, InvoiceLineRecord, Product};
use crate::payload::InvoiceWirePayload;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Trait for invoice API implementations.
///
/// All calls are async; the editor awaits at most one at a time.
#[allow(async_fn_in_trait)]
pub trait InvoiceApi: Send + Sync {
    /// Fetch one invoice.
    ///
    /// # Errors
    /// `Error::NotFound` if the invoice does not exist, `Error::Network` otherwise
    async fn fetch_invoice(&self, id: InvoiceId) -> Result<Invoice>;

    /// Invoices of one customer, each with its customer embedded.
    ///
    /// # Errors
    /// Returns `Err` if the call fails
    async fn search_invoices_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>>;

    /// Create an invoice.
    ///
    /// # Errors
    /// Returns `Err` if the call fails
    async fn create_invoice(&self, payload: &InvoiceWirePayload) -> Result<()>;

    /// Update an existing invoice.
    ///
    /// # Errors
    /// Returns `Err` if the call fails
    async fn update_invoice(&self, id: InvoiceId, payload: &InvoiceWirePayload) -> Result<()>;

    /// Delete an invoice.
    ///
    /// # Errors
    /// Returns `Err` if the call fails
    async fn delete_invoice(&self, id: InvoiceId) -> Result<()>;

    /// Customer autocomplete source.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the call fails
    async fn search_customers(&self, _query: &str) -> Result<Vec<Customer>> {
        Err(Error::NotImplemented(
            "search_customers not implemented for this client".to_string(),
        ))
    }

    /// Product autocomplete source.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the call fails
    async fn search_products(&self, _query: &str) -> Result<Vec<Product>> {
        Err(Error::NotImplemented(
            "search_products not implemented for this client".to_string(),
        ))
    }

    /// Every invoice, for the listing view.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the call fails
    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        Err(Error::NotImplemented(
            "list_invoices not implemented for this client".to_string(),
        ))
    }
}

/// Collaborator operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    FetchInvoice,
    SearchInvoicesByCustomer,
    CreateInvoice,
    UpdateInvoice,
    DeleteInvoice,
    SearchCustomers,
    SearchProducts,
    ListInvoices,
}

/// A call received by [`InMemoryInvoiceApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchInvoice(InvoiceId),
    SearchInvoicesByCustomer(CustomerId),
    CreateInvoice(InvoiceWirePayload),
    UpdateInvoice(InvoiceId, InvoiceWirePayload),
    DeleteInvoice(InvoiceId),
    SearchCustomers(String),
    SearchProducts(String),
    ListInvoices,
}

impl ApiCall {
    pub fn operation(&self) -> ApiOperation {
        match self {
            ApiCall::FetchInvoice(_) => ApiOperation::FetchInvoice,
            ApiCall::SearchInvoicesByCustomer(_) => ApiOperation::SearchInvoicesByCustomer,
            ApiCall::CreateInvoice(_) => ApiOperation::CreateInvoice,
            ApiCall::UpdateInvoice(..) => ApiOperation::UpdateInvoice,
            ApiCall::DeleteInvoice(_) => ApiOperation::DeleteInvoice,
            ApiCall::SearchCustomers(_) => ApiOperation::SearchCustomers,
            ApiCall::SearchProducts(_) => ApiOperation::SearchProducts,
            ApiCall::ListInvoices => ApiOperation::ListInvoices,
        }
    }
}

/// In-memory invoice API for tests and demos.
///
/// Created invoices get sequential identifiers. Create and update apply the
/// payload to the stored invoice, resolving customers and products from the
/// inserted reference data.
pub struct InMemoryInvoiceApi {
    invoices: DashMap<InvoiceId, Invoice>,
    customers: DashMap<CustomerId, Customer>,
    products: DashMap<u64, Product>,
    failures: DashMap<ApiOperation, Error>,
    calls: Mutex<Vec<ApiCall>>,
    next_id: AtomicU64,
}

impl InMemoryInvoiceApi {
    pub fn new() -> Self {
        InMemoryInvoiceApi {
            invoices: DashMap::new(),
            customers: DashMap::new(),
            products: DashMap::new(),
            failures: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Insert or replace a stored invoice.
    pub fn insert_invoice(&self, invoice: Invoice) {
        self.next_id.fetch_max(invoice.id + 1, Ordering::SeqCst);
        self.invoices.insert(invoice.id, invoice);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn insert_product(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Make every subsequent call of `operation` fail with `error`.
    pub fn fail(&self, operation: ApiOperation, error: Error) {
        self.failures.insert(operation, error);
    }

    /// Stop failing `operation`.
    pub fn recover(&self, operation: ApiOperation) {
        self.failures.remove(&operation);
    }

    /// Stored copy of an invoice.
    pub fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.invoices.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    /// Payloads received by `create_invoice`.
    pub fn created_payloads(&self) -> Vec<InvoiceWirePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::CreateInvoice(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// `(id, payload)` pairs received by `update_invoice`.
    pub fn updated_payloads(&self) -> Vec<(InvoiceId, InvoiceWirePayload)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UpdateInvoice(id, payload) => Some((id, payload)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) -> Result<()> {
        let operation = call.operation();
        debug!("InMemory API {:?}", call);
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        match self.failures.get(&operation) {
            Some(error) => Err(error.value().clone()),
            None => Ok(()),
        }
    }

    fn apply_payload(
        &self,
        id: InvoiceId,
        payload: &InvoiceWirePayload,
        existing: Option<&Invoice>,
    ) -> Invoice {
        let invoice_lines = payload
            .invoice_lines_attributes
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let product = self
                    .products
                    .get(&line.product_id)
                    .map(|entry| entry.value().clone());
                InvoiceLineRecord {
                    id: Some(index as u64 + 1),
                    invoice_id: Some(id),
                    product_id: line.product_id,
                    vat_rate: product.as_ref().map(|p| p.vat_rate.clone()),
                    product,
                    quantity: line.quantity.clone(),
                    label: line.label.clone(),
                    unit: line.unit,
                    price: line.price.clone(),
                    tax: line.tax.clone(),
                }
            })
            .collect();

        Invoice {
            id,
            customer_id: Some(payload.customer_id),
            customer: self
                .customers
                .get(&payload.customer_id)
                .map(|entry| entry.value().clone()),
            finalized: payload
                .finalized
                .unwrap_or_else(|| existing.is_some_and(|invoice| invoice.finalized)),
            paid: existing.is_some_and(|invoice| invoice.paid),
            date: non_empty(&payload.date),
            deadline: non_empty(&payload.deadline),
            total: existing.and_then(|invoice| invoice.total.clone()),
            tax: existing.and_then(|invoice| invoice.tax.clone()),
            invoice_lines,
        }
    }

    fn not_found(id: InvoiceId) -> Error {
        Error::NotFound(format!("invoice {}", id))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Default for InMemoryInvoiceApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceApi for InMemoryInvoiceApi {
    async fn fetch_invoice(&self, id: InvoiceId) -> Result<Invoice> {
        self.record(ApiCall::FetchInvoice(id))?;
        self.invoice(id).ok_or_else(|| Self::not_found(id))
    }

    async fn search_invoices_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>> {
        self.record(ApiCall::SearchInvoicesByCustomer(customer_id))?;
        let mut found: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|entry| entry.value().customer_id == Some(customer_id))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|invoice| invoice.id);
        Ok(found)
    }

    async fn create_invoice(&self, payload: &InvoiceWirePayload) -> Result<()> {
        self.record(ApiCall::CreateInvoice(payload.clone()))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let invoice = self.apply_payload(id, payload, None);
        self.invoices.insert(id, invoice);
        Ok(())
    }

    async fn update_invoice(&self, id: InvoiceId, payload: &InvoiceWirePayload) -> Result<()> {
        self.record(ApiCall::UpdateInvoice(id, payload.clone()))?;
        let existing = self.invoice(id).ok_or_else(|| Self::not_found(id))?;
        let invoice = self.apply_payload(id, payload, Some(&existing));
        self.invoices.insert(id, invoice);
        Ok(())
    }

    async fn delete_invoice(&self, id: InvoiceId) -> Result<()> {
        self.record(ApiCall::DeleteInvoice(id))?;
        self.invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn search_customers(&self, query: &str) -> Result<Vec<Customer>> {
        self.record(ApiCall::SearchCustomers(query.to_string()))?;
        let needle = query.to_lowercase();
        let mut found: Vec<Customer> = self
            .customers
            .iter()
            .filter(|entry| entry.value().display_name().to_lowercase().contains(&needle))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|customer| customer.id);
        Ok(found)
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        self.record(ApiCall::SearchProducts(query.to_string()))?;
        let needle = query.to_lowercase();
        let mut found: Vec<Product> = self
            .products
            .iter()
            .filter(|entry| entry.value().label.to_lowercase().contains(&needle))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|product| product.id);
        Ok(found)
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>> {
        self.record(ApiCall::ListInvoices)?;
        let mut all: Vec<Invoice> = self
            .invoices
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|invoice| invoice.id);
        Ok(all)
    }
}
