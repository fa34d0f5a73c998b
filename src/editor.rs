//! Invoice editor - the edit state machine.
//!
//! ```text
//!            submit ok                    submit err
//!   Idle ─────────────────► SubmitSucceeded ◄──────► SubmitFailed
//!    │                          │                        │
//!    └──────── delete ok (edit mode only) ───────────────┴──► Deleted
//! ```
//!
//! The editor owns the draft for one session. Every transition happens in
//! response to a method call; async methods take `&mut self`, so no two
//! collaborator calls can race on the same draft.

use crate::api::InvoiceApi;
use crate::config::EditorConfig;
use crate::draft::{FieldKey, Finalization, InvoiceDraft, InvoiceLine};
use crate::error::{Error, ErrorKind, FieldError, Result};
use crate::mode::{EditorMode, SubmitMode};
use crate::model::{Amount, Customer, Invoice, Product, Quantity, Unit};
use crate::observability::{EditorMetrics, NoOpMetrics};
use crate::payload::{draft_from_invoice, to_wire_payload, InvoiceWirePayload};
use crate::row::RowId;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};

/// Root-level message for any failed action.
pub const GENERIC_ERROR_MESSAGE: &str = "Oops! Something went wrong. Try again.";

/// Message for an invoice that does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Invoice not found";

pub const CREATED_MESSAGE: &str = "Invoice Created!";
pub const UPDATED_MESSAGE: &str = "Invoice Updated!";
pub const DELETED_MESSAGE: &str = "Invoice Deleted!";

/// Upper bound of a single retry delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay after failed attempt `attempt` (1-based): `100ms * 2^(attempt-1)`,
/// capped at [`MAX_BACKOFF`].
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let millis = 2_u64
        .checked_pow(exponent)
        .and_then(|factor| factor.checked_mul(100))
        .unwrap_or(u64::MAX);
    Duration::from_millis(millis).min(MAX_BACKOFF)
}

/// Kind of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Created,
    Updated,
}

/// Outcome state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorStatus {
    /// Editing, no outcome yet.
    #[default]
    Idle,
    /// The last submit or delete failed. Draft retained, still editable.
    SubmitFailed,
    /// The last submit succeeded.
    SubmitSucceeded(Submission),
    /// The invoice was deleted. Terminal.
    Deleted,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation. Nothing changed.
    Cancelled,
}

/// Confirmation collaborator consulted before a delete.
pub trait Confirm {
    /// `true` only on an explicit affirmative answer.
    fn confirm(&self, prompt: &str) -> bool;
}

impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// A banner for the single alert area of the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Success(msg) | Banner::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

/// Root-level message for an error kind.
pub fn error_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => NOT_FOUND_MESSAGE,
        ErrorKind::Validation | ErrorKind::Network | ErrorKind::Usage => GENERIC_ERROR_MESSAGE,
    }
}

/// Which controls the view may offer, derived from editor state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Customer, dates and every line field.
    pub edit_fields: bool,
    pub append_line: bool,
    pub save_draft: bool,
    pub finalize: bool,
    pub delete: bool,
    line_count: usize,
}

impl Controls {
    /// Whether the remove button for the line at `index` is shown.
    pub fn remove_line(&self, index: usize) -> bool {
        self.edit_fields && index > 0 && index < self.line_count
    }
}

/// The invoice edit state machine.
///
/// # Example
///
/// ```ignore
/// use invoice_kit::{EditorConfig, InvoiceEditor, SubmitMode};
///
/// let mut editor = InvoiceEditor::new(EditorConfig::default());
/// let row = editor.draft().lines.as_slice()[0].row();
///
/// editor.set_customer(Some(customer))?;
/// editor.set_product(row, Some(product))?;
/// editor.submit(&api, SubmitMode::Draft).await?;
/// ```
pub struct InvoiceEditor {
    mode: EditorMode,
    draft: InvoiceDraft,
    status: EditorStatus,
    locked: bool,
    field_errors: BTreeMap<FieldKey, FieldError>,
    root_error: Option<Error>,
    config: EditorConfig,
    metrics: Box<dyn EditorMetrics>,
}

impl InvoiceEditor {
    /// Editor for a new invoice: one blank line, nothing selected.
    pub fn new(config: EditorConfig) -> Self {
        let draft = InvoiceDraft::new(config.default_quantity.clone());
        InvoiceEditor::with_draft(EditorMode::Create, draft, false, config)
    }

    /// Editor for a persisted invoice.
    ///
    /// An invoice that is already finalized starts locked.
    pub fn from_invoice(invoice: &Invoice, customer: Option<Customer>, config: EditorConfig) -> Self {
        let draft = draft_from_invoice(invoice, customer, config.default_quantity.clone());
        InvoiceEditor::with_draft(
            EditorMode::Edit(invoice.id),
            draft,
            invoice.finalized,
            config,
        )
    }

    fn with_draft(mode: EditorMode, draft: InvoiceDraft, locked: bool, config: EditorConfig) -> Self {
        debug!("» Editor session opened ({}, locked: {})", mode, locked);
        InvoiceEditor {
            mode,
            draft,
            status: EditorStatus::Idle,
            locked,
            field_errors: BTreeMap::new(),
            root_error: None,
            config,
            metrics: Box::new(NoOpMetrics),
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn EditorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    // ------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Finalized and persisted: nothing but delete is allowed.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Root-level error of the last failed action.
    pub fn root_error(&self) -> Option<&Error> {
        self.root_error.as_ref()
    }

    /// Pending field errors, ordered by field kind then row.
    pub fn field_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.field_errors.values()
    }

    pub fn field_error(&self, field: FieldKey) -> Option<&FieldError> {
        self.field_errors.get(&field)
    }

    /// Pending errors of one line.
    pub fn line_errors(&self, row: RowId) -> Vec<&FieldError> {
        self.field_errors
            .values()
            .filter(|error| error.field.row() == Some(row))
            .collect()
    }

    /// Enabled controls for the current state.
    pub fn controls(&self) -> Controls {
        let deleted = self.status == EditorStatus::Deleted;
        let editable = !deleted && !self.locked;
        Controls {
            edit_fields: editable,
            append_line: editable,
            save_draft: editable,
            finalize: editable,
            delete: !deleted && self.mode.invoice_id().is_some(),
            line_count: self.draft.lines.len(),
        }
    }

    /// Alert to show: a root error takes precedence over a success.
    ///
    /// Every failed submit or delete shows the generic message, whatever its
    /// kind; the editor stays usable for a retry.
    pub fn banner(&self) -> Option<Banner> {
        if self.root_error.is_some() {
            return Some(Banner::Error(GENERIC_ERROR_MESSAGE.to_string()));
        }
        match self.status {
            EditorStatus::SubmitSucceeded(Submission::Created) => {
                Some(Banner::Success(CREATED_MESSAGE.to_string()))
            }
            EditorStatus::SubmitSucceeded(Submission::Updated) => {
                Some(Banner::Success(UPDATED_MESSAGE.to_string()))
            }
            EditorStatus::Deleted => Some(Banner::Success(DELETED_MESSAGE.to_string())),
            EditorStatus::Idle | EditorStatus::SubmitFailed => None,
        }
    }

    /// Wire payload the next submission would send.
    ///
    /// # Errors
    /// Same as [`to_wire_payload`]
    pub fn preview_payload(&self) -> Result<InvoiceWirePayload> {
        to_wire_payload(&self.draft)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn ensure_editable(&self) -> Result<()> {
        if self.status == EditorStatus::Deleted {
            return Err(Error::Deleted);
        }
        if self.locked {
            return Err(Error::Locked);
        }
        Ok(())
    }

    /// Append a blank line with the configured default quantity.
    ///
    /// # Errors
    /// `Error::Locked` once finalized, `Error::Deleted` after a delete
    pub fn append_line(&mut self) -> Result<RowId> {
        self.ensure_editable()?;
        let row = self
            .draft
            .lines
            .push_blank(self.config.default_quantity.clone());
        debug!("Appended line {}", row);
        Ok(row)
    }

    /// Remove the line at `index`.
    ///
    /// Ignored (returns `false`) for index 0, out-of-range indexes, and
    /// locked or deleted editors.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if self.ensure_editable().is_err() {
            return false;
        }
        match self.draft.lines.remove(index) {
            Some(line) => {
                let row = line.row();
                self.field_errors.retain(|field, _| field.row() != Some(row));
                debug!("Removed line {} at index {}", row, index);
                true
            }
            None => false,
        }
    }

    /// # Errors
    /// `Error::Locked` once finalized, `Error::Deleted` after a delete
    pub fn set_customer(&mut self, customer: Option<Customer>) -> Result<()> {
        self.ensure_editable()?;
        self.draft.customer = customer;
        self.field_errors.remove(&FieldKey::Customer);
        Ok(())
    }

    /// # Errors
    /// `Error::Locked` once finalized, `Error::Deleted` after a delete
    pub fn set_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable()?;
        self.draft.date = date;
        self.field_errors.remove(&FieldKey::Date);
        Ok(())
    }

    /// # Errors
    /// `Error::Locked` once finalized, `Error::Deleted` after a delete
    pub fn set_deadline(&mut self, deadline: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable()?;
        self.draft.deadline = deadline;
        self.field_errors.remove(&FieldKey::Deadline);
        Ok(())
    }

    fn edit_line<F>(&mut self, row: RowId, field: FieldKey, edit: F) -> Result<()>
    where
        F: FnOnce(&mut InvoiceLine),
    {
        self.ensure_editable()?;
        let line = self
            .draft
            .lines
            .get_mut(row)
            .ok_or(Error::UnknownRow(row))?;
        edit(line);
        self.field_errors.remove(&field);
        Ok(())
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_product(&mut self, row: RowId, product: Option<Product>) -> Result<()> {
        self.edit_line(row, FieldKey::Product(row), |line| line.product = product)
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_quantity(&mut self, row: RowId, quantity: Option<Quantity>) -> Result<()> {
        self.edit_line(row, FieldKey::Quantity(row), |line| line.quantity = quantity)
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_label(&mut self, row: RowId, label: Option<String>) -> Result<()> {
        self.edit_line(row, FieldKey::Label(row), |line| line.label = label)
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_unit(&mut self, row: RowId, unit: Option<Unit>) -> Result<()> {
        self.edit_line(row, FieldKey::Unit(row), |line| line.unit = unit)
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_price(&mut self, row: RowId, price: Option<Amount>) -> Result<()> {
        self.edit_line(row, FieldKey::Price(row), |line| line.price = price)
    }

    /// # Errors
    /// `Error::UnknownRow` for a row not in the draft, `Error::Locked` once finalized
    pub fn set_tax(&mut self, row: RowId, tax: Option<Amount>) -> Result<()> {
        self.edit_line(row, FieldKey::Tax(row), |line| line.tax = tax)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Mark the draft finalized and submit it.
    ///
    /// # Errors
    /// Same as [`InvoiceEditor::submit`]
    pub async fn finalize<A: InvoiceApi>(&mut self, api: &A) -> Result<()> {
        self.submit(api, SubmitMode::Finalize).await
    }

    /// Validate, transform and send the draft.
    ///
    /// Validation failures are stored as field errors and returned as
    /// `Error::Validation`; the collaborator is not called and the editor is
    /// back to `Idle` with no banner. Any other failure moves the editor to
    /// `SubmitFailed` with a root error, keeping the draft for a retry.
    ///
    /// # Errors
    ///
    /// - `Error::Validation`: customer, product or quantity missing
    /// - `Error::Locked` / `Error::Deleted`: the editor no longer accepts submissions
    /// - `Error::Network` / `Error::NotFound`: the collaborator call failed
    pub async fn submit<A: InvoiceApi>(&mut self, api: &A, mode: SubmitMode) -> Result<()> {
        self.ensure_editable()?;

        // A new attempt clears the outcome of the previous one.
        self.status = EditorStatus::Idle;
        self.root_error = None;

        match mode {
            SubmitMode::Finalize => self.draft.finalization = Finalization::Finalized,
            SubmitMode::Draft => {
                if self.draft.finalization.is_finalized() {
                    self.draft.finalization = Finalization::Draft;
                }
            }
        }

        let errors = self.draft.validate();
        if !errors.is_empty() {
            debug!("Submit ({}) blocked by {} field error(s)", mode, errors.len());
            self.metrics.record_validation_failure(errors.len());
            self.field_errors = errors
                .iter()
                .map(|error| (error.field, error.clone()))
                .collect();
            return Err(Error::Validation(errors));
        }
        self.field_errors.clear();

        let timer = Instant::now();
        let result = match to_wire_payload(&self.draft) {
            Ok(payload) => self.send(api, &payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(submission) => {
                self.status = EditorStatus::SubmitSucceeded(submission);
                self.root_error = None;
                if self.draft.finalization.is_finalized() {
                    self.locked = true;
                }
                self.metrics.record_submit(mode, timer.elapsed());
                info!(
                    "✓ Invoice submitted ({}, {:?}) in {:?}",
                    mode,
                    submission,
                    timer.elapsed()
                );
                Ok(())
            }
            Err(e) => {
                warn!("✗ Invoice submit ({}) failed: {}", mode, e);
                self.metrics.record_failure("submit", &e.to_string());
                self.status = EditorStatus::SubmitFailed;
                self.root_error = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn send<A: InvoiceApi>(&self, api: &A, payload: &InvoiceWirePayload) -> Result<Submission> {
        match self.mode {
            EditorMode::Create => self
                .with_retry("create", move || api.create_invoice(payload))
                .await
                .map(|_| Submission::Created),
            EditorMode::Edit(id) => self
                .with_retry("update", move || api.update_invoice(id, payload))
                .await
                .map(|_| Submission::Updated),
        }
    }

    /// Delete the persisted invoice after confirmation.
    ///
    /// # Errors
    ///
    /// - `Error::MissingIdentifier`: create mode, nothing to delete
    /// - `Error::Deleted`: already deleted
    /// - `Error::Network` / `Error::NotFound`: the collaborator call failed;
    ///   the editor moves to `SubmitFailed` with a root error
    pub async fn delete<A, C>(&mut self, api: &A, confirm: &C) -> Result<DeleteOutcome>
    where
        A: InvoiceApi,
        C: Confirm + ?Sized,
    {
        if self.status == EditorStatus::Deleted {
            return Err(Error::Deleted);
        }
        let id = self.mode.invoice_id().ok_or(Error::MissingIdentifier)?;

        if !confirm.confirm(&self.config.confirm_prompt) {
            debug!("Delete of invoice {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let timer = Instant::now();
        let result = self
            .with_retry("delete", move || api.delete_invoice(id))
            .await;
        match result {
            Ok(()) => {
                self.status = EditorStatus::Deleted;
                self.root_error = None;
                self.field_errors.clear();
                self.draft = InvoiceDraft::new(self.config.default_quantity.clone());
                self.metrics.record_delete(id, timer.elapsed());
                info!("✓ Invoice {} deleted in {:?}", id, timer.elapsed());
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                warn!("✗ Invoice {} delete failed: {}", id, e);
                self.metrics.record_failure("delete", &e.to_string());
                self.status = EditorStatus::SubmitFailed;
                self.root_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Run `call`, retrying network failures up to `config.retry_count` times
    /// with exponential backoff.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.retry_count.saturating_add(1);
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempts >= max_attempts || e.kind() != ErrorKind::Network {
                        return Err(e);
                    }
                    debug!(
                        "Invoice {} failed (attempt {}/{}), retrying...",
                        operation, attempts, max_attempts
                    );
                    tokio::time::sleep(backoff_delay(attempts)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiOperation, InMemoryInvoiceApi};

    fn customer() -> Customer {
        Customer {
            id: 6773,
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            ..Default::default()
        }
    }

    fn first_row(editor: &InvoiceEditor) -> RowId {
        editor.draft().lines.as_slice()[0].row()
    }

    fn ready_editor() -> InvoiceEditor {
        let mut editor = InvoiceEditor::new(EditorConfig::default());
        let row = first_row(&editor);
        editor.set_customer(Some(customer())).unwrap();
        editor.set_product(row, Some(Product::reference(67))).unwrap();
        editor
    }

    #[test]
    fn test_new_editor_state() {
        let editor = InvoiceEditor::new(EditorConfig::default());

        assert_eq!(editor.mode(), EditorMode::Create);
        assert_eq!(editor.status(), EditorStatus::Idle);
        assert_eq!(editor.draft().lines.len(), 1);
        assert!(editor.banner().is_none());

        let controls = editor.controls();
        assert!(controls.edit_fields && controls.append_line);
        assert!(controls.save_draft && controls.finalize);
        assert!(!controls.delete);
        assert!(!controls.remove_line(0));
    }

    #[test]
    fn test_append_and_remove() {
        let mut editor = InvoiceEditor::new(EditorConfig::default());
        let row = editor.append_line().unwrap();

        assert_eq!(editor.draft().lines.len(), 2);
        assert!(editor.controls().remove_line(1));
        assert!(!editor.remove_line(0));
        assert!(editor.remove_line(1));
        assert!(editor.draft().lines.get(row).is_none());
        assert!(!editor.remove_line(0));
        assert_eq!(editor.draft().lines.len(), 1);
    }

    #[test]
    fn test_unknown_row() {
        let mut editor = InvoiceEditor::new(EditorConfig::default());
        let err = editor
            .set_label(RowId::new(99), Some("x".to_string()))
            .unwrap_err();
        assert_eq!(err, Error::UnknownRow(RowId::new(99)));
    }

    #[tokio::test]
    async fn test_validation_errors_follow_rows() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = InvoiceEditor::new(EditorConfig::default());
        let first = first_row(&editor);
        editor.set_customer(Some(customer())).unwrap();
        editor.set_product(first, Some(Product::reference(1))).unwrap();
        let second = editor.append_line().unwrap();
        let third = editor.append_line().unwrap();
        editor.set_product(third, Some(Product::reference(3))).unwrap();
        editor.set_quantity(third, None).unwrap();

        let err = editor.submit(&api, SubmitMode::Draft).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(editor.field_error(FieldKey::Product(second)).is_some());
        assert!(editor.field_error(FieldKey::Quantity(third)).is_some());
        assert!(api.calls().is_empty());

        // Removing the second line keeps the third line's error attached to it.
        assert!(editor.remove_line(1));
        assert!(editor.field_error(FieldKey::Product(second)).is_none());
        assert_eq!(editor.line_errors(third).len(), 1);
        assert_eq!(editor.draft().lines.position(third), Some(1));

        editor.set_quantity(third, Some(Quantity::from(2u32))).unwrap();
        assert!(editor.line_errors(third).is_empty());
        assert_eq!(editor.status(), EditorStatus::Idle);
    }

    #[tokio::test]
    async fn test_submit_creates_once() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = ready_editor();

        editor
            .submit(&api, SubmitMode::Draft)
            .await
            .expect("Failed to submit");

        assert_eq!(
            editor.status(),
            EditorStatus::SubmitSucceeded(Submission::Created)
        );
        assert_eq!(api.call_count(ApiOperation::CreateInvoice), 1);
        assert_eq!(
            editor.banner(),
            Some(Banner::Success(CREATED_MESSAGE.to_string()))
        );
        assert!(!editor.is_locked());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft() {
        let api = InMemoryInvoiceApi::new();
        api.fail(ApiOperation::CreateInvoice, Error::Network("500".to_string()));
        let mut editor = ready_editor();
        let before = editor.preview_payload().unwrap();

        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());

        assert_eq!(editor.status(), EditorStatus::SubmitFailed);
        assert_eq!(
            editor.banner(),
            Some(Banner::Error(GENERIC_ERROR_MESSAGE.to_string()))
        );
        assert_eq!(editor.preview_payload().unwrap(), before);
        assert!(editor.controls().edit_fields);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_network_failure() {
        let api = InMemoryInvoiceApi::new();
        api.fail(ApiOperation::CreateInvoice, Error::Network("503".to_string()));
        let mut editor = ready_editor();
        editor.config.retry_count = 2;

        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());
        assert_eq!(api.call_count(ApiOperation::CreateInvoice), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = InvoiceEditor::from_invoice(
            &Invoice {
                id: 42,
                customer_id: Some(6773),
                customer: None,
                finalized: false,
                paid: false,
                date: None,
                deadline: None,
                total: None,
                tax: None,
                invoice_lines: Vec::new(),
            },
            Some(customer()),
            EditorConfig::default().with_retry(3),
        );
        let row = first_row(&editor);
        editor.set_product(row, Some(Product::reference(1))).unwrap();

        let err = editor.submit(&api, SubmitMode::Draft).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(api.call_count(ApiOperation::UpdateInvoice), 1);
        assert_eq!(
            editor.banner(),
            Some(Banner::Error(GENERIC_ERROR_MESSAGE.to_string()))
        );
        assert!(editor.controls().edit_fields);
    }

    #[tokio::test]
    async fn test_action_failures_share_generic_banner() {
        let api = InMemoryInvoiceApi::new();
        api.fail(
            ApiOperation::CreateInvoice,
            Error::NotFound("invoice".to_string()),
        );
        let mut editor = ready_editor();

        let err = editor.submit(&api, SubmitMode::Draft).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            editor.banner(),
            Some(Banner::Error(GENERIC_ERROR_MESSAGE.to_string()))
        );

        // Delete of an invoice that vanished server-side.
        let mut editor = InvoiceEditor::from_invoice(
            &Invoice {
                id: 9,
                customer_id: None,
                customer: None,
                finalized: false,
                paid: false,
                date: None,
                deadline: None,
                total: None,
                tax: None,
                invoice_lines: Vec::new(),
            },
            None,
            EditorConfig::default(),
        );
        let err = editor.delete(&api, &true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(editor.status(), EditorStatus::SubmitFailed);
        assert_eq!(
            editor.banner(),
            Some(Banner::Error(GENERIC_ERROR_MESSAGE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_outcome() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = ready_editor();
        editor
            .submit(&api, SubmitMode::Draft)
            .await
            .expect("Failed to submit");
        assert!(editor.banner().is_some());

        editor.set_customer(None).unwrap();
        let err = editor.submit(&api, SubmitMode::Draft).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(editor.status(), EditorStatus::Idle);
        assert!(editor.banner().is_none());
        assert!(editor.field_error(FieldKey::Customer).is_some());
        assert_eq!(api.call_count(ApiOperation::CreateInvoice), 1);
    }

    #[tokio::test]
    async fn test_validation_after_failure_clears_root_error() {
        let api = InMemoryInvoiceApi::new();
        api.fail(ApiOperation::CreateInvoice, Error::Network("500".to_string()));
        let mut editor = ready_editor();
        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());
        assert!(editor.root_error().is_some());

        let row = first_row(&editor);
        editor.set_quantity(row, None).unwrap();
        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());

        assert!(editor.root_error().is_none());
        assert_eq!(editor.status(), EditorStatus::Idle);
        assert!(editor.field_error(FieldKey::Quantity(row)).is_some());
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        assert_eq!(backoff_delay(1), Duration::from_millis(100));
        assert_eq!(backoff_delay(2), Duration::from_millis(200));
        assert_eq!(backoff_delay(4), Duration::from_millis(800));
        assert_eq!(backoff_delay(64), MAX_BACKOFF);
        assert_eq!(backoff_delay(65), MAX_BACKOFF);
        assert_eq!(backoff_delay(u32::MAX), MAX_BACKOFF);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_retry_budget_does_not_overflow() {
        let api = InMemoryInvoiceApi::new();
        api.fail(ApiOperation::CreateInvoice, Error::Network("503".to_string()));
        let mut editor = ready_editor();
        editor.config.retry_count = 70;

        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());
        assert_eq!(api.call_count(ApiOperation::CreateInvoice), 71);
    }

    #[tokio::test]
    async fn test_finalize_locks_editor() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = ready_editor();
        let second = editor.append_line().unwrap();
        editor.set_product(second, Some(Product::reference(68))).unwrap();
        assert!(editor.controls().remove_line(1));

        editor.finalize(&api).await.expect("Failed to finalize");

        assert!(editor.is_locked());
        assert_eq!(api.created_payloads()[0].finalized, Some(true));
        let controls = editor.controls();
        assert!(!controls.edit_fields && !controls.append_line);
        assert!(!controls.save_draft && !controls.finalize);
        assert!(!controls.remove_line(1));
        assert_eq!(editor.append_line(), Err(Error::Locked));
        assert!(!editor.remove_line(1));
        assert_eq!(editor.draft().lines.len(), 2);
        assert_eq!(editor.set_customer(None), Err(Error::Locked));
        assert_eq!(
            editor.submit(&api, SubmitMode::Draft).await,
            Err(Error::Locked)
        );
    }

    #[tokio::test]
    async fn test_failed_finalize_does_not_lock() {
        let api = InMemoryInvoiceApi::new();
        api.fail(ApiOperation::CreateInvoice, Error::Network("500".to_string()));
        let mut editor = ready_editor();

        assert!(editor.finalize(&api).await.is_err());
        assert!(!editor.is_locked());
        assert!(editor.controls().finalize);

        // Saving as draft afterwards drops the unsaved finalization.
        api.recover(ApiOperation::CreateInvoice);
        editor
            .submit(&api, SubmitMode::Draft)
            .await
            .expect("Failed to submit");
        assert_eq!(api.created_payloads().last().unwrap().finalized, Some(false));
        assert!(!editor.is_locked());
    }

    #[tokio::test]
    async fn test_delete_requires_identifier() {
        let api = InMemoryInvoiceApi::new();
        let mut editor = ready_editor();

        assert_eq!(
            editor.delete(&api, &true).await,
            Err(Error::MissingIdentifier)
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_hooks() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[derive(Clone, Default)]
        struct Counting {
            submits: Arc<AtomicUsize>,
            rejected: Arc<AtomicUsize>,
        }

        impl EditorMetrics for Counting {
            fn record_submit(&self, _mode: SubmitMode, _duration: Duration) {
                self.submits.fetch_add(1, Ordering::SeqCst);
            }
            fn record_validation_failure(&self, _error_count: usize) {
                self.rejected.fetch_add(1, Ordering::SeqCst);
            }
        }

        let api = InMemoryInvoiceApi::new();
        let metrics = Counting::default();
        let mut editor =
            InvoiceEditor::new(EditorConfig::default()).with_metrics(Box::new(metrics.clone()));

        assert!(editor.submit(&api, SubmitMode::Draft).await.is_err());
        let row = first_row(&editor);
        editor.set_customer(Some(customer())).unwrap();
        editor.set_product(row, Some(Product::reference(2))).unwrap();
        editor.submit(&api, SubmitMode::Draft).await.unwrap();

        assert_eq!(metrics.rejected.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.submits.load(Ordering::SeqCst), 1);
    }
}
