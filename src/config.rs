//! Editor configuration.

use crate::model::Quantity;

/// Default prompt shown before deleting an invoice.
pub const DEFAULT_CONFIRM_PROMPT: &str = "Delete this invoice? This cannot be undone.";

/// Settings for one editor session.
///
/// # Example
///
/// ```
/// use invoice_kit::{EditorConfig, Quantity};
///
/// let config = EditorConfig::default()
///     .with_default_quantity(Some(Quantity::from(2u32)))
///     .with_retry(3);
///
/// assert_eq!(config.retry_count, 3);
/// ```
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Quantity of newly appended lines. `None` leaves it empty, which the
    /// user must fill in before submitting.
    pub default_quantity: Option<Quantity>,

    /// Number of retry attempts for submit and delete calls (0 = no retry).
    ///
    /// Only network failures are retried, with exponential backoff starting
    /// at 100ms. Validation failures never reach the network.
    pub retry_count: u32,

    /// Prompt passed to the confirmation collaborator before a delete.
    pub confirm_prompt: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            default_quantity: Some(Quantity::from(1u32)),
            retry_count: 0,
            confirm_prompt: DEFAULT_CONFIRM_PROMPT.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn with_default_quantity(mut self, quantity: Option<Quantity>) -> Self {
        self.default_quantity = quantity;
        self
    }

    /// Set retry count for network calls.
    pub fn with_retry(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_confirm_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.confirm_prompt = prompt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.default_quantity, Some(Quantity::from(1u32)));
        assert_eq!(config.retry_count, 0);
        assert_eq!(config.confirm_prompt, DEFAULT_CONFIRM_PROMPT);
    }

    #[test]
    fn test_builder() {
        let config = EditorConfig::default()
            .with_default_quantity(None)
            .with_retry(2)
            .with_confirm_prompt("Sure?");

        assert!(config.default_quantity.is_none());
        assert_eq!(config.retry_count, 2);
        assert_eq!(config.confirm_prompt, "Sure?");
    }
}
