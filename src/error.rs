//! Error types for the order book and matching engine.
//!
//! ## Recoverability
//!
//! - [`BookError::InvalidOrder`] and [`BookError::OrderNotFound`] are caller
//!   errors. They are raised before any mutation, so the caller can fix the
//!   input and retry.
//! - [`BookError::CrossedBook`] means the matching loop itself is broken.
//!   It is never retried.

use thiserror::Error;

/// Errors surfaced by book, engine and exchange operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Malformed order: zero quantity, missing limit price, duplicate id, ...
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: &'static str },

    /// Cancel/remove/amend referencing an absent or already-terminal order
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: u64 },

    /// The book was found crossed outside of a matching pass
    #[error("crossed book invariant violated: best bid {bid} >= best ask {ask}")]
    CrossedBook { bid: u64, ask: u64 },
}

impl BookError {
    /// Shorthand for [`BookError::InvalidOrder`]
    pub fn invalid(reason: &'static str) -> Self {
        BookError::InvalidOrder { reason }
    }

    /// Returns true for invariant violations that must not be retried
    pub fn is_fatal(&self) -> bool {
        matches!(self, BookError::CrossedBook { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_crossed_book_is_fatal() {
        assert!(!BookError::invalid("zero quantity").is_fatal());
        assert!(!BookError::OrderNotFound { order_id: 7 }.is_fatal());
        assert!(BookError::CrossedBook { bid: 101, ask: 100 }.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BookError::invalid("zero quantity").to_string(),
            "invalid order: zero quantity"
        );
        assert_eq!(
            BookError::OrderNotFound { order_id: 42 }.to_string(),
            "order 42 not found"
        );
    }
}
