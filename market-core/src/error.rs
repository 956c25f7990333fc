//! Error types for the marketplace ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marketplace ledger errors
///
/// Every validation failure is detected before any state mutation, so an
/// error always means no counter moved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unknown event, ticket type, or listing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input (empty name, bad date range, zero amount, duplicate ticket type)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested amount exceeds available stock or listed amount
    #[error("Insufficient inventory: {0}")]
    InsufficientInventory(String),

    /// Paid amount below price * amount
    #[error("Insufficient payment: {0}")]
    InsufficientPayment(String),

    /// Caller is not entitled to the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
