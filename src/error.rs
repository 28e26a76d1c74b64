// src/error.rs - Error Types
//! Error taxonomy of the store. Every fallible operation returns one of these
//! to its caller; nothing is retried internally.

use crate::core::types::OrderId;

/// Error types used throughout the library
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed input order
    #[error("Order validation failed: {0}")]
    Validation(String),

    /// No order stored under this ID
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The backend could not be opened or initialized
    #[error("Storage backend unavailable at {location}: {reason}")]
    BackendUnavailable {
        /// Location that failed to open
        location: String,
        /// Underlying cause
        reason: String,
    },

    /// Read or write failure in the storage layer
    #[error("Storage I/O error: {0}")]
    BackendIo(String),

    /// A stored payload does not decode to an order
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Result type used throughout the library
pub type StoreResult<T> = Result<T, StoreError>;
