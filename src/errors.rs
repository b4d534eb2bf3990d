use thiserror::Error;
use uuid::Uuid;

use crate::ledger::Transaction;

/// Error type that captures common ledger failures.
///
/// `Validation` and `NotFound` are raised before any state changes. A
/// `Persistence` failure leaves the in-memory ledger authoritative; the next
/// successful save writes the full snapshot again. `Unsaved` is the
/// persistence failure of an add and carries the record that was created.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Persistence error: {reason}")]
    Unsaved {
        transaction: Box<Transaction>,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    /// Whether the operation that produced this error left state untouched.
    pub fn is_rejected(&self) -> bool {
        matches!(self, LedgerError::Validation(_) | LedgerError::NotFound(_))
    }

    /// Whether the change was applied in memory but not written to the store.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(_) | LedgerError::Unsaved { .. }
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}
