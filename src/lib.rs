#![doc(test(attr(deny(warnings))))]

//! Money Core keeps a personal income/expense ledger with per-category budget
//! limits, daily and per-category aggregates, and a logging streak.
//!
//! ```
//! use money_core::ledger::{Ledger, TransactionKind};
//! use money_core::storage::MemoryStore;
//!
//! let mut ledger = Ledger::open(Box::new(MemoryStore::new()));
//! ledger.add_transaction("Salary", 1000.0, TransactionKind::Income, "Job").unwrap();
//! ledger.add_transaction("Coffee", 40.0, TransactionKind::Expense, "Food").unwrap();
//! assert_eq!(ledger.balance(), 960.0);
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the `money_core=info` default filter.
pub fn init() {
    init_with_default("money_core=info");
}

/// Initializes global tracing; `RUST_LOG` takes precedence over `directive`.
pub fn init_with_default(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("Money Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
