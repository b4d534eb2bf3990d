//! Ledger domain models, persistence-friendly types, and aggregate queries.

pub mod budget;
pub mod clock;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod snapshot;
pub mod streak;
pub mod transaction;

pub use budget::{BudgetStatus, Totals};
pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{DailyNet, Ledger};
pub use snapshot::{Snapshot, CURRENT_SCHEMA_VERSION};
pub use streak::StreakRecord;
pub use transaction::{Transaction, TransactionKind};
