use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{LedgerError, Result},
    export,
    storage::SnapshotStore,
};

use super::{
    budget::{BudgetStatus, Totals},
    clock::{Clock, SystemClock},
    snapshot::{Snapshot, CURRENT_SCHEMA_VERSION},
    streak::StreakRecord,
    transaction::{Transaction, TransactionKind},
};

/// Net signed amount recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyNet {
    pub day: NaiveDate,
    pub net: f64,
}

/// Owns the transactions and budget limits of a single session.
///
/// Every mutation writes the whole snapshot through the injected store before
/// returning. A failed write is reported but the in-memory change stays; the
/// next mutation (or [`Ledger::flush`]) writes everything again.
pub struct Ledger {
    snapshot: Snapshot,
    streak: StreakRecord,
    store: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
    dirty: bool,
}

impl Ledger {
    /// Loads the persisted snapshot through `store`.
    pub fn new(store: Box<dyn SnapshotStore>, clock: Box<dyn Clock>) -> Self {
        let snapshot = store.load();
        let streak = match snapshot.streak {
            Some(record) => record,
            None if !snapshot.transactions.is_empty() => {
                let seeded = StreakRecord::from_dates(
                    snapshot.transactions.iter().map(Transaction::day),
                    clock.today(),
                );
                tracing::debug!(count = seeded.count, "seeded logging streak from history");
                seeded
            }
            None => StreakRecord::default(),
        };
        tracing::debug!(
            transactions = snapshot.transactions.len(),
            budgets = snapshot.budgets.len(),
            "ledger opened"
        );
        Self {
            snapshot,
            streak,
            store,
            clock,
            dirty: false,
        }
    }

    /// Ledger backed by `store` and the system clock.
    pub fn open(store: Box<dyn SnapshotStore>) -> Self {
        Self::new(store, Box::new(SystemClock))
    }

    /// Validates and records a new transaction, returning the stored record.
    pub fn add_transaction(
        &mut self,
        description: &str,
        amount: f64,
        kind: TransactionKind,
        category: &str,
    ) -> Result<Transaction> {
        let description = required_text("description", description)?;
        let category = required_text("category", category)?;
        ensure_positive("amount", amount)?;

        let now = self.clock.now();
        let transaction = Transaction::new(description, amount, kind, category, now);
        self.snapshot.transactions.push(transaction.clone());
        self.streak.record(now.date_naive());
        tracing::info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = transaction.amount,
            category = %transaction.category,
            "transaction added"
        );

        if let Some(status) = self.check_budget(&transaction.category) {
            if status.exceeded {
                tracing::warn!(
                    category = %status.category,
                    spent = status.spent,
                    limit = status.limit,
                    "budget exceeded"
                );
            }
        }

        match self.persist() {
            Ok(()) => Ok(transaction),
            Err(err) => Err(LedgerError::Unsaved {
                transaction: Box::new(transaction),
                reason: err.to_string(),
            }),
        }
    }

    /// Removes the transaction with `id`. The streak is left as is.
    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let index = self
            .snapshot
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        let removed = self.snapshot.transactions.remove(index);
        tracing::info!(id = %removed.id, "transaction deleted");
        self.persist()
    }

    /// Transactions whose description or category contains `filter`
    /// (case-insensitive), most recent first.
    pub fn list_transactions(&self, filter: &str) -> Vec<Transaction> {
        let needle = filter.trim().to_lowercase();
        self.snapshot
            .transactions
            .iter()
            .rev()
            .filter(|txn| txn.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.snapshot.transactions.iter().find(|txn| txn.id == id)
    }

    /// Sets or replaces the spending limit for `category`.
    pub fn set_budget(&mut self, category: &str, limit: f64) -> Result<()> {
        let category = required_text("category", category)?;
        ensure_positive("limit", limit)?;
        tracing::info!(category = %category, limit, "budget set");
        self.snapshot.budgets.insert(category, limit);
        self.persist()
    }

    /// Spending against the limit for `category`, or `None` when no limit is set.
    pub fn check_budget(&self, category: &str) -> Option<BudgetStatus> {
        let category = category.trim();
        let limit = *self.snapshot.budgets.get(category)?;
        Some(BudgetStatus::new(
            category,
            self.expense_for(category),
            limit,
        ))
    }

    /// Status of every configured limit, ordered by category.
    pub fn budget_statuses(&self) -> Vec<BudgetStatus> {
        self.snapshot
            .budgets
            .iter()
            .map(|(category, limit)| {
                BudgetStatus::new(category.clone(), self.expense_for(category), *limit)
            })
            .collect()
    }

    pub fn balance(&self) -> f64 {
        self.snapshot
            .transactions
            .iter()
            .fold(0.0, |total, txn| total + txn.signed_amount())
    }

    pub fn totals(&self) -> Totals {
        self.snapshot
            .transactions
            .iter()
            .fold(Totals::default(), |mut totals, txn| {
                match txn.kind {
                    TransactionKind::Income => totals.income += txn.amount,
                    TransactionKind::Expense => totals.expense += txn.amount,
                }
                totals
            })
    }

    /// Net amount per UTC calendar day, oldest day first.
    pub fn daily_series(&self) -> Vec<DailyNet> {
        let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for txn in &self.snapshot.transactions {
            *days.entry(txn.day()).or_insert(0.0) += txn.signed_amount();
        }
        days.into_iter()
            .map(|(day, net)| DailyNet { day, net })
            .collect()
    }

    /// Expense sum per category. Categories without expenses are absent.
    pub fn category_expense_totals(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for txn in self.snapshot.transactions.iter().filter(|t| t.is_expense()) {
            *totals.entry(txn.category.clone()).or_insert(0.0) += txn.amount;
        }
        totals
    }

    /// Consecutive days with activity, counted as of today.
    pub fn logging_streak(&self) -> u32 {
        self.streak.live_count(self.clock.today())
    }

    pub fn streak_record(&self) -> StreakRecord {
        self.streak
    }

    /// Drops every transaction, budget, and the streak. Cannot be undone.
    pub fn clear_all(&mut self) -> Result<()> {
        let removed = self.snapshot.transactions.len();
        self.snapshot.transactions.clear();
        self.snapshot.budgets.clear();
        self.streak = StreakRecord::default();
        tracing::info!(removed, "ledger cleared");
        self.persist()
    }

    /// Writes the current state again, typically after a failed save.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()
    }

    /// Whether the latest state has not reached the store yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Writes `list_transactions("")` as CSV.
    pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        export::write_csv(&self.list_transactions(""), writer)
    }

    /// Copy of the state as it would be persisted.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.snapshot.clone();
        snapshot.schema_version = CURRENT_SCHEMA_VERSION;
        snapshot.streak = Some(self.streak);
        snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.transactions.is_empty()
    }

    fn expense_for(&self, category: &str) -> f64 {
        self.snapshot
            .transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.category == category)
            .fold(0.0, |total, txn| total + txn.amount)
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        match self.store.save(&snapshot) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                tracing::warn!(error = %err, "snapshot not persisted, keeping in-memory state");
                Err(err)
            }
        }
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LedgerError::validation(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    Ok(())
}
