use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{streak::StreakRecord, transaction::Transaction};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Full persisted state of a ledger: transactions in insertion order,
/// category limits, and the streak record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "Snapshot::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budgets: BTreeMap<String, f64>,
    #[serde(default)]
    pub streak: Option<StreakRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            transactions: Vec::new(),
            budgets: BTreeMap::new(),
            streak: None,
        }
    }
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.budgets.is_empty()
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Parses a serialized snapshot, rejecting versions newer than this build.
    pub fn from_json(data: &str) -> Result<Self, String> {
        let snapshot: Snapshot = serde_json::from_str(data).map_err(|err| err.to_string())?;
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(format!(
                "snapshot schema version {} is newer than supported version {}",
                snapshot.schema_version, CURRENT_SCHEMA_VERSION
            ));
        }
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the record invariants a ledger relies on: positive finite
    /// amounts and limits, non-blank text, and unique ids.
    pub fn validate(&self) -> Result<(), String> {
        let mut ids = HashSet::with_capacity(self.transactions.len());
        for txn in &self.transactions {
            if !ids.insert(txn.id) {
                return Err(format!("duplicate transaction id {}", txn.id));
            }
            if !txn.amount.is_finite() || txn.amount <= 0.0 {
                return Err(format!(
                    "transaction {} has non-positive amount {}",
                    txn.id, txn.amount
                ));
            }
            if txn.description.trim().is_empty() {
                return Err(format!("transaction {} has an empty description", txn.id));
            }
            if txn.category.trim().is_empty() {
                return Err(format!("transaction {} has an empty category", txn.id));
            }
        }
        for (category, limit) in &self.budgets {
            if category.trim().is_empty() {
                return Err("budget with an empty category".to_string());
            }
            if !limit.is_finite() || *limit <= 0.0 {
                return Err(format!("budget for {category} has non-positive limit {limit}"));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
