use serde::{Deserialize, Serialize};

/// Spending position of one category against its configured limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    pub exceeded: bool,
}

impl BudgetStatus {
    pub fn new(category: impl Into<String>, spent: f64, limit: f64) -> Self {
        Self {
            category: category.into(),
            spent,
            limit,
            exceeded: spent > limit,
        }
    }

    /// Amount left before the limit is crossed. Negative once exceeded.
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    /// Share of the limit already spent, as a fraction.
    pub fn utilization(&self) -> f64 {
        if self.limit > 0.0 {
            self.spent / self.limit
        } else {
            0.0
        }
    }
}

/// Income and expense sums across the whole ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}
