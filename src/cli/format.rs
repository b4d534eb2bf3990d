use chrono::{DateTime, Utc};

use crate::ledger::{Transaction, TransactionKind};

/// Two-decimal amount with the currency symbol; negatives lead with `-`.
/// Values that round to zero, including `-0.0`, print unsigned.
pub fn money(amount: f64, symbol: &str) -> String {
    let cents = (amount * 100.0).round();
    if cents < 0.0 {
        format!("-{symbol}{:.2}", amount.abs())
    } else {
        format!("{symbol}{:.2}", amount.abs())
    }
}

/// Amount prefixed with `+` for income and `-` for expense.
pub fn signed_money(txn: &Transaction, symbol: &str) -> String {
    let sign = match txn.kind {
        TransactionKind::Income => '+',
        TransactionKind::Expense => '-',
    };
    format!("{sign}{symbol}{:.2}", txn.amount)
}

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// Leading characters of an id, enough to address it in commands.
pub fn short_id(txn: &Transaction) -> String {
    txn.id.simple().to_string()[..8].to_string()
}

pub fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
