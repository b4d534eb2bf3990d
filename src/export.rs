//! CSV export of ledger transactions.
//!
//! Columns are `Description,Amount,Type,Category,Date`. Fields that contain
//! separators or quotes are quoted by the writer.

use std::io;

use chrono::SecondsFormat;
use csv::WriterBuilder;
use serde::Serialize;

use crate::{
    errors::{LedgerError, Result},
    ledger::Transaction,
};

pub const CSV_HEADER: [&str; 5] = ["Description", "Amount", "Type", "Category", "Date"];

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Date")]
    date: String,
}

impl<'a> From<&'a Transaction> for ExportRow<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            description: &txn.description,
            amount: txn.amount,
            kind: txn.kind.as_str(),
            category: &txn.category,
            date: txn.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Writes `transactions` in the given order, header first.
pub fn write_csv<W: io::Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for txn in transactions {
        csv_writer.serialize(ExportRow::from(txn))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Renders `transactions` into an in-memory CSV document.
pub fn to_csv_string(transactions: &[Transaction]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(transactions, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| LedgerError::Persistence(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn txn(description: &str, amount: f64, kind: TransactionKind, category: &str) -> Transaction {
        Transaction {
            id: Uuid::nil(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(csv, "Description,Amount,Type,Category,Date\n");
    }

    #[test]
    fn embedded_commas_are_quoted() {
        let rows = [txn("Pizza, large", 18.5, TransactionKind::Expense, "Food")];
        let csv = to_csv_string(&rows).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "\"Pizza, large\",18.5,expense,Food,2026-10-16T08:30:00Z");
    }
}
