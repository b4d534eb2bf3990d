mod common;

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use money_core::{errors::LedgerError, ledger::TransactionKind};
use uuid::Uuid;

use common::memory_ledger;

#[test]
fn add_then_list_contains_exactly_one_matching_record() {
    let (mut ledger, _, _) = memory_ledger();
    let cases = [
        ("Salary", 1000.0, TransactionKind::Income, "Job"),
        ("Coffee", 4.5, TransactionKind::Expense, "Food"),
        ("Refund", 12.25, TransactionKind::Income, "Shopping"),
        ("Rent", 800.0, TransactionKind::Expense, "Housing"),
    ];

    for (description, amount, kind, category) in cases {
        let before_balance = ledger.balance();
        let before_len = ledger.list_transactions("").len();

        let txn = ledger
            .add_transaction(description, amount, kind, category)
            .expect("valid transaction");

        let listed = ledger.list_transactions("");
        assert_eq!(listed.len(), before_len + 1);
        let matching: Vec<_> = listed.iter().filter(|t| t.id == txn.id).collect();
        assert_eq!(matching.len(), 1);
        let stored = matching[0];
        assert_eq!(stored.description, description);
        assert_eq!(stored.amount, amount);
        assert_eq!(stored.kind, kind);
        assert_eq!(stored.category, category);

        let expected = match kind {
            TransactionKind::Income => before_balance + amount,
            TransactionKind::Expense => before_balance - amount,
        };
        assert!((ledger.balance() - expected).abs() < 1e-9);
    }
}

#[test]
fn delete_reverses_the_balance_contribution() {
    let (mut ledger, _, _) = memory_ledger();
    ledger
        .add_transaction("Salary", 1000.0, TransactionKind::Income, "Job")
        .unwrap();
    let coffee = ledger
        .add_transaction("Coffee", 40.0, TransactionKind::Expense, "Food")
        .unwrap();
    assert_eq!(ledger.balance(), 960.0);

    ledger.delete_transaction(coffee.id).unwrap();
    assert_eq!(ledger.balance(), 1000.0);
    assert_eq!(ledger.len(), 1);
    assert!(ledger.transaction(coffee.id).is_none());
}

#[test]
fn deleting_unknown_id_reports_not_found_and_changes_nothing() {
    let (mut ledger, store, _) = memory_ledger();
    ledger
        .add_transaction("Salary", 1000.0, TransactionKind::Income, "Job")
        .unwrap();
    let before = ledger.list_transactions("");
    let saves = store.save_count();

    let missing = Uuid::new_v4();
    let err = ledger.delete_transaction(missing).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(id) if id == missing));
    assert_eq!(ledger.list_transactions(""), before);
    assert_eq!(ledger.balance(), 1000.0);
    assert_eq!(store.save_count(), saves);
}

#[test]
fn listing_twice_without_mutation_is_stable() {
    let (mut ledger, _, clock) = memory_ledger();
    for (i, category) in ["Food", "Transport", "Food"].iter().enumerate() {
        clock.advance_days(1);
        ledger
            .add_transaction(&format!("item {i}"), 10.0, TransactionKind::Expense, category)
            .unwrap();
    }
    assert_eq!(ledger.list_transactions(""), ledger.list_transactions(""));
    assert_eq!(ledger.list_transactions("food"), ledger.list_transactions("food"));
}

#[test]
fn filter_matches_description_or_category_case_insensitively() {
    let (mut ledger, _, _) = memory_ledger();
    ledger
        .add_transaction("Groceries", 50.0, TransactionKind::Expense, "Food")
        .unwrap();
    ledger
        .add_transaction("Bus pass", 30.0, TransactionKind::Expense, "Transport")
        .unwrap();
    ledger
        .add_transaction("Food truck", 12.0, TransactionKind::Expense, "Eating out")
        .unwrap();

    let names = |filter: &str| -> Vec<String> {
        ledger
            .list_transactions(filter)
            .into_iter()
            .map(|t| t.description)
            .collect()
    };
    assert_eq!(names("FOOD"), vec!["Food truck", "Groceries"]);
    assert_eq!(names("transport"), vec!["Bus pass"]);
    assert_eq!(names("  "), vec!["Food truck", "Bus pass", "Groceries"]);
    assert!(names("rent").is_empty());
}

#[test]
fn salary_and_coffee_example() {
    let (mut ledger, _, _) = memory_ledger();
    ledger
        .add_transaction("Salary", 1000.0, TransactionKind::Income, "Job")
        .unwrap();
    ledger
        .add_transaction("Coffee", 40.0, TransactionKind::Expense, "Food")
        .unwrap();

    assert_eq!(ledger.balance(), 960.0);
    let expected: BTreeMap<String, f64> = [("Food".to_string(), 40.0)].into_iter().collect();
    assert_eq!(ledger.category_expense_totals(), expected);

    let totals = ledger.totals();
    assert_eq!(totals.income, 1000.0);
    assert_eq!(totals.expense, 40.0);
    assert_eq!(totals.net(), 960.0);
}

#[test]
fn budget_exceeded_only_when_spending_is_strictly_over_limit() {
    let (mut ledger, _, _) = memory_ledger();
    assert!(ledger.check_budget("Food").is_none());

    ledger.set_budget("Food", 30.0).unwrap();
    ledger
        .add_transaction("Snack", 10.0, TransactionKind::Expense, "Food")
        .unwrap();
    let status = ledger.check_budget("Food").expect("limit set");
    assert_eq!(status.spent, 10.0);
    assert_eq!(status.limit, 30.0);
    assert!(!status.exceeded);

    ledger
        .add_transaction("Lunch", 25.0, TransactionKind::Expense, "Food")
        .unwrap();
    let status = ledger.check_budget("Food").unwrap();
    assert_eq!(status.spent, 35.0);
    assert!(status.exceeded);
}

#[test]
fn spending_equal_to_limit_is_not_exceeded() {
    let (mut ledger, _, _) = memory_ledger();
    ledger.set_budget("Transport", 20.0).unwrap();
    ledger
        .add_transaction("Train", 20.0, TransactionKind::Expense, "Transport")
        .unwrap();
    ledger
        .add_transaction("Ticket refund", 5.0, TransactionKind::Income, "Transport")
        .unwrap();

    let status = ledger.check_budget("Transport").unwrap();
    assert_eq!(status.spent, 20.0);
    assert!(!status.exceeded);
    assert_eq!(status.remaining(), 0.0);
}

#[test]
fn setting_a_budget_again_replaces_the_limit() {
    let (mut ledger, _, _) = memory_ledger();
    ledger.set_budget("Food", 30.0).unwrap();
    ledger.set_budget("Food", 50.0).unwrap();
    ledger.set_budget("Fun", 10.0).unwrap();

    let statuses = ledger.budget_statuses();
    let pairs: Vec<_> = statuses
        .iter()
        .map(|s| (s.category.as_str(), s.limit))
        .collect();
    assert_eq!(pairs, vec![("Food", 50.0), ("Fun", 10.0)]);
}

#[test]
fn streak_counts_consecutive_days() {
    let (mut ledger, _, clock) = memory_ledger();
    assert_eq!(ledger.logging_streak(), 0);

    ledger
        .add_transaction("Breakfast", 8.0, TransactionKind::Expense, "Food")
        .unwrap();
    assert_eq!(ledger.logging_streak(), 1);

    clock.advance(chrono::Duration::hours(3));
    ledger
        .add_transaction("Lunch", 12.0, TransactionKind::Expense, "Food")
        .unwrap();
    assert_eq!(ledger.logging_streak(), 1);

    clock.advance_days(1);
    ledger
        .add_transaction("Dinner", 20.0, TransactionKind::Expense, "Food")
        .unwrap();
    assert_eq!(ledger.logging_streak(), 2);

    clock.advance_days(2);
    ledger
        .add_transaction("Snack", 3.0, TransactionKind::Expense, "Food")
        .unwrap();
    assert_eq!(ledger.logging_streak(), 1);
}

#[test]
fn streak_lapses_when_a_day_passes_without_logging() {
    let (mut ledger, _, clock) = memory_ledger();
    ledger
        .add_transaction("Coffee", 4.0, TransactionKind::Expense, "Food")
        .unwrap();
    clock.advance_days(1);
    ledger
        .add_transaction("Coffee", 4.0, TransactionKind::Expense, "Food")
        .unwrap();

    clock.advance_days(1);
    assert_eq!(ledger.logging_streak(), 2, "yesterday still counts");
    clock.advance_days(1);
    assert_eq!(ledger.logging_streak(), 0);
}

#[test]
fn deleting_does_not_change_the_streak() {
    let (mut ledger, _, _) = memory_ledger();
    let txn = ledger
        .add_transaction("Coffee", 4.0, TransactionKind::Expense, "Food")
        .unwrap();
    ledger.delete_transaction(txn.id).unwrap();
    assert_eq!(ledger.logging_streak(), 1);
}

#[test]
fn clear_all_empties_everything() {
    let (mut ledger, store, _) = memory_ledger();
    ledger
        .add_transaction("Salary", 1000.0, TransactionKind::Income, "Job")
        .unwrap();
    ledger.set_budget("Food", 30.0).unwrap();

    ledger.clear_all().unwrap();
    assert!(ledger.list_transactions("").is_empty());
    assert_eq!(ledger.balance(), 0.0);
    assert!(ledger.check_budget("Food").is_none());
    assert!(ledger.daily_series().is_empty());
    assert!(ledger.category_expense_totals().is_empty());
    assert_eq!(ledger.logging_streak(), 0);

    let stored = store.stored().expect("cleared state persisted");
    assert!(stored.transactions.is_empty());
    assert!(stored.budgets.is_empty());
}

#[test]
fn daily_series_buckets_by_utc_day() {
    let (mut ledger, _, clock) = memory_ledger();
    clock.set(Utc.with_ymd_and_hms(2026, 10, 15, 23, 59, 0).unwrap());
    ledger
        .add_transaction("Late snack", 6.0, TransactionKind::Expense, "Food")
        .unwrap();
    clock.set(Utc.with_ymd_and_hms(2026, 10, 16, 0, 1, 0).unwrap());
    ledger
        .add_transaction("Tip", 20.0, TransactionKind::Income, "Gig")
        .unwrap();
    ledger
        .add_transaction("Taxi", 15.0, TransactionKind::Expense, "Transport")
        .unwrap();

    let series: Vec<_> = ledger
        .daily_series()
        .into_iter()
        .map(|p| (p.day.to_string(), p.net))
        .collect();
    assert_eq!(
        series,
        vec![("2026-10-15".to_string(), -6.0), ("2026-10-16".to_string(), 5.0)]
    );
}

#[test]
fn persistence_failure_keeps_change_and_reports_it() {
    let (mut ledger, store, _) = memory_ledger();
    store.set_fail_saves(true);

    let err = ledger
        .add_transaction("Salary", 1000.0, TransactionKind::Income, "Job")
        .unwrap_err();
    assert!(err.is_persistence());
    assert!(!err.is_rejected());
    assert_eq!(ledger.len(), 1);
    assert!(ledger.has_unsaved_changes());

    let err = ledger.set_budget("Food", 5.0).unwrap_err();
    assert!(matches!(err, LedgerError::Persistence(_)));
    assert!(ledger.check_budget("Food").is_some());

    store.set_fail_saves(false);
    ledger.flush().unwrap();
    assert!(!ledger.has_unsaved_changes());
    let stored = store.stored().unwrap();
    assert_eq!(stored.transactions.len(), 1);
    assert_eq!(stored.budgets.get("Food"), Some(&5.0));
}

#[test]
fn failed_save_on_add_still_hands_back_the_record() {
    let (mut ledger, store, _) = memory_ledger();
    ledger.set_budget("Food", 5.0).unwrap();
    store.set_fail_saves(true);

    let err = ledger
        .add_transaction("Lunch", 12.0, TransactionKind::Expense, "Food")
        .unwrap_err();
    let transaction = match err {
        LedgerError::Unsaved { transaction, reason } => {
            assert!(!reason.is_empty());
            transaction
        }
        other => panic!("expected an unsaved record, got {other:?}"),
    };
    assert_eq!(transaction.description, "Lunch");
    assert_eq!(transaction.amount, 12.0);
    assert_eq!(ledger.transaction(transaction.id), Some(transaction.as_ref()));

    let status = ledger.check_budget("Food").unwrap();
    assert_eq!(status.spent, 12.0);
    assert!(status.exceeded);
}

#[test]
fn empty_and_cleared_ledgers_balance_to_positive_zero() {
    let (mut ledger, _, _) = memory_ledger();
    assert!(ledger.balance().is_sign_positive());
    assert_eq!(money_core::cli::format::money(ledger.balance(), "$"), "$0.00");

    ledger
        .add_transaction("Coffee", 4.0, TransactionKind::Expense, "Food")
        .unwrap();
    ledger.clear_all().unwrap();
    assert_eq!(ledger.balance(), 0.0);
    assert!(ledger.balance().is_sign_positive());
}
