//! Command handlers mapping shell input to ledger operations.

use std::{
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;

use crate::{
    errors::LedgerError,
    ledger::{BudgetStatus, Ledger, TransactionKind},
    utils::{build_info, paths},
};

use super::{
    context::{CommandError, CommandResult, ShellContext},
    format, output,
    registry::{CommandEntry, CommandRegistry},
};

const MIN_ID_PREFIX: usize = 4;

pub(crate) fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for entry in [
        CommandEntry::new(
            "add",
            "Record an income or expense",
            "add <income|expense> <amount> <category> <description...>",
            cmd_add,
        ),
        CommandEntry::new(
            "delete",
            "Delete a transaction by id or unique id prefix",
            "delete <id>",
            cmd_delete,
        ),
        CommandEntry::new(
            "list",
            "List transactions, newest first, optionally filtered",
            "list [filter...]",
            cmd_list,
        ),
        CommandEntry::new("balance", "Show the running balance", "balance", cmd_balance),
        CommandEntry::new("totals", "Show income and expense totals", "totals", cmd_totals),
        CommandEntry::new("daily", "Show the net amount per day", "daily", cmd_daily),
        CommandEntry::new(
            "categories",
            "Show expense totals per category",
            "categories",
            cmd_categories,
        ),
        CommandEntry::new(
            "budget",
            "Set or inspect category spending limits",
            "budget set <category> <limit> | budget status [category] | budget list",
            cmd_budget,
        ),
        CommandEntry::new("streak", "Show the logging streak", "streak", cmd_streak),
        CommandEntry::new(
            "export",
            "Write all transactions to a CSV file",
            "export [path]",
            cmd_export,
        ),
        CommandEntry::new(
            "clear",
            "Delete every transaction and budget",
            "clear [--yes]",
            cmd_clear,
        ),
        CommandEntry::new(
            "config",
            "Show or change preferences",
            "config [show] | config set <currency|data_file|export_file> <value>",
            cmd_config,
        ),
        CommandEntry::new("version", "Show build information", "version", cmd_version),
        CommandEntry::new("help", "List commands or show usage", "help [command]", cmd_help),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit),
    ] {
        registry.register(entry);
    }
    registry.alias("quit", "exit");
    registry.alias("rm", "delete");
    registry.alias("ls", "list");
    registry
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "usage: add <income|expense> <amount> <category> <description...>";
    let [kind, amount, category, description @ ..] = args else {
        return Err(CommandError::usage(usage));
    };
    if description.is_empty() {
        return Err(CommandError::usage(usage));
    }
    let kind: TransactionKind = kind.parse().map_err(CommandError::InvalidArguments)?;
    let amount = parse_amount(amount)?;
    let description = description.join(" ");

    let (txn, unsaved) = match context
        .ledger
        .add_transaction(&description, amount, kind, category)
    {
        Ok(txn) => (txn, None),
        Err(LedgerError::Unsaved {
            transaction,
            reason,
        }) => (*transaction, Some(reason)),
        Err(err) => return Err(err.into()),
    };
    output::success(format!(
        "Added {} `{}` {} in {} [{}]",
        txn.kind,
        txn.description,
        format::signed_money(&txn, context.currency()),
        txn.category,
        format::short_id(&txn)
    ));

    if let Some(status) = context.ledger.check_budget(&txn.category) {
        if status.exceeded {
            output::warning(budget_alert(&status, context.currency()));
        }
    }
    match unsaved {
        Some(reason) => Err(LedgerError::Persistence(reason).into()),
        None => Ok(()),
    }
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(CommandError::usage("usage: delete <id>"));
    };
    let id = resolve_transaction_id(&context.ledger, raw)?;
    context.ledger.delete_transaction(id)?;
    output::success(format!("Deleted transaction {}", id));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = args.join(" ");
    let transactions = context.ledger.list_transactions(&filter);
    if transactions.is_empty() {
        if filter.is_empty() {
            output::info("No transactions recorded yet.");
        } else {
            output::info(format!("No transactions match `{}`.", filter));
        }
        return Ok(());
    }

    let symbol = context.currency();
    let rows: Vec<Vec<String>> = transactions
        .iter()
        .map(|txn| {
            vec![
                format::short_id(txn),
                format::timestamp(&txn.timestamp),
                txn.description.clone(),
                txn.category.clone(),
                format::signed_money(txn, symbol),
            ]
        })
        .collect();
    output::render_table(
        &["ID", "Date", "Description", "Category", "Amount"],
        &rows,
        &[4],
    );
    output::info(format!("{} transaction(s)", transactions.len()));
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_args(args, "balance")?;
    output::info(format!(
        "Balance: {}",
        format::money(context.ledger.balance(), context.currency())
    ));
    Ok(())
}

fn cmd_totals(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_args(args, "totals")?;
    let totals = context.ledger.totals();
    let symbol = context.currency();
    output::render_table(
        &["Income", "Expense", "Net"],
        &[vec![
            format::money(totals.income, symbol),
            format::money(totals.expense, symbol),
            format::money(totals.net(), symbol),
        ]],
        &[0, 1, 2],
    );
    Ok(())
}

fn cmd_daily(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_args(args, "daily")?;
    let series = context.ledger.daily_series();
    if series.is_empty() {
        output::info("No transactions recorded yet.");
        return Ok(());
    }
    let symbol = context.currency();
    let rows: Vec<Vec<String>> = series
        .iter()
        .map(|point| {
            vec![
                point.day.format("%Y-%m-%d").to_string(),
                format::money(point.net, symbol),
            ]
        })
        .collect();
    output::render_table(&["Day", "Net"], &rows, &[1]);
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_args(args, "categories")?;
    let totals = context.ledger.category_expense_totals();
    if totals.is_empty() {
        output::info("No expenses recorded yet.");
        return Ok(());
    }
    let overall: f64 = totals.values().sum();
    let symbol = context.currency();
    let rows: Vec<Vec<String>> = totals
        .iter()
        .map(|(category, spent)| {
            vec![
                category.clone(),
                format::money(*spent, symbol),
                format::percent(spent / overall),
            ]
        })
        .collect();
    output::render_table(&["Category", "Spent", "Share"], &rows, &[1, 2]);
    Ok(())
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["set", category, limit] => {
            let limit = parse_amount(limit)?;
            context.ledger.set_budget(category, limit)?;
            output::success(format!(
                "Budget for {} set to {}",
                category.trim(),
                format::money(limit, context.currency())
            ));
            if let Some(status) = context.ledger.check_budget(category) {
                if status.exceeded {
                    output::warning(budget_alert(&status, context.currency()));
                }
            }
            Ok(())
        }
        ["status", category @ ..] if !category.is_empty() => {
            let category = category.join(" ");
            match context.ledger.check_budget(&category) {
                Some(status) => render_budgets(&[status], context.currency()),
                None => output::info(format!("No limit set for `{}`.", category)),
            }
            Ok(())
        }
        ["status"] | ["list"] | [] => {
            let statuses = context.ledger.budget_statuses();
            if statuses.is_empty() {
                output::info("No budgets set. Use `budget set <category> <limit>`.");
            } else {
                render_budgets(&statuses, context.currency());
            }
            Ok(())
        }
        _ => Err(CommandError::usage(
            "usage: budget set <category> <limit> | budget status [category] | budget list",
        )),
    }
}

fn cmd_streak(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    expect_no_args(args, "streak")?;
    let days = context.ledger.logging_streak();
    let unit = if days == 1 { "day" } else { "days" };
    output::info(format!("Logging streak: {} {}", days, unit));
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = match args {
        [] => PathBuf::from(&context.config.export_file),
        [path] => PathBuf::from(*path),
        _ => return Err(CommandError::usage("usage: export [path]")),
    };
    let count = export_to(&context.ledger, &path)?;
    output::success(format!(
        "Exported {} transaction(s) to {}",
        count,
        path.display()
    ));
    Ok(())
}

/// Writes the CSV next to `path` and renames it into place, so a failed
/// export never leaves a truncated file behind.
fn export_to(ledger: &Ledger, path: &Path) -> Result<usize, CommandError> {
    let mut buffer = Vec::new();
    ledger.export_csv(&mut buffer)?;
    let csv = String::from_utf8(buffer)
        .map_err(|err| LedgerError::Persistence(err.to_string()))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    paths::write_atomic(&tmp, &csv)?;
    fs::rename(&tmp, path)?;
    Ok(ledger.len())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let confirmed = match args {
        ["--yes"] | ["-y"] => true,
        [] => context.confirm("Delete every transaction and budget? This cannot be undone")?,
        _ => return Err(CommandError::usage("usage: clear [--yes]")),
    };
    if !confirmed {
        output::info("Nothing was deleted.");
        return Ok(());
    }
    context.ledger.clear_all()?;
    output::success("All data cleared.");
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            let rows: Vec<Vec<String>> = context
                .config
                .entries()
                .into_iter()
                .map(|(key, value)| vec![key.to_string(), value])
                .collect();
            output::render_table(&["Key", "Value"], &rows, &[]);
            output::info(format!("Stored in {}", context.config_manager.path().display()));
            Ok(())
        }
        ["set", key, value @ ..] if !value.is_empty() => {
            let mut updated = context.config.clone();
            updated.set(key, &value.join(" "))?;
            context.config_manager.save(&updated)?;
            context.config = updated;
            output::success(format!("Updated `{}`.", key));
            if *key == "data_file" {
                output::info("The new data file is used the next time the shell starts.");
            }
            Ok(())
        }
        _ => Err(CommandError::usage(
            "usage: config [show] | config set <currency|data_file|export_file> <value>",
        )),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info(build_info::current());
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let registry = context.registry();
    if let [name] = args {
        let Some(entry) = registry.get(&name.to_lowercase()) else {
            context.suggest_command(name);
            return Ok(());
        };
        output::info(format!("{} - {}", entry.name, entry.description));
        output::info(format!("usage: {}", entry.usage));
        return Ok(());
    }
    output::section("Commands");
    let rows: Vec<Vec<String>> = registry
        .list()
        .iter()
        .map(|entry| vec![entry.name.to_string(), entry.description.to_string()])
        .collect();
    output::render_table(&["Command", "Description"], &rows, &[]);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn expect_no_args(args: &[&str], command: &str) -> CommandResult {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::usage(format!("usage: {command}")))
    }
}

fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned
        .parse::<f64>()
        .map_err(|_| CommandError::usage(format!("`{}` is not a valid amount", raw)))
}

/// Accepts a full id or an unambiguous prefix of its hex form.
fn resolve_transaction_id(ledger: &Ledger, raw: &str) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    let prefix = raw.trim().to_lowercase().replace('-', "");
    if prefix.len() < MIN_ID_PREFIX {
        return Err(CommandError::usage(format!(
            "id prefix `{}` is too short (use at least {} characters)",
            raw, MIN_ID_PREFIX
        )));
    }
    let matches: Vec<Uuid> = ledger
        .list_transactions("")
        .iter()
        .map(|txn| txn.id)
        .filter(|id| id.simple().to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::usage(format!("no transaction with id `{}`", raw))),
        _ => Err(CommandError::usage(format!(
            "id prefix `{}` matches {} transactions",
            raw,
            matches.len()
        ))),
    }
}

fn budget_alert(status: &BudgetStatus, symbol: &str) -> String {
    format!(
        "Budget alert: {} spent {} of {} limit",
        status.category,
        format::money(status.spent, symbol),
        format::money(status.limit, symbol)
    )
}

fn render_budgets(statuses: &[BudgetStatus], symbol: &str) {
    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|status| {
            vec![
                status.category.clone(),
                format::money(status.spent, symbol),
                format::money(status.limit, symbol),
                format::money(status.remaining(), symbol),
                format::percent(status.utilization()),
                if status.exceeded { "OVER" } else { "ok" }.to_string(),
            ]
        })
        .collect();
    output::render_table(
        &["Category", "Spent", "Limit", "Remaining", "Used", "Status"],
        &rows,
        &[1, 2, 3, 4],
    );
}
