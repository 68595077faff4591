//! Balances, suggested payments, and integrity checks for the open ledger.

use rust_decimal::Decimal;
use splitledger_core::{storage::ledger_warnings, LedgerService, SettlementService};
use splitledger_domain::{is_settled, PersonBalance, Transaction, SUM_TOLERANCE};

use crate::cli::commands::Args;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section, table, Align};
use crate::cli::registry::CommandEntry;

pub const ALL_SQUARE: &str = "No payments needed — all square.";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "balances",
            "Show what everyone paid, owes, and their net balance",
            "balances",
            cmd_balances,
        ),
        CommandEntry::new(
            "suggest",
            "List the fewest payments that square everyone up",
            "suggest",
            cmd_suggest,
        ),
        CommandEntry::new(
            "pay",
            "Record a suggested payment (or all of them) as settlements",
            "pay <number|all> [--date YYYY-MM-DD]",
            cmd_pay,
        ),
        CommandEntry::new(
            "check",
            "Check the open ledger for inconsistencies",
            "check",
            cmd_check,
        ),
    ]
}

fn cmd_balances(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let (rows, strays, square) = context.with_ledger(|ledger| {
        let totals = LedgerService::aggregates(ledger);
        let rows: Vec<Vec<String>> = totals
            .balances()
            .iter()
            .map(|row| balance_row(context, row, ""))
            .collect();
        let strays: Vec<Vec<String>> = totals
            .off_roster
            .values()
            .map(|row| balance_row(context, row, " (not on roster)"))
            .collect();
        Ok((rows, strays, totals.is_all_square()))
    })?;
    if rows.is_empty() && strays.is_empty() {
        io::print_info("Nobody here yet. Use `person add <name>`.");
        return Ok(());
    }
    section("Balances");
    let all_rows: Vec<Vec<String>> = rows.into_iter().chain(strays).collect();
    table(
        &[
            ("Person", Align::Left),
            ("Paid", Align::Right),
            ("Share", Align::Right),
            ("Sent", Align::Right),
            ("Received", Align::Right),
            ("Net", Align::Right),
        ],
        &all_rows,
    );
    if square {
        io::print_success("Everyone is square.");
    }
    Ok(())
}

fn balance_row(context: &ShellContext, row: &PersonBalance, suffix: &str) -> Vec<String> {
    vec![
        format!("{}{suffix}", row.person),
        context.money(row.paid),
        context.money(row.owed),
        context.money(row.settled_out),
        context.money(row.settled_in),
        display_net(context, row.net),
    ]
}

/// Nets inside the settled band print as zero rather than `-$0.00`.
fn display_net(context: &ShellContext, net: Decimal) -> String {
    if is_settled(net) {
        context.signed(Decimal::ZERO)
    } else {
        context.signed(net)
    }
}

fn cmd_suggest(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let suggestions = context.with_ledger(|ledger| Ok(LedgerService::suggestions(ledger)))?;
    if suggestions.is_empty() {
        io::print_success(ALL_SQUARE);
        return Ok(());
    }
    section("Suggested payments");
    for (idx, txn) in suggestions.iter().enumerate() {
        io::print_info(format!("  {}. {}", idx + 1, describe(context, txn)));
    }
    io::print_hint("Use `pay <number>` or `pay all` to record them.");
    Ok(())
}

fn cmd_pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["date"])?;
    let [which] = args.positional.as_slice() else {
        return Err(CommandError::usage("pay <number|all> [--date YYYY-MM-DD]"));
    };
    let date = args.date()?.unwrap_or_else(|| context.today());
    let suggestions = context.with_ledger(|ledger| Ok(LedgerService::suggestions(ledger)))?;
    if suggestions.is_empty() {
        io::print_success(ALL_SQUARE);
        return Ok(());
    }

    let chosen: Vec<Transaction> = if which.eq_ignore_ascii_case("all") {
        context.with_ledger_mut(|ledger| {
            Ok(SettlementService::apply_suggestions(ledger, &suggestions, date)?)
        })?;
        suggestions
    } else {
        let number: usize = which.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{which}` is not a suggestion number."))
        })?;
        let txn = number
            .checked_sub(1)
            .and_then(|idx| suggestions.get(idx))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "There is no suggestion {number}; there are {}.",
                    suggestions.len()
                ))
            })?;
        context.with_ledger_mut(|ledger| {
            Ok(SettlementService::apply_suggestion(ledger, &txn, date)?)
        })?;
        vec![txn]
    };

    for txn in &chosen {
        io::print_success(format!("Recorded {}", describe(context, txn)));
    }
    let square = context.with_ledger(|ledger| Ok(LedgerService::aggregates(ledger).is_all_square()))?;
    if square {
        io::print_success(ALL_SQUARE);
    }
    Ok(())
}

fn describe(context: &ShellContext, txn: &Transaction) -> String {
    format!("{} → {}: {}", txn.from, txn.to, context.money(txn.amount))
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let problems = context.with_ledger(|ledger| {
        let mut problems = ledger_warnings(ledger);
        let totals = LedgerService::aggregates(ledger);
        let drift = totals
            .net
            .values()
            .copied()
            .chain(totals.off_roster.values().map(|row| row.net))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        if drift.abs() > SUM_TOLERANCE * Decimal::from(ledger.entry_count().max(1)) {
            problems.push(format!("Net balances do not sum to zero (off by {drift})."));
        }
        Ok(problems)
    })?;
    if problems.is_empty() {
        io::print_success("No problems found.");
    } else {
        for problem in &problems {
            io::print_warning(problem);
        }
        io::print_info(format!("{} problem(s) found.", problems.len()));
    }
    Ok(())
}
