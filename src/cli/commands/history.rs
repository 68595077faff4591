use splitledger_core::{EntryKind, HistoryFilter, HistoryService, LedgerService};

use crate::cli::commands::Args;
use crate::cli::core::{parse_date, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section, table, Align};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "history",
            "List expenses and settlements, newest first",
            "history [text] [--query text] [--payer name] [--from YYYY-MM-DD] [--to YYYY-MM-DD]",
            cmd_history,
        ),
        CommandEntry::new(
            "delete",
            "Delete an expense or settlement by id",
            "delete <id>",
            cmd_delete,
        ),
    ]
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["query", "payer", "from", "to"])?;
    let query = match args.option("query") {
        Some(query) => Some(query.to_string()),
        None if !args.positional.is_empty() => Some(args.positional.join(" ")),
        None => None,
    };
    let filter = HistoryFilter {
        query,
        payer: args.option("payer").map(str::to_string),
        from: args.option("from").map(parse_date).transpose()?,
        to: args.option("to").map(parse_date).transpose()?,
    };

    let rows: Vec<Vec<String>> = context.with_ledger(|ledger| {
        Ok(HistoryService::entries(ledger, &filter)
            .iter()
            .map(|entry| {
                let with = entry
                    .participants
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    short_id(&entry.id),
                    context.date(entry.date),
                    entry.description.clone(),
                    entry.payer.to_string(),
                    with,
                    context.money(entry.amount),
                    entry.rule.clone(),
                ]
            })
            .collect())
    })?;

    if rows.is_empty() {
        io::print_info("No matching entries.");
        return Ok(());
    }
    section("History");
    table(
        &[
            ("Id", Align::Left),
            ("Date", Align::Left),
            ("Description", Align::Left),
            ("Paid by", Align::Left),
            ("For", Align::Left),
            ("Amount", Align::Right),
            ("Split", Align::Left),
        ],
        &rows,
    );
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [needle] = args else {
        return Err(CommandError::usage("delete <id>"));
    };
    let (id, label) = context.with_ledger(|ledger| {
        let id = LedgerService::find_entry(ledger, needle)?;
        let label = match (ledger.expense(id), ledger.settlement(id)) {
            (Some(expense), _) => format!("expense `{}`", expense.description),
            (None, Some(settlement)) => {
                format!("settlement {} → {}", settlement.from, settlement.to)
            }
            (None, None) => String::from("entry"),
        };
        Ok((id, label))
    })?;
    if !context.confirm(&format!("Delete {label}?"))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    let kind = context.with_ledger_mut(|ledger| Ok(LedgerService::delete_entry(ledger, id)?))?;
    let noun = match kind {
        EntryKind::Expense => "expense",
        EntryKind::Settlement => "settlement",
    };
    io::print_success(format!("Deleted {noun} [{}].", short_id(&id)));
    Ok(())
}
