use std::sync::Arc;

use rust_decimal::Decimal;
use splitledger_core::{LedgerService, SettleService, SettlementDraft, SettlementService};
use splitledger_domain::Settlement;

use crate::cli::commands::Args;
use crate::cli::core::{parse_amount, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;

const ADD_USAGE: &str = "settle add <from> <to> <amount> [--date YYYY-MM-DD]";
const PREVIEW_USAGE: &str = "settle preview [<from> <to>] [amount]";
const EDIT_USAGE: &str =
    "settle edit <id> [--from name] [--to name] [--amount n] [--date YYYY-MM-DD]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "settle",
        "Record a payment between two people, or preview its effect",
        "settle add <from> <to> <amount> [--date YYYY-MM-DD]
settle preview [<from> <to>] [amount]
settle edit <id> [--from name] [--to name] [--amount n] [--date YYYY-MM-DD]",
        cmd_settle,
    )]
}

fn cmd_settle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::usage("settle <add|preview|edit>"));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "preview" => handle_preview(context, rest),
        "edit" => handle_edit(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown settle subcommand `{other}`. Available: add, preview, edit"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["date"])?;
    let [from, to, amount] = args.positional.as_slice() else {
        return Err(CommandError::usage(ADD_USAGE));
    };
    let mut draft = SettlementDraft::new(*from, *to, parse_amount(amount)?);
    if let Some(date) = args.date()? {
        draft = draft.on(date);
    }
    let clock = Arc::clone(&context.clock);
    let id = context
        .with_ledger_mut(|ledger| Ok(SettlementService::add(ledger, draft, clock.as_ref())?))?;
    context.with_ledger(|ledger| {
        if let Some(settlement) = ledger.settlement(id) {
            print_recorded(context, "Recorded", settlement);
        }
        Ok(())
    })
}

fn handle_preview(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let preview = context.with_ledger(|ledger| {
        let (from, to, amount) = match args {
            [] | [_] => {
                let (from, to) = SettleService::default_pair(ledger).ok_or_else(|| {
                    CommandError::InvalidArguments(
                        "Add at least two people before settling up.".into(),
                    )
                })?;
                (from.to_string(), to.to_string(), args.first().copied())
            }
            [from, to] => (from.to_string(), to.to_string(), None),
            [from, to, amount] => (from.to_string(), to.to_string(), Some(*amount)),
            _ => return Err(CommandError::usage(PREVIEW_USAGE)),
        };
        let amount = match amount {
            Some(raw) => parse_amount(raw)?,
            None => squaring_amount(ledger, &from, &to),
        };
        Ok(SettleService::preview(ledger, &from, &to, amount)?)
    })?;

    io::print_info(format!(
        "{} pays {} {}",
        preview.from,
        preview.to,
        context.money(preview.amount)
    ));
    io::print_info(format!(
        "Effect → {}: {} → {} | {}: {} → {}",
        preview.from,
        context.signed(preview.from_before),
        context.signed(preview.from_after),
        preview.to,
        context.signed(preview.to_before),
        context.signed(preview.to_after),
    ));
    if preview.worsens {
        io::print_warning(
            "Heads-up: with current balances this makes things worse. Consider swapping the two people.",
        );
    }
    Ok(())
}

/// The most `from` can pay `to` without either overshooting zero.
fn squaring_amount(ledger: &splitledger_domain::Ledger, from: &str, to: &str) -> Decimal {
    let net = LedgerService::aggregates(ledger);
    let owed_by_from = -net.net_of(from);
    let owed_to_to = net.net_of(to);
    owed_by_from
        .min(owed_to_to)
        .max(Decimal::ZERO)
        .round_dp(2)
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &["from", "to", "amount", "date"])?;
    let [needle] = args.positional.as_slice() else {
        return Err(CommandError::usage(EDIT_USAGE));
    };
    let (id, mut draft) = context.with_ledger(|ledger| {
        let id = LedgerService::find_entry(ledger, needle)?;
        let settlement = ledger.settlement(id).ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{needle}` is an expense. Use `expense edit`."))
        })?;
        let draft = SettlementDraft::new(
            settlement.from.as_str(),
            settlement.to.as_str(),
            settlement.amount,
        )
        .on(settlement.date);
        Ok((id, draft))
    })?;
    if let Some(from) = args.option("from") {
        draft.from = from.to_string();
    }
    if let Some(to) = args.option("to") {
        draft.to = to.to_string();
    }
    if let Some(amount) = args.option("amount") {
        draft.amount = parse_amount(amount)?;
    }
    if let Some(date) = args.date()? {
        draft.date = Some(date);
    }
    let clock = Arc::clone(&context.clock);
    context.with_ledger_mut(|ledger| {
        Ok(SettlementService::update(ledger, id, draft, clock.as_ref())?)
    })?;
    context.with_ledger(|ledger| {
        if let Some(settlement) = ledger.settlement(id) {
            print_recorded(context, "Updated", settlement);
        }
        Ok(())
    })
}

fn print_recorded(context: &ShellContext, verb: &str, settlement: &Settlement) {
    io::print_success(format!(
        "{verb} [{}] {} → {}: {} on {}.",
        short_id(&settlement.id),
        settlement.from,
        settlement.to,
        context.money(settlement.amount),
        context.date(settlement.date)
    ));
}
