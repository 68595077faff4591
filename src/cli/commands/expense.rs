//! `expense` command: record, edit, and list shared purchases.

use std::sync::Arc;

use splitledger_core::{
    split_rule_label, CoreError, ExpenseDraft, ExpenseService, LedgerService, SplitError,
};
use splitledger_domain::{Expense, Ledger, SplitPolicy};

use crate::cli::commands::{names, Args};
use crate::cli::core::{parse_amount, short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section, table, Align};
use crate::cli::registry::CommandEntry;

const ADD_USAGE: &str = "expense add <amount> <payer> [participants...] [--desc text] [--date YYYY-MM-DD] [--split equal|percent|shares|exact] [--values v1,v2,r] [--note text]";
const EDIT_USAGE: &str = "expense edit <id> [--amount n] [--payer name] [--with a,b] [--desc text] [--date YYYY-MM-DD] [--split policy] [--values v1,v2] [--note text]";
const ADD_OPTIONS: &[&str] = &["desc", "date", "split", "values", "note"];
const EDIT_OPTIONS: &[&str] = &[
    "amount", "payer", "with", "desc", "date", "split", "values", "note",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Record, edit, and list shared expenses",
        "expense add <amount> <payer> [participants...] [--desc text] [--date YYYY-MM-DD]
    [--split equal|percent|shares|exact] [--values v1,v2,r] [--note text]
expense edit <id> [--amount n] [--payer name] [--with a,b] [--desc text] [--date YYYY-MM-DD]
    [--split policy] [--values v1,v2] [--note text]
expense list",
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::usage("expense <add|edit|list>"));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "edit" => handle_edit(context, rest),
        "list" | "ls" => handle_list(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense subcommand `{other}`. Available: add, edit, list"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, ADD_OPTIONS)?;
    let [amount, payer, participants @ ..] = args.positional.as_slice() else {
        return Err(CommandError::usage(ADD_USAGE));
    };
    let amount = parse_amount(amount)?;
    let participants = match names(participants) {
        given if !given.is_empty() => given,
        _ => default_participants(context)?,
    };

    let mut draft = ExpenseDraft::new(
        args.option("desc").unwrap_or_default(),
        amount,
        *payer,
        participants.clone(),
    );
    if let Some(policy) = args.option("split") {
        draft = draft.with_split(parse_policy(policy)?, args.option("values").unwrap_or_default());
    } else if let Some(values) = args.option("values") {
        return Err(CommandError::InvalidArguments(format!(
            "`--values {values}` needs `--split percent|shares|exact`."
        )));
    }
    if let Some(date) = args.date()? {
        draft = draft.on(date);
    }
    draft.notes = args.option("note").map(str::to_string);

    let clock = Arc::clone(&context.clock);
    let id = context.with_ledger_mut(|ledger| Ok(ExpenseService::add(ledger, draft, clock.as_ref())?))?;

    context.config_write().remember_participants(&participants);
    context.persist_config()?;

    context.with_ledger(|ledger| {
        if let Some(expense) = ledger.expense(id) {
            io::print_success(format!(
                "Added `{}` [{}]: {} paid {}.",
                expense.description,
                short_id(&id),
                expense.payer,
                context.money(expense.amount)
            ));
            print_shares(context, expense);
        }
        Ok(())
    })
}

/// Participants remembered from the last expense that are still here, else
/// the whole roster.
fn default_participants(context: &ShellContext) -> Result<Vec<String>, CommandError> {
    let roster: Vec<String> = context.with_ledger(|ledger| {
        Ok(ledger.roster.iter().map(ToString::to_string).collect())
    })?;
    let remembered = context.config_read().participants_on(&roster);
    Ok(if remembered.is_empty() { roster } else { remembered })
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, EDIT_OPTIONS)?;
    let [needle] = args.positional.as_slice() else {
        return Err(CommandError::usage(EDIT_USAGE));
    };
    let (id, mut draft) = context.with_ledger(|ledger| {
        let id = LedgerService::find_entry(ledger, needle)?;
        let expense = ledger.expense(id).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`{needle}` is a settlement. Use `settle edit`."
            ))
        })?;
        Ok((id, draft_from(expense)))
    })?;

    if let Some(amount) = args.option("amount") {
        draft.amount = parse_amount(amount)?;
    }
    if let Some(payer) = args.option("payer") {
        draft.payer = payer.to_string();
    }
    if let Some(with) = args.option("with") {
        draft.participants = names(&[with]);
    }
    if let Some(desc) = args.option("desc") {
        draft.description = desc.to_string();
    }
    if let Some(date) = args.date()? {
        draft.date = Some(date);
    }
    match (args.option("split"), args.option("values")) {
        (Some(policy), values) => {
            draft.split_policy = parse_policy(policy)?;
            draft.raw_split = values.unwrap_or_default().to_string();
        }
        (None, Some(values)) => draft.raw_split = values.to_string(),
        (None, None) => {}
    }
    draft.notes = args.option("note").map(str::to_string);

    let clock = Arc::clone(&context.clock);
    context.with_ledger_mut(|ledger| Ok(ExpenseService::update(ledger, id, draft, clock.as_ref())?))?;
    context.with_ledger(|ledger| {
        if let Some(expense) = ledger.expense(id) {
            io::print_success(format!("Updated `{}` [{}].", expense.description, short_id(&id)));
            print_shares(context, expense);
        }
        Ok(())
    })
}

fn draft_from(expense: &Expense) -> ExpenseDraft {
    ExpenseDraft {
        date: Some(expense.date),
        description: expense.description.clone(),
        amount: expense.amount,
        payer: expense.payer.to_string(),
        participants: expense.participants.iter().map(ToString::to_string).collect(),
        split_policy: expense.split_policy,
        raw_split: expense.raw_split.clone(),
        notes: None,
        created_by: None,
    }
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let rows = context.with_ledger(|ledger| Ok(expense_rows(context, ledger)))?;
    if rows.is_empty() {
        io::print_info("No expenses yet. Use `expense add <amount> <payer>`.");
        return Ok(());
    }
    section("Expenses");
    table(
        &[
            ("Id", Align::Left),
            ("Date", Align::Left),
            ("Description", Align::Left),
            ("Payer", Align::Left),
            ("Amount", Align::Right),
            ("Split", Align::Left),
        ],
        &rows,
    );
    Ok(())
}

fn expense_rows(context: &ShellContext, ledger: &Ledger) -> Vec<Vec<String>> {
    let mut expenses: Vec<&Expense> = ledger.expenses.iter().collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    expenses
        .into_iter()
        .map(|expense| {
            vec![
                short_id(&expense.id),
                context.date(expense.date),
                expense.description.clone(),
                expense.payer.to_string(),
                context.money(expense.amount),
                split_rule_label(expense),
            ]
        })
        .collect()
}

fn print_shares(context: &ShellContext, expense: &Expense) {
    for (person, share) in &expense.shares {
        if *person == expense.payer {
            io::print_info(format!("  {person:<12} {} (own share)", context.money(*share)));
        } else {
            io::print_info(format!("  {person:<12} owes {}", context.money(*share)));
        }
    }
}

fn parse_policy(raw: &str) -> Result<SplitPolicy, CommandError> {
    raw.parse::<SplitPolicy>()
        .map_err(|err| CoreError::Split(SplitError::from(err)).into())
}
