//! `ledger` command: create, open, save, list, and back up ledgers.

use splitledger_core::{
    storage::{ledger_warnings, LedgerBackupInfo, LedgerStorage},
    LedgerService,
};

use crate::cli::commands::names;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section, table, Align};
use crate::cli::registry::CommandEntry;

const USAGE: &str = "ledger new <name> [people...]
ledger open <name>
ledger save [name]
ledger list
ledger backup [note]
ledger backups
ledger restore <number|backup id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "ledger",
        "Create, open, save, list, and back up ledgers",
        USAGE,
        cmd_ledger,
    )]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::usage(
            "ledger <new|open|save|list|backup|backups|restore>",
        ));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "new" => handle_new(context, rest),
        "open" | "load" => handle_open(context, rest),
        "save" => handle_save(context, rest),
        "list" => handle_list(context),
        "backup" => handle_backup(context, rest),
        "backups" | "list-backups" => handle_backups(context),
        "restore" => handle_restore(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown ledger subcommand `{other}`. Available: new, open, save, list, backup, backups, restore"
        ))),
    }
}

fn handle_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((name, people)) = args.split_first() else {
        return Err(CommandError::usage("ledger new <name> [people...]"));
    };
    if context.storage.exists(name) {
        return Err(CommandError::InvalidArguments(format!(
            "A ledger named `{name}` already exists. Use `ledger open {name}`."
        )));
    }
    let ledger = LedgerService::create_with_roster(*name, names(people))?;
    let count = ledger.roster.len();
    context.set_ledger(name, ledger)?;
    context.save_current()?;
    io::print_success(format!("Created ledger `{name}` with {count} people."));
    Ok(())
}

fn handle_open(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return Err(CommandError::usage("ledger open <name>"));
    };
    let ledger = context.storage.load_ledger(name)?;
    for warning in ledger_warnings(&ledger) {
        io::print_warning(warning);
    }
    let summary = format!(
        "Opened `{}`: {} people, {} expenses, {} settlements.",
        ledger.name,
        ledger.roster.len(),
        ledger.expenses.len(),
        ledger.settlements.len()
    );
    context.set_ledger(name, ledger)?;
    io::print_success(summary);
    Ok(())
}

/// Saves the open ledger, or saves a copy under a new name and switches to it.
fn handle_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context
        .ledger
        .clone()
        .ok_or(CommandError::LedgerNotLoaded)?;
    match args {
        [] => {
            context.save_current()?;
            io::print_success(format!("Saved `{}`.", ledger.name));
        }
        [name] => {
            context.storage.save_ledger(name, &ledger)?;
            context.set_ledger(name, ledger)?;
            io::print_success(format!("Saved as `{name}`."));
        }
        _ => return Err(CommandError::usage("ledger save [name]")),
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let ledgers = context.storage.list_ledger_metadata()?;
    if ledgers.is_empty() {
        io::print_info("No saved ledgers yet. Use `ledger new <name>`.");
        return Ok(());
    }
    let current = context
        .ledger_name
        .as_deref()
        .map(splitledger_storage_json::slug);
    let rows: Vec<Vec<String>> = ledgers
        .iter()
        .map(|meta| {
            let marker = if current.as_deref() == Some(meta.slug.as_str()) {
                "*"
            } else {
                ""
            };
            vec![
                marker.to_string(),
                meta.name.clone(),
                meta.slug.clone(),
                meta.people.to_string(),
                meta.expenses.to_string(),
                meta.settlements.to_string(),
                meta.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    section("Ledgers");
    table(
        &[
            ("", Align::Left),
            ("Name", Align::Left),
            ("Open as", Align::Left),
            ("People", Align::Right),
            ("Expenses", Align::Right),
            ("Settlements", Align::Right),
            ("Updated (UTC)", Align::Left),
        ],
        &rows,
    );
    Ok(())
}

fn handle_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = context
        .ledger_name
        .clone()
        .ok_or(CommandError::LedgerNotLoaded)?;
    let note = (!args.is_empty()).then(|| args.join(" "));
    let info = context.with_ledger(|ledger| {
        Ok(context
            .storage
            .backup_ledger(&name, ledger, note.as_deref())?)
    })?;
    io::print_success(format!("Backup `{}` created.", info.id));
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let backups = current_backups(context)?;
    if backups.is_empty() {
        io::print_info("No backups yet. Use `ledger backup [note]`.");
        return Ok(());
    }
    section("Backups");
    for (idx, backup) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}  {}", idx + 1, backup.created_at, backup.id));
    }
    Ok(())
}

fn handle_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("ledger restore <number|backup id>"));
    };
    let backups = current_backups(context)?;
    let backup = match reference.parse::<usize>() {
        Ok(number) => number.checked_sub(1).and_then(|idx| backups.get(idx)),
        Err(_) => backups.iter().find(|backup| backup.id == *reference),
    }
    .ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "No backup `{reference}`. Use `ledger backups` to list them."
        ))
    })?;
    if !context.confirm(&format!(
        "Replace the open ledger with backup {}?",
        backup.created_at
    ))? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    let restored = context.storage.restore_backup(backup)?;
    context.ledger = Some(restored);
    io::print_success(format!("Restored backup `{}`.", backup.id));
    Ok(())
}

fn current_backups(context: &ShellContext) -> Result<Vec<LedgerBackupInfo>, CommandError> {
    let name = context
        .ledger_name
        .as_deref()
        .ok_or(CommandError::LedgerNotLoaded)?;
    Ok(context.storage.list_backups(name)?)
}
