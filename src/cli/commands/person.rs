use splitledger_core::{CoreError, LedgerService, RosterService};

use crate::cli::commands::names;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section, table, Align};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "person",
        "Manage the people sharing this ledger",
        "person add <name>[,name...]\nperson remove <name>\nperson list",
        cmd_person,
    )]
}

fn cmd_person(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::usage("person <add|remove|list>"));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "remove" | "rm" => handle_remove(context, rest),
        "list" | "ls" => handle_list(context),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown person subcommand `{other}`. Available: add, remove, list"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let people = names(args);
    if people.is_empty() {
        return Err(CommandError::usage("person add <name>[,name...]"));
    }
    let added = context.with_ledger_mut(|ledger| {
        people
            .iter()
            .map(|name| RosterService::add_person(ledger, name).map_err(CommandError::from))
            .collect::<Result<Vec<_>, _>>()
    });
    match added {
        Ok(added) => {
            for person in added {
                io::print_success(format!("Added {person}."));
            }
            Ok(())
        }
        // Names added before the failure stay on the roster; persist them.
        Err(err) => {
            context.save_current()?;
            Err(err)
        }
    }
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let joined = args.join(" ");
    let name = joined.trim();
    if name.is_empty() {
        return Err(CommandError::usage("person remove <name>"));
    }
    let involved = context.with_ledger(|ledger| {
        if !ledger.has_person(name) {
            return Err(CoreError::PersonNotFound(name.to_string()).into());
        }
        let expenses = ledger
            .expenses
            .iter()
            .filter(|e| e.involves(name))
            .count();
        let settlements = ledger
            .settlements
            .iter()
            .filter(|s| s.involves(name))
            .count();
        Ok(expenses + settlements)
    })?;
    let prompt = if involved > 0 {
        format!("Remove {name} and the {involved} entries that involve them?")
    } else {
        format!("Remove {name}?")
    };
    if !context.confirm(&prompt)? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    let report =
        context.with_ledger_mut(|ledger| Ok(RosterService::remove_person(ledger, name)?))?;
    if report.total() == 0 {
        io::print_success(format!("Removed {name}."));
    } else {
        io::print_success(format!(
            "Removed {name} ({} expenses, {} settlements).",
            report.expenses_removed, report.settlements_removed
        ));
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let rows = context.with_ledger(|ledger| {
        let totals = LedgerService::aggregates(ledger);
        Ok(ledger
            .roster
            .iter()
            .map(|person| {
                let paid = totals.paid.get(person.as_str()).copied().unwrap_or_default();
                vec![person.to_string(), context.money(paid)]
            })
            .collect::<Vec<_>>())
    })?;
    if rows.is_empty() {
        io::print_info("Nobody here yet. Use `person add <name>`.");
        return Ok(());
    }
    section("People");
    table(&[("Person", Align::Left), ("Paid", Align::Right)], &rows);
    Ok(())
}
