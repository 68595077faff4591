use splitledger_config::Config;

use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences, and back them up",
        "config show
config set <key> <value>
config backup [note]
config backups
config restore <number|backup name>",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return handle_show(context);
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "show" => handle_show(context),
        "set" => handle_set(context, rest),
        "backup" => handle_backup(context, rest),
        "backups" => handle_backups(context),
        "restore" => handle_restore(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{other}`. Available: show, set, backup, backups, restore"
        ))),
    }
}

fn handle_show(context: &mut ShellContext) -> CommandResult {
    let config = context.config_read();
    section("Configuration");
    for key in Config::KEYS {
        let value = config.get(key)?;
        io::print_info(format!("  {key:<20} {value}"));
    }
    if let Some(last) = &config.last_opened_ledger {
        io::print_info(format!("  {:<20} {last}", "last_opened_ledger"));
    }
    io::print_hint(format!(
        "Stored in {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn handle_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((key, value)) = args.split_first() else {
        return Err(CommandError::usage("config set <key> <value>"));
    };
    let value = value.join(" ");
    let shown = {
        let mut config = context.config_write();
        config.set(key, &value)?;
        config.get(key)?
    };
    context.persist_config()?;
    if *key == "ui_color_enabled" {
        let enabled = context.config_read().ui_color_enabled;
        output::set_color_enabled(context.mode == CliMode::Interactive && enabled);
    }
    io::print_success(format!("{key} = {shown}"));
    if matches!(*key, "ledger_root" | "backup_root") {
        io::print_hint("Storage locations take effect the next time SplitLedger starts.");
    }
    Ok(())
}

fn handle_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = {
        let config = context.config_read();
        context.config_manager.backup(&config, note.as_deref())?
    };
    io::print_success(format!("Configuration backed up as `{name}`."));
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    if backups.is_empty() {
        io::print_info("No configuration backups yet. Use `config backup [note]`.");
        return Ok(());
    }
    section("Configuration backups");
    for (idx, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {name}", idx + 1));
    }
    Ok(())
}

fn handle_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [reference] = args else {
        return Err(CommandError::usage("config restore <number|backup name>"));
    };
    let name = match reference.parse::<usize>() {
        Ok(number) => {
            let backups = context.config_manager.list_backups()?;
            number
                .checked_sub(1)
                .and_then(|idx| backups.get(idx).cloned())
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "No configuration backup {number}. Use `config backups` to list them."
                    ))
                })?
        }
        Err(_) => reference.to_string(),
    };
    let restored = context.config_manager.restore(&name)?;
    *context.config_write() = restored;
    context.persist_config()?;
    io::print_success(format!("Restored configuration from `{name}`."));
    Ok(())
}
