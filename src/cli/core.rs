//! Command dispatch, error reporting, and the ledger helpers shared by
//! command handlers.

use std::{
    io,
    str::FromStr,
    sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use splitledger_config::{Config, ConfigError};
use splitledger_core::{storage::LedgerStorage, CoreError};
use splitledger_domain::Ledger;
use strsim::levenshtein;
use thiserror::Error;
use uuid::Uuid;

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;

use super::io as cli_io;
use super::registry::CommandEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Failure of a single command. The shell reports it and keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No ledger is open. Use `ledger new` or `ledger open` first.")]
    LedgerNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit SplitLedger?", true)
            .map_err(|err| CliError::Input(err.to_string()))
    }

    /// Asks before a destructive action. Script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => cli_io::confirm_action(&self.theme, prompt, false),
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::LedgerNotLoaded => {
                cli_io::print_error(CommandError::LedgerNotLoaded);
                cli_io::print_hint("Try `ledger new Trip Ana Ben` to get started.");
            }
            CommandError::Core(CoreError::Validation(message)) => cli_io::print_error(message),
            other => cli_io::print_error(other),
        }
        Ok(())
    }

    pub(crate) fn with_ledger<T>(
        &self,
        f: impl FnOnce(&Ledger) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let ledger = self.ledger.as_ref().ok_or(CommandError::LedgerNotLoaded)?;
        f(ledger)
    }

    /// Runs a mutation against the open ledger and saves it when it succeeds.
    pub(crate) fn with_ledger_mut<T>(
        &mut self,
        f: impl FnOnce(&mut Ledger) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        let ledger = self.ledger.as_mut().ok_or(CommandError::LedgerNotLoaded)?;
        let value = f(ledger)?;
        self.save_current()?;
        Ok(value)
    }

    pub(crate) fn save_current(&self) -> CommandResult {
        if let (Some(name), Some(ledger)) = (&self.ledger_name, &self.ledger) {
            self.storage.save_ledger(name, ledger)?;
        }
        Ok(())
    }

    /// Makes `ledger` the open ledger and remembers it for the next session.
    pub(crate) fn set_ledger(&mut self, name: &str, ledger: Ledger) -> CommandResult {
        self.ledger = Some(ledger);
        self.ledger_name = Some(name.to_string());
        self.config_write().last_opened_ledger = Some(name.to_string());
        self.persist_config()
    }

    pub(crate) fn auto_load_last(&mut self) -> Result<(), CliError> {
        if self.mode != CliMode::Interactive || self.ledger.is_some() {
            return Ok(());
        }
        let Some(name) = self.config_read().last_opened_ledger.clone() else {
            return Ok(());
        };
        match self.storage.load_ledger(&name) {
            Ok(ledger) => {
                self.ledger = Some(ledger);
                self.ledger_name = Some(name.clone());
                cli_io::print_success(format!("Opened last ledger `{name}`."));
            }
            Err(err) => tracing::warn!(ledger = %name, error = %err, "could not reopen last ledger"),
        }
        Ok(())
    }

    pub(crate) fn config_read(&self) -> RwLockReadGuard<'_, Config> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn config_write(&self) -> RwLockWriteGuard<'_, Config> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        let config = self.config_read();
        self.config_manager.save(&config)?;
        Ok(())
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn money(&self, amount: Decimal) -> String {
        self.formatters.money(amount)
    }

    pub(crate) fn signed(&self, amount: Decimal) -> String {
        self.formatters.signed(amount)
    }

    pub(crate) fn date(&self, date: NaiveDate) -> String {
        use splitledger_core::DateFormatter;
        self.formatters.format_date(date)
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{input}` is not a date (use YYYY-MM-DD)."))
    })
}

/// Parses a money amount, ignoring a leading `$` and thousands separators.
pub(crate) fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '$')
        .collect();
    Decimal::from_str(&cleaned)
        .map_err(|_| CommandError::InvalidArguments(format!("`{input}` is not an amount.")))
}

/// First eight hex digits of an id, enough to address an entry in the shell.
pub(crate) fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
