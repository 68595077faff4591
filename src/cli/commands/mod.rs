pub mod balances;
pub mod config;
pub mod expense;
pub mod history;
pub mod ledger;
pub mod person;
pub mod settle;
pub mod system;

use chrono::NaiveDate;

use crate::cli::core::{parse_date, CommandError};
use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(ledger::definitions());
    commands.extend(person::definitions());
    commands.extend(expense::definitions());
    commands.extend(settle::definitions());
    commands.extend(balances::definitions());
    commands.extend(history::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

/// Positional arguments plus `--name value` options.
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    pub positional: Vec<&'a str>,
    options: Vec<(&'static str, &'a str)>,
}

impl<'a> Args<'a> {
    /// Splits `args`, accepting only the option names in `known`.
    pub fn parse(args: &[&'a str], known: &[&'static str]) -> Result<Self, CommandError> {
        let mut parsed = Args::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            let option = known
                .iter()
                .copied()
                .find(|candidate| *candidate == name)
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!("Unknown option `--{name}`."))
                })?;
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("Option `--{name}` needs a value."))
            })?;
            parsed.options.push((option, value));
        }
        Ok(parsed)
    }

    /// Last value given for `name`.
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(option, _)| *option == name)
            .map(|(_, value)| *value)
    }

    pub fn date(&self) -> Result<Option<NaiveDate>, CommandError> {
        self.option("date").map(parse_date).transpose()
    }
}

/// Expands `Ana,Ben Cho` style arguments into trimmed names.
pub(crate) fn names(args: &[&str]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| splitledger_domain::parse_list(arg))
        .collect()
}
