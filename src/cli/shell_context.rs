use std::{
    env,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use dialoguer::theme::ColorfulTheme;
use splitledger_config::{Config, ConfigManager};
use splitledger_core::Clock;
use splitledger_domain::Ledger;
use splitledger_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::errors::CliError;

use super::commands;
use super::formatters::CliFormatters;
use super::output;
use super::registry::CommandRegistry;
use super::system_clock::SystemClock;

/// Relocates config, ledgers, and backups under one directory.
pub const HOME_ENV: &str = "SPLITLEDGER_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can touch: the open ledger, where it is
/// stored, and the user's preferences.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub ledger: Option<Ledger>,
    /// Name the open ledger is stored under.
    pub ledger_name: Option<String>,
    pub storage: JsonLedgerStorage,
    pub clock: Arc<dyn Clock>,
    pub formatters: CliFormatters,
    pub config_manager: ConfigManager,
    pub config: Arc<RwLock<Config>>,
    pub theme: ColorfulTheme,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    /// Builds the shell from `SPLITLEDGER_HOME`, or the per-user config
    /// directory when it is unset.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let home = env::var_os(HOME_ENV).map(PathBuf::from);
        let mut context = match home {
            Some(home) => Self::with_base_dir(mode, &home, Arc::new(SystemClock))?,
            None => Self::open(mode, &default_state_dir(), None, Arc::new(SystemClock))?,
        };
        context.auto_load_last()?;
        Ok(context)
    }

    /// Keeps config, ledgers, and backups under `base` unless the config
    /// names explicit roots.
    pub fn with_base_dir(
        mode: CliMode,
        base: &Path,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        Self::open(mode, base, Some(base), clock)
    }

    fn open(
        mode: CliMode,
        config_base: &Path,
        storage_base: Option<&Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        registry.register_all(commands::all_definitions());

        let config_manager = ConfigManager::with_base_dir(config_base)?;
        let config = config_manager.load()?;
        output::set_color_enabled(mode == CliMode::Interactive && config.ui_color_enabled);
        let storage = JsonLedgerStorage::new(storage_paths(&config, storage_base))?;
        tracing::debug!(
            ledgers = %storage.paths().ledger_root.display(),
            config = %config_manager.config_path().display(),
            "shell state located"
        );

        let config = Arc::new(RwLock::new(config));
        Ok(ShellContext {
            mode,
            registry,
            ledger: None,
            ledger_name: None,
            storage,
            clock,
            formatters: CliFormatters::new(Arc::clone(&config)),
            config_manager,
            config,
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        match &self.ledger {
            Some(ledger) => format!("splitledger ({})> ", ledger.name),
            None => "splitledger> ".into(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("splitledger")
}

/// Explicit roots in the config win; otherwise a relocated home keeps
/// everything together under it.
fn storage_paths(config: &Config, base: Option<&Path>) -> StoragePaths {
    match base {
        Some(base) if config.ledger_root.is_none() && config.backup_root.is_none() => {
            StoragePaths::under(base)
        }
        _ => StoragePaths {
            ledger_root: config.resolve_ledger_root(),
            backup_root: config.resolve_backup_root(),
        },
    }
}
