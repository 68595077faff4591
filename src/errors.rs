use splitledger_config::ConfigError;
use splitledger_core::CoreError;
use thiserror::Error;

/// Failures raised below the shell: ledger services, storage, configuration.
#[derive(Debug, Error)]
pub enum SplitLedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that end the shell itself rather than a single command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SplitLedgerError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Core(err.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Core(err.into())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Input(err.to_string())
    }
}
