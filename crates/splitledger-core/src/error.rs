use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use splitledger_domain::{Person, SplitPolicy, UnknownPolicy};

/// Validation failures raised while turning split input into shares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("Value count must match participants (expected {expected}, got {found}).")]
    CountMismatch { expected: usize, found: usize },
    #[error("Please enter numeric values (or a single r); `{0}` is not a number.")]
    NonNumeric(String),
    #[error("Only one \"r\" (remainder) is allowed.")]
    MultipleRemainders,
    #[error("\"r\" is not supported for {0} splits.")]
    RemainderNotSupported(SplitPolicy),
    #[error("Percents must sum to 100 (got {0}).")]
    PercentSum(Decimal),
    #[error("Exact values must sum to the total amount ({total} vs {amount}).")]
    ExactSum { total: Decimal, amount: Decimal },
    #[error("Shares must be positive.")]
    NonPositiveWeights,
    #[error("Values are too large to split.")]
    ValueTooLarge,
    #[error("Unknown split type `{0}`.")]
    UnknownPolicy(String),
    #[error("Pick at least one participant.")]
    NoParticipants,
    #[error("Participant `{0}` is listed more than once.")]
    DuplicateParticipant(Person),
}

impl From<UnknownPolicy> for SplitError {
    fn from(err: UnknownPolicy) -> Self {
        SplitError::UnknownPolicy(err.0)
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Person not found: {0}")]
    PersonNotFound(String),
    #[error("That name already exists: {0}")]
    DuplicatePerson(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
