//! splitledger-core
//!
//! The shared-expense engine: share building, aggregation, debt
//! simplification, and the services that mutate a ledger snapshot.
//! Depends on splitledger-domain. No terminal I/O, no filesystem access.

pub mod aggregate_service;
pub mod error;
pub mod expense_service;
pub mod format;
pub mod history_service;
pub mod ledger_service;
pub mod roster_service;
pub mod settlement_service;
pub mod share_service;
pub mod simplify_service;
pub mod split_input;
pub mod storage;
pub mod time;

pub use aggregate_service::*;
pub use error::{CoreError, SplitError};
pub use expense_service::*;
pub use format::{CurrencyFormatter, DateFormatter};
pub use history_service::*;
pub use ledger_service::*;
pub use roster_service::*;
pub use settlement_service::*;
pub use share_service::*;
pub use simplify_service::*;
pub use split_input::{SplitToken, SplitValues};
pub use time::{Clock, FixedClock};

#[cfg(test)]
mod tests;
