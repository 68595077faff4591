//! splitledger-config
//!
//! Persistent user preferences: display locale and currency, theme, the last
//! opened ledger, and the participant list remembered between expenses.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, Theme};
