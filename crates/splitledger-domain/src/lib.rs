//! splitledger-domain
//!
//! Pure domain models (Person, Expense, Settlement, Ledger, balances).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod balance;
pub mod common;
pub mod expense;
pub mod ledger;
pub mod settlement;

pub use balance::*;
pub use common::*;
pub use expense::*;
pub use ledger::*;
pub use settlement::*;
