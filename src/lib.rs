#![doc(test(attr(deny(warnings))))]

//! SplitLedger keeps a shared-expense ledger for a group of people: who paid,
//! how each purchase is split, what everyone owes, and the fewest payments
//! that square everybody up.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("SplitLedger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
