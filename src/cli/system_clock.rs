use chrono::{DateTime, Local, NaiveDate, Utc};

use splitledger_core::Clock;

/// Wall clock. "Today" is the local calendar date, matching what the user
/// sees on their own machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
