//! Recorded real-world repayments between two roster members.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub date: NaiveDate,
    pub from: Person,
    pub to: Person,
    pub amount: Decimal,
}

impl Settlement {
    pub fn new(date: NaiveDate, from: Person, to: Person, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            from,
            to,
            amount,
        }
    }

    pub fn involves(&self, person: &str) -> bool {
        self.from.as_str() == person || self.to.as_str() == person
    }
}

impl Displayable for Settlement {
    fn display_label(&self) -> String {
        format!("Settle up: {} → {}", self.from, self.to)
    }
}
