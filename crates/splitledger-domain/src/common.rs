//! The display trait, tolerance constants, and the `Person` identifier.

use std::{borrow::Borrow, fmt};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum drift allowed between a split total and its target (percent or amount).
pub const SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Balances whose magnitude stays below this are treated as settled (half a cent).
pub const SETTLED_EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Minor units per major unit (cents per dollar).
pub const MINOR_UNITS: i64 = 100;

/// Largest magnitude accepted for a stored amount or share (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Returns `true` when `value` can be stored without risking overflow in totals.
pub fn within_limit(value: Decimal) -> bool {
    value.abs() <= MAX_AMOUNT
}

/// Returns `true` when `value` lies inside the settled band around zero.
pub fn is_settled(value: Decimal) -> bool {
    value.abs() <= SETTLED_EPSILON
}

/// A member of the ledger roster, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Person(String);

impl Person {
    /// Builds a person from a raw name, trimming surrounding whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for Person {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Person {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Person {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
