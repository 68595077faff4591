//! Domain models for shared expenses and the split policies that divide them.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Per-participant owed amounts, in participant order.
pub type ShareMap = IndexMap<Person, Decimal>;

/// How an expense amount is divided between its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    #[default]
    Equal,
    Percent,
    Shares,
    Exact,
}

impl SplitPolicy {
    pub const ALL: [SplitPolicy; 4] = [
        SplitPolicy::Equal,
        SplitPolicy::Percent,
        SplitPolicy::Shares,
        SplitPolicy::Exact,
    ];

    /// Whether the policy reads per-participant values from raw split text.
    pub fn takes_values(self) -> bool {
        !matches!(self, SplitPolicy::Equal)
    }

    /// Whether a single `r` remainder token is accepted.
    pub fn allows_remainder(self) -> bool {
        matches!(self, SplitPolicy::Percent | SplitPolicy::Exact)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SplitPolicy::Equal => "equal",
            SplitPolicy::Percent => "percent",
            SplitPolicy::Shares => "shares",
            SplitPolicy::Exact => "exact",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when text does not name a known split policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown split type `{}`.", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for SplitPolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitPolicy::Equal),
            "percent" => Ok(SplitPolicy::Percent),
            "shares" => Ok(SplitPolicy::Shares),
            "exact" => Ok(SplitPolicy::Exact),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// A shared purchase paid by one person and owed by its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub payer: Person,
    pub participants: Vec<Person>,
    #[serde(default)]
    pub split_policy: SplitPolicy,
    #[serde(default)]
    pub raw_split: String,
    /// Frozen at creation or edit; never recomputed on read.
    pub shares: ShareMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        payer: Person,
        participants: Vec<Person>,
        split_policy: SplitPolicy,
        raw_split: impl Into<String>,
        shares: ShareMap,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            amount,
            payer,
            participants,
            split_policy,
            raw_split: raw_split.into(),
            shares,
            notes: None,
            created_by: None,
        }
    }

    /// Sum of the stored shares, saturating at the `Decimal` bounds.
    pub fn shares_total(&self) -> Decimal {
        self.shares
            .values()
            .fold(Decimal::ZERO, |total, share| total.saturating_add(*share))
    }

    pub fn share_of(&self, person: &str) -> Decimal {
        self.shares.get(person).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns `true` when `person` paid for or takes part in this expense.
    pub fn involves(&self, person: &str) -> bool {
        self.payer.as_str() == person || self.participants.iter().any(|p| p.as_str() == person)
    }
}
