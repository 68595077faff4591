//! The ledger snapshot: roster, expenses, and settlements for one group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, expense::Expense, settlement::Settlement};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub roster: Vec<Person>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            roster: Vec::new(),
            expenses: Vec::new(),
            settlements: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Builds a ledger pre-populated with the given roster names.
    pub fn with_roster<I, S>(name: impl Into<String>, people: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Person>,
    {
        let mut ledger = Self::new(name);
        ledger.roster = people.into_iter().map(Into::into).collect();
        ledger
    }

    pub fn has_person(&self, name: &str) -> bool {
        self.roster.iter().any(|p| p.as_str() == name)
    }

    pub fn person(&self, name: &str) -> Option<&Person> {
        self.roster.iter().find(|p| p.as_str() == name)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|e| e.id == id)
    }

    pub fn settlement(&self, id: Uuid) -> Option<&Settlement> {
        self.settlements.iter().find(|s| s.id == id)
    }

    pub fn settlement_mut(&mut self, id: Uuid) -> Option<&mut Settlement> {
        self.settlements.iter_mut().find(|s| s.id == id)
    }

    pub fn entry_count(&self) -> usize {
        self.expenses.len() + self.settlements.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
