//! Adds and removes roster members, cascading removals to their entries.

use splitledger_domain::{Ledger, Person};

use crate::CoreError;

/// Counts of what a roster removal took with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalReport {
    pub expenses_removed: usize,
    pub settlements_removed: usize,
}

impl RemovalReport {
    pub fn total(&self) -> usize {
        self.expenses_removed + self.settlements_removed
    }
}

pub struct RosterService;

impl RosterService {
    /// Appends a trimmed, unique name to the roster.
    pub fn add_person(ledger: &mut Ledger, name: &str) -> Result<Person, CoreError> {
        let person = Person::parse(name).ok_or_else(|| CoreError::validation("Enter a name."))?;
        if ledger.has_person(person.as_str()) {
            return Err(CoreError::DuplicatePerson(person.to_string()));
        }
        ledger.roster.push(person.clone());
        ledger.touch();
        tracing::info!(person = %person, "added person to roster");
        Ok(person)
    }

    /// Removes a person along with every expense and settlement that names them.
    pub fn remove_person(ledger: &mut Ledger, name: &str) -> Result<RemovalReport, CoreError> {
        let name = name.trim();
        let Some(index) = ledger.roster.iter().position(|p| p.as_str() == name) else {
            return Err(CoreError::PersonNotFound(name.to_string()));
        };
        ledger.roster.remove(index);

        let expenses_before = ledger.expenses.len();
        ledger.expenses.retain(|expense| !expense.involves(name));
        let settlements_before = ledger.settlements.len();
        ledger.settlements.retain(|settlement| !settlement.involves(name));

        let report = RemovalReport {
            expenses_removed: expenses_before - ledger.expenses.len(),
            settlements_removed: settlements_before - ledger.settlements.len(),
        };
        ledger.touch();
        tracing::info!(
            person = name,
            expenses = report.expenses_removed,
            settlements = report.settlements_removed,
            "removed person and dependent entries"
        );
        Ok(report)
    }
}
