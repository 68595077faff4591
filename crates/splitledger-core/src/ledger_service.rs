//! Helper functions for high-level ledger orchestration.

use uuid::Uuid;

use splitledger_domain::{AggregateResult, Ledger, Person, Transaction};

use crate::{aggregate_service::AggregateService, simplify_service::SimplifyService, CoreError};

/// Which kind of entry [`LedgerService::delete_entry`] removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Expense,
    Settlement,
}

/// Provides constructor and query helpers for [`Ledger`] instances.
pub struct LedgerService;

impl LedgerService {
    pub fn create(name: impl Into<String>) -> Ledger {
        Ledger::new(name)
    }

    pub fn create_with_roster<I, S>(name: impl Into<String>, people: I) -> Result<Ledger, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Ledger::new(name);
        for raw in people {
            let person = Person::parse(raw.as_ref())
                .ok_or_else(|| CoreError::validation("Enter a name."))?;
            if ledger.has_person(person.as_str()) {
                return Err(CoreError::DuplicatePerson(person.to_string()));
            }
            ledger.roster.push(person);
        }
        Ok(ledger)
    }

    pub fn rename(ledger: &mut Ledger, new_name: impl Into<String>) {
        ledger.name = new_name.into();
        ledger.touch();
    }

    /// Removes the expense or settlement with `id`.
    pub fn delete_entry(ledger: &mut Ledger, id: Uuid) -> Result<EntryKind, CoreError> {
        let kind = if let Some(pos) = ledger.expenses.iter().position(|e| e.id == id) {
            ledger.expenses.remove(pos);
            EntryKind::Expense
        } else if let Some(pos) = ledger.settlements.iter().position(|s| s.id == id) {
            ledger.settlements.remove(pos);
            EntryKind::Settlement
        } else {
            return Err(CoreError::EntryNotFound(id));
        };
        ledger.touch();
        tracing::info!(%id, ?kind, "deleted entry");
        Ok(kind)
    }

    /// Resolves a full id or a unique id prefix to an entry id.
    ///
    /// Hyphens are ignored, so prefixes of the compact form match too.
    pub fn find_entry(ledger: &Ledger, needle: &str) -> Result<Uuid, CoreError> {
        let needle: String = needle
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if needle.is_empty() {
            return Err(CoreError::validation("Enter an entry id."));
        }
        let ids = ledger
            .expenses
            .iter()
            .map(|e| e.id)
            .chain(ledger.settlements.iter().map(|s| s.id));
        let mut matches = ids.filter(|id| id.simple().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(CoreError::InvalidOperation(format!(
                "`{needle}` matches more than one entry"
            ))),
            (None, _) => Err(CoreError::InvalidOperation(format!(
                "no entry id starts with `{needle}`"
            ))),
        }
    }

    pub fn aggregates(ledger: &Ledger) -> AggregateResult {
        AggregateService::for_ledger(ledger)
    }

    /// Suggested payments that would bring the ledger to all square.
    pub fn suggestions(ledger: &Ledger) -> Vec<Transaction> {
        SimplifyService::simplify(&Self::aggregates(ledger).net)
    }
}
