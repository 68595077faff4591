use std::{collections::HashSet, path::PathBuf};

use splitledger_domain::{within_limit, Ledger, MAX_AMOUNT, SUM_TOLERANCE};

use crate::CoreError;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError>;
}

/// Detects references to people outside the roster, participants without a
/// share, out-of-range amounts, and shares that no longer add up to their
/// expense amount.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let roster: HashSet<&str> = ledger.roster.iter().map(|p| p.as_str()).collect();
    let mut warnings = Vec::new();

    for expense in &ledger.expenses {
        if !roster.contains(expense.payer.as_str()) {
            warnings.push(format!(
                "expense {} references unknown payer {}",
                expense.id, expense.payer
            ));
        }
        for person in &expense.participants {
            if !roster.contains(person.as_str()) {
                warnings.push(format!(
                    "expense {} references unknown participant {}",
                    expense.id, person
                ));
            }
        }
        for person in &expense.participants {
            if !expense.shares.contains_key(person.as_str()) {
                warnings.push(format!(
                    "expense {} has no share for participant {}",
                    expense.id, person
                ));
            }
        }
        if !within_limit(expense.amount) || !expense.shares.values().all(|s| within_limit(*s)) {
            warnings.push(format!(
                "expense {} holds values beyond the supported limit of {}",
                expense.id, MAX_AMOUNT
            ));
        }
        for person in expense.shares.keys() {
            if !expense.participants.contains(person) {
                warnings.push(format!(
                    "expense {} holds a share for non-participant {}",
                    expense.id, person
                ));
            }
        }
        let total = expense.shares_total();
        if total.saturating_sub(expense.amount).abs() > SUM_TOLERANCE {
            warnings.push(format!(
                "expense {} shares total {} but amount is {}",
                expense.id, total, expense.amount
            ));
        }
    }

    for settlement in &ledger.settlements {
        if !within_limit(settlement.amount) {
            warnings.push(format!(
                "settlement {} amount {} is beyond the supported limit of {}",
                settlement.id, settlement.amount, MAX_AMOUNT
            ));
        }
        for (role, person) in [("from", &settlement.from), ("to", &settlement.to)] {
            if !roster.contains(person.as_str()) {
                warnings.push(format!(
                    "settlement {} references unknown {} person {}",
                    settlement.id, role, person
                ));
            }
        }
    }
    warnings
}
