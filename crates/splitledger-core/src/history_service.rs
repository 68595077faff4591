//! Merged, newest-first view over expenses and settlements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use splitledger_domain::{Displayable, Expense, Ledger, Person, ShareMap, SUM_TOLERANCE};

use crate::ledger_service::EntryKind;

/// One row of the history table.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub description: String,
    pub payer: Person,
    pub participants: Vec<Person>,
    pub amount: Decimal,
    pub rule: String,
    pub shares: ShareMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the description.
    pub query: Option<String>,
    pub payer: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    fn matches(&self, entry: &HistoryEntry) -> bool {
        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !entry
                .description
                .to_lowercase()
                .contains(&query.to_lowercase())
            {
                return false;
            }
        }
        if let Some(payer) = self.payer.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            if entry.payer.as_str() != payer {
                return false;
            }
        }
        self.from.map_or(true, |from| entry.date >= from)
            && self.to.map_or(true, |to| entry.date <= to)
    }
}

pub struct HistoryService;

impl HistoryService {
    /// Lists expenses and settlements newest first. Entries sharing a date keep
    /// their insertion order, expenses before settlements.
    pub fn entries(ledger: &Ledger, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        let expenses = ledger.expenses.iter().map(|expense| HistoryEntry {
            id: expense.id,
            kind: EntryKind::Expense,
            date: expense.date,
            description: expense.description.clone(),
            payer: expense.payer.clone(),
            participants: expense.participants.clone(),
            amount: expense.amount,
            rule: split_rule_label(expense),
            shares: expense.shares.clone(),
        });
        let settlements = ledger.settlements.iter().map(|settlement| HistoryEntry {
            id: settlement.id,
            kind: EntryKind::Settlement,
            date: settlement.date,
            description: settlement.display_label(),
            payer: settlement.from.clone(),
            participants: vec![settlement.from.clone(), settlement.to.clone()],
            amount: settlement.amount,
            rule: "settlement".to_string(),
            shares: [(settlement.to.clone(), settlement.amount)].into_iter().collect(),
        });

        let mut rows: Vec<HistoryEntry> = expenses
            .chain(settlements)
            .filter(|entry| filter.matches(entry))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows
    }
}

/// Short description of how an expense was split, e.g. `percent: 50,30,r`.
pub fn split_rule_label(expense: &Expense) -> String {
    if !expense.raw_split.is_empty() {
        return format!("{}: {}", expense.split_policy, expense.raw_split);
    }
    let mut values = expense
        .participants
        .iter()
        .map(|person| expense.share_of(person.as_str()));
    match values.next() {
        Some(first) if values.all(|v| v.saturating_sub(first).abs() < SUM_TOLERANCE) => "equal".to_string(),
        Some(_) => "custom".to_string(),
        None => String::new(),
    }
}
