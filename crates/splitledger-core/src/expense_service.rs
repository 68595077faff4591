//! Validates expense input, freezes shares, and stores the record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use splitledger_domain::{within_limit, Expense, Ledger, Person, SplitPolicy, MAX_AMOUNT};

use crate::{share_service::ShareService, time::Clock, CoreError, SplitError};

const DEFAULT_DESCRIPTION: &str = "Expense";

/// User input for creating or replacing an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    /// `None` means "today" according to the service clock.
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Decimal,
    pub payer: String,
    pub participants: Vec<String>,
    pub split_policy: SplitPolicy,
    pub raw_split: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

impl ExpenseDraft {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        payer: impl Into<String>,
        participants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            date: None,
            description: description.into(),
            amount,
            payer: payer.into(),
            participants: participants.into_iter().map(Into::into).collect(),
            split_policy: SplitPolicy::Equal,
            raw_split: String::new(),
            notes: None,
            created_by: None,
        }
    }

    pub fn with_split(mut self, policy: SplitPolicy, raw: impl Into<String>) -> Self {
        self.split_policy = policy;
        self.raw_split = raw.into();
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

pub struct ExpenseService;

impl ExpenseService {
    /// Records a new expense and returns its id.
    pub fn add(
        ledger: &mut Ledger,
        draft: ExpenseDraft,
        clock: &dyn Clock,
    ) -> Result<Uuid, CoreError> {
        let expense = Self::build(ledger, draft, clock)?;
        let id = expense.id;
        tracing::info!(
            %id,
            amount = %expense.amount,
            payer = %expense.payer,
            policy = %expense.split_policy,
            "added expense"
        );
        ledger.expenses.push(expense);
        ledger.touch();
        Ok(id)
    }

    /// Replaces an existing expense wholesale, recomputing its shares.
    ///
    /// The id is kept, as are `notes` and `created_by` unless the draft
    /// supplies new values.
    pub fn update(
        ledger: &mut Ledger,
        id: Uuid,
        draft: ExpenseDraft,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        if ledger.expense(id).is_none() {
            return Err(CoreError::EntryNotFound(id));
        }
        let mut replacement = Self::build(ledger, draft, clock)?;
        let existing = ledger
            .expense_mut(id)
            .ok_or(CoreError::EntryNotFound(id))?;
        replacement.id = id;
        if replacement.notes.is_none() {
            replacement.notes = existing.notes.take();
        }
        if replacement.created_by.is_none() {
            replacement.created_by = existing.created_by.take();
        }
        *existing = replacement;
        ledger.touch();
        tracing::info!(%id, "updated expense");
        Ok(())
    }

    fn build(ledger: &Ledger, draft: ExpenseDraft, clock: &dyn Clock) -> Result<Expense, CoreError> {
        if draft.amount.is_zero() {
            return Err(reject("Enter a non-zero amount (positive or negative)."));
        }
        if !within_limit(draft.amount) {
            return Err(reject(&format!("Amounts are limited to {MAX_AMOUNT} either way.")));
        }
        let payer = Person::parse(&draft.payer).ok_or_else(|| reject("Pick a payer."))?;
        let participants: Vec<Person> = draft
            .participants
            .iter()
            .filter_map(|name| Person::parse(name))
            .collect();
        if participants.is_empty() {
            return Err(reject("Pick at least one participant."));
        }
        for person in std::iter::once(&payer).chain(participants.iter()) {
            if !ledger.has_person(person.as_str()) {
                return Err(CoreError::PersonNotFound(person.to_string()));
            }
        }

        let raw_split = if draft.split_policy.takes_values() {
            draft.raw_split.trim().to_string()
        } else {
            String::new()
        };
        let shares = ShareService::build_expense_shares(
            draft.amount,
            &payer,
            &participants,
            draft.split_policy,
            &raw_split,
        )
        .inspect_err(|err| tracing::debug!(error = %err, "rejected split input"))?;
        if !shares.values().all(|share| within_limit(*share)) {
            tracing::debug!("rejected split with an out-of-range share");
            return Err(SplitError::ValueTooLarge.into());
        }

        let description = match draft.description.trim() {
            "" => DEFAULT_DESCRIPTION.to_string(),
            text => text.to_string(),
        };
        let mut expense = Expense::new(
            draft.date.unwrap_or_else(|| clock.today()),
            description,
            draft.amount,
            payer,
            participants,
            draft.split_policy,
            raw_split,
            shares,
        );
        expense.notes = draft.notes.filter(|n| !n.trim().is_empty());
        expense.created_by = draft.created_by;
        Ok(expense)
    }
}

fn reject(message: &str) -> CoreError {
    tracing::debug!(reason = message, "rejected expense input");
    CoreError::validation(message)
}
