//! Recording repayments, turning suggestions into settlements, and previewing
//! the effect of a settlement before it is saved.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use splitledger_domain::{within_limit, Ledger, Person, Settlement, Transaction, MAX_AMOUNT};

use crate::{aggregate_service::AggregateService, time::Clock, CoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct SettlementDraft {
    pub date: Option<NaiveDate>,
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

impl SettlementDraft {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: None,
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

pub struct SettlementService;

impl SettlementService {
    pub fn add(
        ledger: &mut Ledger,
        draft: SettlementDraft,
        clock: &dyn Clock,
    ) -> Result<Uuid, CoreError> {
        let settlement = Self::build(ledger, draft, clock)?;
        let id = settlement.id;
        tracing::info!(
            %id,
            from = %settlement.from,
            to = %settlement.to,
            amount = %settlement.amount,
            "recorded settlement"
        );
        ledger.settlements.push(settlement);
        ledger.touch();
        Ok(id)
    }

    /// Replaces the endpoints, amount and date of an existing settlement.
    pub fn update(
        ledger: &mut Ledger,
        id: Uuid,
        draft: SettlementDraft,
        clock: &dyn Clock,
    ) -> Result<(), CoreError> {
        if ledger.settlement(id).is_none() {
            return Err(CoreError::EntryNotFound(id));
        }
        let mut replacement = Self::build(ledger, draft, clock)?;
        replacement.id = id;
        let existing = ledger
            .settlement_mut(id)
            .ok_or(CoreError::EntryNotFound(id))?;
        *existing = replacement;
        ledger.touch();
        tracing::info!(%id, "updated settlement");
        Ok(())
    }

    /// Records a single suggested payment as a settlement ("Pay").
    pub fn apply_suggestion(
        ledger: &mut Ledger,
        suggestion: &Transaction,
        date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        let draft = SettlementDraft::new(
            suggestion.from.as_str(),
            suggestion.to.as_str(),
            suggestion.amount,
        );
        let settlement = Self::build_dated(ledger, draft, date)?;
        let id = settlement.id;
        ledger.settlements.push(settlement);
        ledger.touch();
        tracing::info!(%id, "applied suggested payment");
        Ok(id)
    }

    /// Records every suggestion ("Pay all"). Either all are recorded or none.
    pub fn apply_suggestions(
        ledger: &mut Ledger,
        suggestions: &[Transaction],
        date: NaiveDate,
    ) -> Result<Vec<Uuid>, CoreError> {
        let snapshot: &Ledger = ledger;
        let settlements = suggestions
            .iter()
            .map(|txn| {
                let draft =
                    SettlementDraft::new(txn.from.as_str(), txn.to.as_str(), txn.amount);
                Self::build_dated(snapshot, draft, date)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ids = settlements.iter().map(|s| s.id).collect();
        ledger.settlements.extend(settlements);
        if !suggestions.is_empty() {
            ledger.touch();
        }
        tracing::info!(count = suggestions.len(), "applied suggested payments");
        Ok(ids)
    }

    fn build(
        ledger: &Ledger,
        draft: SettlementDraft,
        clock: &dyn Clock,
    ) -> Result<Settlement, CoreError> {
        let date = draft.date.unwrap_or_else(|| clock.today());
        Self::build_dated(ledger, draft, date)
    }

    fn build_dated(
        ledger: &Ledger,
        draft: SettlementDraft,
        date: NaiveDate,
    ) -> Result<Settlement, CoreError> {
        let (from, to) = distinct_pair(ledger, &draft.from, &draft.to)?;
        check_amount(draft.amount)?;
        Ok(Settlement::new(date, from, to, draft.amount))
    }
}

fn check_amount(amount: Decimal) -> Result<(), CoreError> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::validation("Enter a valid amount."));
    }
    check_limit(amount)
}

fn check_limit(amount: Decimal) -> Result<(), CoreError> {
    if within_limit(amount) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Amounts are limited to {MAX_AMOUNT}."
        )))
    }
}

fn distinct_pair(ledger: &Ledger, from: &str, to: &str) -> Result<(Person, Person), CoreError> {
    let from = Person::parse(from);
    let to = Person::parse(to);
    let (Some(from), Some(to)) = (from, to) else {
        return Err(CoreError::validation("Choose two different people."));
    };
    if from == to {
        return Err(CoreError::validation("Choose two different people."));
    }
    for person in [&from, &to] {
        if !ledger.has_person(person.as_str()) {
            return Err(CoreError::PersonNotFound(person.to_string()));
        }
    }
    Ok((from, to))
}

/// Net balances of both parties before and after a prospective settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlePreview {
    pub from: Person,
    pub to: Person,
    pub amount: Decimal,
    pub from_before: Decimal,
    pub from_after: Decimal,
    pub to_before: Decimal,
    pub to_after: Decimal,
    /// The payment moves money in the direction that increases imbalance.
    pub worsens: bool,
}

pub struct SettleService;

impl SettleService {
    pub fn preview(
        ledger: &Ledger,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<SettlePreview, CoreError> {
        let (from, to) = distinct_pair(ledger, from, to)?;
        check_limit(amount)?;
        let aggregates = AggregateService::for_ledger(ledger);
        let from_before = aggregates.net_of(from.as_str());
        let to_before = aggregates.net_of(to.as_str());
        let positive = amount > Decimal::ZERO;
        Ok(SettlePreview {
            worsens: positive && (from_before > Decimal::ZERO || to_before < Decimal::ZERO),
            from_after: from_before.saturating_add(amount),
            to_after: to_before.saturating_sub(amount),
            from_before,
            to_before,
            amount,
            from,
            to,
        })
    }

    /// Suggests who should pay whom: the most negative net pays the most
    /// positive, ties broken by roster order. Falls back to the first two
    /// roster members when there is no imbalance to resolve.
    pub fn default_pair(ledger: &Ledger) -> Option<(Person, Person)> {
        let aggregates = AggregateService::for_ledger(ledger);
        let debtor = aggregates
            .net
            .iter()
            .reduce(|best, item| if item.1 < best.1 { item } else { best });
        let creditor = aggregates
            .net
            .iter()
            .reduce(|best, item| if item.1 > best.1 { item } else { best });

        match (debtor, creditor) {
            (Some((debtor, low)), Some((creditor, high))) if low < high => {
                Some((debtor.clone(), creditor.clone()))
            }
            _ => match ledger.roster.as_slice() {
                [first, second, ..] => Some((first.clone(), second.clone())),
                _ => None,
            },
        }
    }
}
