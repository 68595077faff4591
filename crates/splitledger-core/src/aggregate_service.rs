//! Per-person paid/owed/settled/net totals over a ledger snapshot.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use splitledger_domain::{
    AggregateResult, BalanceMap, Expense, Ledger, Person, PersonBalance, Settlement,
};

pub struct AggregateService;

impl AggregateService {
    /// Aggregates the stored expense shares and settlements for every roster member.
    ///
    /// Shares are read as stored; nothing is recomputed. References to people
    /// outside `roster` are collected in [`AggregateResult::off_roster`].
    /// Totals saturate at the `Decimal` bounds rather than overflowing.
    pub fn calculate(
        roster: &[Person],
        expenses: &[Expense],
        settlements: &[Settlement],
    ) -> AggregateResult {
        let mut rows: IndexMap<Person, PersonBalance> = roster
            .iter()
            .map(|person| (person.clone(), PersonBalance::zero(person.clone())))
            .collect();
        let mut strays: IndexMap<Person, PersonBalance> = IndexMap::new();

        for expense in expenses {
            let payer = row(&mut rows, &mut strays, &expense.payer);
            payer.paid = payer.paid.saturating_add(expense.amount);
            for (person, share) in &expense.shares {
                let participant = row(&mut rows, &mut strays, person);
                participant.owed = participant.owed.saturating_add(*share);
            }
        }

        for settlement in settlements {
            let from = row(&mut rows, &mut strays, &settlement.from);
            from.settled_out = from.settled_out.saturating_add(settlement.amount);
            let to = row(&mut rows, &mut strays, &settlement.to);
            to.settled_in = to.settled_in.saturating_add(settlement.amount);
        }

        for balance in rows.values_mut().chain(strays.values_mut()) {
            balance.net = balance
                .paid
                .saturating_sub(balance.owed)
                .saturating_add(balance.settled_out)
                .saturating_sub(balance.settled_in);
        }

        if !strays.is_empty() {
            tracing::debug!(
                count = strays.len(),
                "aggregated amounts for people outside the roster"
            );
        }

        AggregateResult {
            paid: project(&rows, |b| b.paid),
            owed: project(&rows, |b| b.owed),
            settled_out: project(&rows, |b| b.settled_out),
            settled_in: project(&rows, |b| b.settled_in),
            net: project(&rows, |b| b.net),
            off_roster: strays,
        }
    }

    pub fn for_ledger(ledger: &Ledger) -> AggregateResult {
        Self::calculate(&ledger.roster, &ledger.expenses, &ledger.settlements)
    }
}

/// Free-function form of [`AggregateService::calculate`].
pub fn calculate_aggregates(
    roster: &[Person],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> AggregateResult {
    AggregateService::calculate(roster, expenses, settlements)
}

fn row<'a>(
    rows: &'a mut IndexMap<Person, PersonBalance>,
    strays: &'a mut IndexMap<Person, PersonBalance>,
    person: &Person,
) -> &'a mut PersonBalance {
    match rows.get_mut(person) {
        Some(balance) => balance,
        None => strays
            .entry(person.clone())
            .or_insert_with(|| PersonBalance::zero(person.clone())),
    }
}

fn project(
    rows: &IndexMap<Person, PersonBalance>,
    field: impl Fn(&PersonBalance) -> Decimal,
) -> BalanceMap {
    rows.iter()
        .map(|(person, balance)| (person.clone(), field(balance)))
        .collect()
}
