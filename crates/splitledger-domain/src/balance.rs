//! Aggregated per-person balances and suggested settlement payments.

use std::fmt;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// Person-keyed decimal totals, in roster order.
pub type BalanceMap = IndexMap<Person, Decimal>;

/// One person's row of the aggregate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBalance {
    pub person: Person,
    pub paid: Decimal,
    pub owed: Decimal,
    pub settled_out: Decimal,
    pub settled_in: Decimal,
    pub net: Decimal,
}

impl PersonBalance {
    pub fn zero(person: Person) -> Self {
        Self {
            person,
            paid: Decimal::ZERO,
            owed: Decimal::ZERO,
            settled_out: Decimal::ZERO,
            settled_in: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }

    /// Positive net: others owe this person.
    pub fn is_creditor(&self) -> bool {
        self.net > SETTLED_EPSILON
    }

    /// Negative net: this person owes others.
    pub fn is_debtor(&self) -> bool {
        self.net < -SETTLED_EPSILON
    }
}

/// Output of the aggregator.
///
/// Every map holds exactly one entry per roster member. Amounts attributed to
/// people outside the roster are kept apart in `off_roster`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub paid: BalanceMap,
    pub owed: BalanceMap,
    pub settled_out: BalanceMap,
    pub settled_in: BalanceMap,
    pub net: BalanceMap,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub off_roster: IndexMap<Person, PersonBalance>,
}

impl AggregateResult {
    pub fn net_of(&self, person: &str) -> Decimal {
        self.net.get(person).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns one row per roster member, in roster order.
    pub fn balances(&self) -> Vec<PersonBalance> {
        self.net
            .iter()
            .map(|(person, net)| PersonBalance {
                person: person.clone(),
                paid: lookup(&self.paid, person),
                owed: lookup(&self.owed, person),
                settled_out: lookup(&self.settled_out, person),
                settled_in: lookup(&self.settled_in, person),
                net: *net,
            })
            .collect()
    }

    /// `true` when every roster member's net lies inside the settled band.
    pub fn is_all_square(&self) -> bool {
        self.net.values().all(|value| is_settled(*value))
    }
}

fn lookup(map: &BalanceMap, person: &Person) -> Decimal {
    map.get(person).copied().unwrap_or(Decimal::ZERO)
}

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Person,
    pub to: Person,
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(from: Person, to: Person, amount: Decimal) -> Self {
        Self { from, to, amount }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {:.2}", self.from, self.to, self.amount.round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> AggregateResult {
        let mut result = AggregateResult::default();
        for (name, paid, owed) in [("A", dec!(20), dec!(10)), ("B", dec!(0), dec!(10))] {
            let person = Person::new(name);
            result.paid.insert(person.clone(), paid);
            result.owed.insert(person.clone(), owed);
            result.settled_out.insert(person.clone(), Decimal::ZERO);
            result.settled_in.insert(person.clone(), Decimal::ZERO);
            result.net.insert(person, paid - owed);
        }
        result
    }

    #[test]
    fn balances_follow_net_order() {
        let rows = sample().balances();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].person.as_str(), "A");
        assert!(rows[0].is_creditor());
        assert!(rows[1].is_debtor());
        assert_eq!(rows[1].net, dec!(-10));
    }

    #[test]
    fn all_square_uses_settled_band() {
        let mut result = sample();
        assert!(!result.is_all_square());
        for value in result.net.values_mut() {
            *value = dec!(0.004);
        }
        assert!(result.is_all_square());
    }

    #[test]
    fn transaction_display_rounds_to_cents() {
        let txn = Transaction::new(Person::new("B"), Person::new("A"), dec!(3.333333));
        assert_eq!(txn.to_string(), "B → A: 3.33");
    }
}
