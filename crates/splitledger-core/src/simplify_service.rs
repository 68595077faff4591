//! Greedy debt simplification: pairs the largest debtors with the largest
//! creditors until every balance is inside the settled band.

use rust_decimal::Decimal;

use splitledger_domain::{BalanceMap, Person, Transaction, SETTLED_EPSILON};

pub struct SimplifyService;

impl SimplifyService {
    /// Produces payments that bring every net balance back to zero.
    ///
    /// Output holds at most `creditors + debtors - 1` transactions, each with
    /// a positive amount, in generation order. An all-square input yields an
    /// empty list.
    pub fn simplify(net: &BalanceMap) -> Vec<Transaction> {
        let mut creditors: Vec<(&Person, Decimal)> = net
            .iter()
            .filter(|(_, value)| **value > SETTLED_EPSILON)
            .map(|(person, value)| (person, *value))
            .collect();
        let mut debtors: Vec<(&Person, Decimal)> = net
            .iter()
            .filter(|(_, value)| **value < -SETTLED_EPSILON)
            .map(|(person, value)| (person, -*value))
            .collect();

        // Stable sort keeps input order among equal amounts.
        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        debtors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transactions = Vec::new();
        let (mut d, mut c) = (0, 0);
        while d < debtors.len() && c < creditors.len() {
            let pay = debtors[d].1.min(creditors[c].1);
            transactions.push(Transaction::new(
                debtors[d].0.clone(),
                creditors[c].0.clone(),
                pay,
            ));
            debtors[d].1 -= pay;
            creditors[c].1 -= pay;

            if debtors[d].1 < SETTLED_EPSILON {
                d += 1;
            }
            if creditors[c].1 < SETTLED_EPSILON {
                c += 1;
            }
        }

        tracing::debug!(
            creditors = creditors.len(),
            debtors = debtors.len(),
            transactions = transactions.len(),
            "simplified balances"
        );
        transactions
    }
}

/// Free-function form of [`SimplifyService::simplify`].
pub fn simplify(net: &BalanceMap) -> Vec<Transaction> {
    SimplifyService::simplify(net)
}
