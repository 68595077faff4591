use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use splitledger_core::{
    calculate_aggregates, simplify, time::FixedClock, ExpenseDraft, ExpenseService,
    LedgerService, SettlementDraft, SettlementService, ShareService,
};
use splitledger_domain::{
    is_settled, BalanceMap, Ledger, Person, SplitPolicy, Transaction, SETTLED_EPSILON,
    SUM_TOLERANCE,
};

const NAMES: [&str; 6] = ["Ana", "Ben", "Cho", "Dev", "Eli", "Fay"];

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// Net balances built from whole cents that sum to exactly zero.
fn balanced_nets(mut values: Vec<i64>) -> BalanceMap {
    let total: i64 = values.iter().sum();
    values.push(-total);
    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| (Person::new(format!("P{idx}")), cents(value)))
        .collect()
}

fn apply(net: &BalanceMap, txns: &[Transaction]) -> BalanceMap {
    let mut after = net.clone();
    for txn in txns {
        if let Some(value) = after.get_mut(txn.from.as_str()) {
            *value += txn.amount;
        }
        if let Some(value) = after.get_mut(txn.to.as_str()) {
            *value -= txn.amount;
        }
    }
    after
}

fn ledger_from(
    people: usize,
    expenses: &[(i64, usize, u8)],
    settlements: &[(i64, usize, usize)],
) -> Ledger {
    let mut ledger =
        LedgerService::create_with_roster("Prop", &NAMES[..people]).expect("roster");
    let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    for (amount, payer, mask) in expenses {
        let participants: Vec<&str> = (0..people)
            .filter(|idx| mask & (1 << idx) != 0)
            .map(|idx| NAMES[idx])
            .collect();
        if *amount == 0 || participants.is_empty() {
            continue;
        }
        let draft = ExpenseDraft::new("Item", cents(*amount), NAMES[payer % people], participants);
        ExpenseService::add(&mut ledger, draft, &clock).expect("valid expense");
    }
    for (amount, from, to) in settlements {
        let (from, to) = (from % people, to % people);
        if from == to || *amount <= 0 {
            continue;
        }
        let draft = SettlementDraft::new(NAMES[from], NAMES[to], cents(*amount));
        SettlementService::add(&mut ledger, draft, &clock).expect("valid settlement");
    }
    ledger
}

/// Split input for `count` participants under the policy picked by `selector`.
///
/// Amounts are multiples of 60 cents and share weights total 60, so every
/// share is a terminating decimal and sums compare exactly.
fn split_for(selector: u8, count: usize, weights: &[i64]) -> (SplitPolicy, String) {
    let leading = &weights[..count - 1];
    let with_remainder = |render: fn(i64) -> String| {
        leading
            .iter()
            .map(|w| render(*w))
            .chain(std::iter::once("r".to_string()))
            .collect::<Vec<_>>()
            .join(",")
    };
    match selector % 4 {
        0 => (SplitPolicy::Equal, String::new()),
        1 => (SplitPolicy::Percent, with_remainder(|w| w.to_string())),
        2 => {
            let last = 60 - leading.iter().sum::<i64>();
            let raw = leading
                .iter()
                .chain(std::iter::once(&last))
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            (SplitPolicy::Shares, raw)
        }
        _ => (SplitPolicy::Exact, with_remainder(|w| cents(w).to_string())),
    }
}

proptest! {
    #[test]
    fn aggregates_conserve_paid_and_owed_totals(
        people in 2usize..=6,
        expenses in prop::collection::vec(
            (
                -800i64..=800,
                0usize..6,
                1u8..64,
                any::<u8>(),
                prop::collection::vec(1i64..=10, 6),
            ),
            0..16,
        ),
    ) {
        let mut ledger =
            LedgerService::create_with_roster("Conserve", &NAMES[..people]).expect("roster");
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        for (units, payer, mask, selector, weights) in &expenses {
            let participants: Vec<&str> = (0..people)
                .filter(|idx| mask & (1 << idx) != 0)
                .map(|idx| NAMES[idx])
                .collect();
            if *units == 0 || participants.is_empty() {
                continue;
            }
            let (policy, raw) = split_for(*selector, participants.len(), weights);
            let draft = ExpenseDraft::new("Item", cents(units * 60), NAMES[payer % people], participants)
                .with_split(policy, raw);
            ExpenseService::add(&mut ledger, draft, &clock).expect("valid expense");
        }

        let result = calculate_aggregates(&ledger.roster, &ledger.expenses, &ledger.settlements);
        let paid: Decimal = result.paid.values().copied().sum();
        let owed: Decimal = result.owed.values().copied().sum();
        let amounts: Decimal = ledger.expenses.iter().map(|e| e.amount).sum();
        let shares: Decimal = ledger
            .expenses
            .iter()
            .flat_map(|e| e.shares.values().copied())
            .sum();
        prop_assert_eq!(paid, amounts);
        prop_assert_eq!(owed, shares);
    }

    #[test]
    fn shares_conserve_the_amount(
        amount in -1_000_000i64..=1_000_000,
        count in 1usize..=6,
        weights in prop::collection::vec(1u32..=50, 6),
    ) {
        prop_assume!(amount != 0);
        let participants: Vec<Person> = NAMES[..count].iter().map(|n| Person::new(*n)).collect();
        let amount = cents(amount);

        let equal = ShareService::build_expense_shares(
            amount, &participants[0], &participants, SplitPolicy::Equal, "",
        ).expect("equal split");
        let total: Decimal = equal.values().copied().sum();
        prop_assert!((total - amount).abs() <= SUM_TOLERANCE);

        let raw = weights[..count].iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        let weighted = ShareService::build_shares(
            amount, &participants, SplitPolicy::Shares, &raw,
        ).expect("weighted split");
        let total: Decimal = weighted.values().copied().sum();
        prop_assert!((total - amount).abs() <= SUM_TOLERANCE);
    }

    #[test]
    fn net_invariant_holds_for_every_person(
        people in 2usize..=6,
        expenses in prop::collection::vec((-50_000i64..=50_000, 0usize..6, 1u8..64), 0..20),
        settlements in prop::collection::vec((1i64..=20_000, 0usize..6, 0usize..6), 0..10),
    ) {
        let ledger = ledger_from(people, &expenses, &settlements);
        let result = calculate_aggregates(&ledger.roster, &ledger.expenses, &ledger.settlements);

        prop_assert_eq!(result.net.len(), people);
        prop_assert!(result.off_roster.is_empty());
        let mut sum = Decimal::ZERO;
        for person in &ledger.roster {
            let expected = result.paid[person] - result.owed[person]
                + result.settled_out[person] - result.settled_in[person];
            prop_assert_eq!(result.net[person], expected);
            sum += result.net[person];
        }
        prop_assert!(sum.abs() <= SUM_TOLERANCE);
    }

    #[test]
    fn transaction_count_is_bounded(values in prop::collection::vec(-100_000i64..=100_000, 0..8)) {
        let net = balanced_nets(values);
        let txns = simplify(&net);
        let creditors = net.values().filter(|v| **v > SETTLED_EPSILON).count();
        let debtors = net.values().filter(|v| **v < -SETTLED_EPSILON).count();
        prop_assert!(txns.len() <= (creditors + debtors).max(1) - 1);
        prop_assert!(txns.iter().all(|t| t.amount > Decimal::ZERO && t.from != t.to));
    }

    #[test]
    fn paying_every_suggestion_leaves_all_square(
        values in prop::collection::vec(-100_000i64..=100_000, 0..8),
    ) {
        let net = balanced_nets(values);
        let after = apply(&net, &simplify(&net));
        prop_assert!(after.values().all(|v| is_settled(*v)));
        prop_assert!(simplify(&after).is_empty());
    }

    #[test]
    fn ledger_round_trip_through_pay_all(
        people in 2usize..=6,
        expenses in prop::collection::vec((1i64..=50_000, 0usize..6, 1u8..64), 1..12),
    ) {
        let mut ledger = ledger_from(people, &expenses, &[]);
        let suggestions = LedgerService::suggestions(&ledger);
        let date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        SettlementService::apply_suggestions(&mut ledger, &suggestions, date).expect("pay all");
        prop_assert!(LedgerService::aggregates(&ledger).is_all_square());
        prop_assert!(LedgerService::suggestions(&ledger).is_empty());
    }

    #[test]
    fn dust_balances_need_no_payments(values in prop::collection::vec(-4i64..=4, 0..8)) {
        let net: BalanceMap = values
            .into_iter()
            .enumerate()
            .map(|(idx, v)| (Person::new(format!("P{idx}")), Decimal::new(v, 3)))
            .collect();
        prop_assert!(simplify(&net).is_empty());
    }
}
