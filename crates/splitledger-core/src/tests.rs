use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    aggregate_service::AggregateService,
    expense_service::{ExpenseDraft, ExpenseService},
    history_service::{split_rule_label, HistoryFilter, HistoryService},
    ledger_service::{EntryKind, LedgerService},
    roster_service::RosterService,
    settlement_service::{SettleService, SettlementDraft, SettlementService},
    storage::ledger_warnings,
    time::FixedClock,
    CoreError, SplitError,
};
use splitledger_domain::{Expense, Ledger, Person, SplitPolicy, MAX_AMOUNT};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on(day(15))
}

fn trio() -> Ledger {
    LedgerService::create_with_roster("Trip", ["A", "B", "C"]).expect("roster")
}

#[test]
fn roster_rejects_blank_and_duplicate_names() {
    let mut ledger = trio();
    assert!(matches!(
        RosterService::add_person(&mut ledger, "   "),
        Err(CoreError::Validation(_))
    ));
    assert!(matches!(
        RosterService::add_person(&mut ledger, " B "),
        Err(CoreError::DuplicatePerson(name)) if name == "B"
    ));
    let added = RosterService::add_person(&mut ledger, " Dana ").expect("add");
    assert_eq!(added.as_str(), "Dana");
    assert_eq!(ledger.roster.len(), 4);
}

#[test]
fn removing_a_person_cascades_to_their_entries() {
    let mut ledger = trio();
    let clock = clock();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Fuel", dec!(30), "A", ["A", "B", "C"]),
        &clock,
    )
    .expect("expense with C");
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Snacks", dec!(10), "A", ["A", "B"]),
        &clock,
    )
    .expect("expense without C");
    SettlementService::add(&mut ledger, SettlementDraft::new("C", "A", dec!(5)), &clock)
        .expect("settlement with C");

    let report = RosterService::remove_person(&mut ledger, "C").expect("remove");
    assert_eq!(report.expenses_removed, 1);
    assert_eq!(report.settlements_removed, 1);
    assert_eq!(ledger.expenses.len(), 1);
    assert!(ledger.settlements.is_empty());
    assert!(ledger_warnings(&ledger).is_empty());

    assert!(matches!(
        RosterService::remove_person(&mut ledger, "C"),
        Err(CoreError::PersonNotFound(_))
    ));
}

#[test]
fn expense_validation_messages() {
    let mut ledger = trio();
    let clock = clock();
    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Nothing", Decimal::ZERO, "A", ["A"]),
        &clock,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation failed: Enter a non-zero amount (positive or negative)."
    );

    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("No payer", dec!(5), " ", ["A"]),
        &clock,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Pick a payer."));

    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Nobody", dec!(5), "A", Vec::<String>::new()),
        &clock,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Pick at least one participant."));

    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Stranger", dec!(5), "A", ["A", "Z"]),
        &clock,
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::PersonNotFound(name) if name == "Z"));
    assert!(ledger.expenses.is_empty());
}

#[test]
fn expense_values_beyond_the_limit_are_rejected() {
    let mut ledger = trio();
    let clock = clock();
    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Yacht", Decimal::MAX, "A", ["A", "B"]),
        &clock,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Amounts are limited to 1000000000000"));

    let accepted = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Island", MAX_AMOUNT, "A", ["A", "B"]),
        &clock,
    );
    assert!(accepted.is_ok());

    for raw in ["79228162514264337593543950335,r", "1e20,r"] {
        let err = ExpenseService::add(
            &mut ledger,
            ExpenseDraft::new("Dinner", dec!(90), "A", ["A", "B"])
                .with_split(SplitPolicy::Percent, raw),
            &clock,
        )
        .unwrap_err();
        assert!(
            matches!(err, CoreError::Split(SplitError::ValueTooLarge)),
            "{raw}: {err}"
        );
    }
    assert_eq!(ledger.expenses.len(), 1);
}

#[test]
fn aggregation_saturates_on_oversized_stored_entries() {
    let mut ledger = trio();
    for _ in 0..2 {
        let shares = [(Person::new("B"), Decimal::MAX)].into_iter().collect();
        ledger.expenses.push(Expense::new(
            day(1),
            "Imported",
            Decimal::MAX,
            Person::new("A"),
            vec![Person::new("B")],
            SplitPolicy::Exact,
            "",
            shares,
        ));
    }

    let totals = AggregateService::for_ledger(&ledger);
    assert_eq!(totals.paid["A"], Decimal::MAX);
    assert_eq!(totals.owed["B"], Decimal::MAX);
    assert_eq!(LedgerService::suggestions(&ledger).len(), 1);

    let warnings = ledger_warnings(&ledger);
    assert!(warnings.iter().any(|w| w.contains("beyond the supported limit")));
}

#[test]
fn expense_defaults_description_and_date() {
    let mut ledger = trio();
    let id = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("  ", dec!(12), "A", ["A", "B", "C"]),
        &clock(),
    )
    .expect("add");
    let stored = ledger.expense(id).expect("stored");
    assert_eq!(stored.description, "Expense");
    assert_eq!(stored.date, day(15));
    assert_eq!(stored.raw_split, "");
    assert_eq!(stored.shares_total(), dec!(12));
}

#[test]
fn split_errors_surface_through_core_error() {
    let mut ledger = trio();
    let err = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Hotel", dec!(100), "A", ["A", "B", "C"])
            .with_split(SplitPolicy::Exact, "40,30,40"),
        &clock(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Split(SplitError::ExactSum { total, amount })
            if total == dec!(110) && amount == dec!(100)
    ));
}

#[test]
fn editing_an_expense_recomputes_shares_and_keeps_identity() {
    let mut ledger = trio();
    let clock = clock();
    let mut draft = ExpenseDraft::new("Dinner", dec!(90), "A", ["A", "B", "C"]).on(day(2));
    draft.notes = Some("booked online".into());
    let id = ExpenseService::add(&mut ledger, draft, &clock).expect("add");

    ExpenseService::update(
        &mut ledger,
        id,
        ExpenseDraft::new("Dinner", dec!(10.01), "A", ["A", "B"]).on(day(3)),
        &clock,
    )
    .expect("update");

    let stored = ledger.expense(id).expect("same id");
    assert_eq!(stored.date, day(3));
    assert_eq!(stored.share_of("A"), dec!(5.00));
    assert_eq!(stored.share_of("B"), dec!(5.01));
    assert_eq!(stored.share_of("C"), Decimal::ZERO);
    assert_eq!(stored.notes.as_deref(), Some("booked online"));
    assert_eq!(ledger.expenses.len(), 1);
}

#[test]
fn settlement_requires_two_people_and_positive_amount() {
    let mut ledger = trio();
    let clock = clock();
    let err = SettlementService::add(&mut ledger, SettlementDraft::new("A", "A", dec!(5)), &clock)
        .unwrap_err();
    assert!(err.to_string().contains("Choose two different people."));
    let err = SettlementService::add(&mut ledger, SettlementDraft::new("A", "B", dec!(0)), &clock)
        .unwrap_err();
    assert!(err.to_string().contains("Enter a valid amount."));
    let err = SettlementService::add(
        &mut ledger,
        SettlementDraft::new("A", "B", Decimal::MAX),
        &clock,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Amounts are limited to"));
    let id = SettlementService::add(&mut ledger, SettlementDraft::new("A", "B", dec!(5)), &clock)
        .expect("add");
    assert_eq!(ledger.settlement(id).map(|s| s.date), Some(day(15)));
    assert!(SettleService::preview(&ledger, "B", "A", Decimal::MAX).is_err());
}

#[test]
fn paying_all_suggestions_squares_the_ledger() {
    let mut ledger = trio();
    let clock = clock();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Cabin", dec!(10), "A", ["A", "B", "C"]),
        &clock,
    )
    .expect("add");

    let suggestions = LedgerService::suggestions(&ledger);
    assert_eq!(suggestions.len(), 2);
    let ids = SettlementService::apply_suggestions(&mut ledger, &suggestions, day(20))
        .expect("pay all");
    assert_eq!(ids.len(), 2);

    assert!(AggregateService::for_ledger(&ledger).is_all_square());
    assert!(LedgerService::suggestions(&ledger).is_empty());
}

#[test]
fn paying_one_suggestion_records_a_settlement() {
    let mut ledger = trio();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Taxi", dec!(20), "A", ["A", "B"]),
        &clock(),
    )
    .expect("add");
    let suggestion = LedgerService::suggestions(&ledger).remove(0);
    SettlementService::apply_suggestion(&mut ledger, &suggestion, day(4)).expect("pay");
    let settlement = &ledger.settlements[0];
    assert_eq!(settlement.from.as_str(), "B");
    assert_eq!(settlement.to.as_str(), "A");
    assert_eq!(settlement.amount, dec!(10));
}

#[test]
fn delete_entry_reports_kind() {
    let mut ledger = trio();
    let clock = clock();
    let expense = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Milk", dec!(3), "B", ["A", "B"]),
        &clock,
    )
    .expect("add");
    let settlement =
        SettlementService::add(&mut ledger, SettlementDraft::new("A", "B", dec!(1)), &clock)
            .expect("settle");

    assert_eq!(
        LedgerService::delete_entry(&mut ledger, settlement).expect("delete"),
        EntryKind::Settlement
    );
    let compact = expense.simple().to_string();
    let found = LedgerService::find_entry(&ledger, &compact[..12]).expect("long prefix");
    assert_eq!(found, expense);
    let hyphenated = expense.to_string();
    assert_eq!(
        LedgerService::find_entry(&ledger, &hyphenated[..13]).expect("hyphenated prefix"),
        expense
    );
    let found = LedgerService::find_entry(&ledger, &compact[..8]).expect("prefix");
    assert_eq!(
        LedgerService::delete_entry(&mut ledger, found).expect("delete"),
        EntryKind::Expense
    );
    assert!(matches!(
        LedgerService::delete_entry(&mut ledger, expense),
        Err(CoreError::EntryNotFound(_))
    ));
}

#[test]
fn settle_preview_flags_payments_in_the_wrong_direction() {
    let mut ledger = trio();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Groceries", dec!(20), "A", ["A", "B"]),
        &clock(),
    )
    .expect("add");

    let good = SettleService::preview(&ledger, "B", "A", dec!(10)).expect("preview");
    assert_eq!(good.from_before, dec!(-10));
    assert_eq!(good.from_after, Decimal::ZERO);
    assert_eq!(good.to_before, dec!(10));
    assert_eq!(good.to_after, Decimal::ZERO);
    assert!(!good.worsens);

    let bad = SettleService::preview(&ledger, "A", "B", dec!(10)).expect("preview");
    assert!(bad.worsens);
    assert_eq!(bad.from_after, dec!(20));

    assert!(SettleService::preview(&ledger, "A", "A", dec!(1)).is_err());
}

#[test]
fn default_pair_picks_extremes_or_first_two() {
    let mut ledger = trio();
    assert_eq!(
        SettleService::default_pair(&ledger),
        Some((Person::new("A"), Person::new("B")))
    );
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Tickets", dec!(30), "B", ["B", "C"]),
        &clock(),
    )
    .expect("add");
    assert_eq!(
        SettleService::default_pair(&ledger),
        Some((Person::new("C"), Person::new("B")))
    );
}

#[test]
fn history_is_newest_first_and_filterable() {
    let mut ledger = trio();
    let clock = clock();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Breakfast", dec!(9), "A", ["A", "B", "C"]).on(day(1)),
        &clock,
    )
    .expect("add");
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Museum", dec!(60), "B", ["A", "B", "C"])
            .with_split(SplitPolicy::Percent, "50,30,r")
            .on(day(5)),
        &clock,
    )
    .expect("add");
    SettlementService::add(
        &mut ledger,
        SettlementDraft::new("C", "B", dec!(12)).on(day(3)),
        &clock,
    )
    .expect("settle");

    let all = HistoryService::entries(&ledger, &HistoryFilter::default());
    let names: Vec<_> = all.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["Museum", "Settle up: C → B", "Breakfast"]);
    assert_eq!(all[0].rule, "percent: 50,30,r");
    assert_eq!(all[1].rule, "settlement");
    assert_eq!(all[2].rule, "equal");

    let filtered = HistoryService::entries(
        &ledger,
        &HistoryFilter {
            query: Some("MUS".into()),
            ..HistoryFilter::default()
        },
    );
    assert_eq!(filtered.len(), 1);

    let by_payer = HistoryService::entries(
        &ledger,
        &HistoryFilter {
            payer: Some("C".into()),
            ..HistoryFilter::default()
        },
    );
    assert_eq!(by_payer.len(), 1);
    assert_eq!(by_payer[0].kind, EntryKind::Settlement);

    let ranged = HistoryService::entries(
        &ledger,
        &HistoryFilter {
            from: Some(day(2)),
            to: Some(day(4)),
            ..HistoryFilter::default()
        },
    );
    assert_eq!(ranged.len(), 1);
}

#[test]
fn split_rule_label_detects_custom_shares() {
    let mut ledger = trio();
    let id = ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Rent", dec!(30), "A", ["A", "B"]),
        &clock(),
    )
    .expect("add");
    let expense = ledger.expense_mut(id).expect("stored");
    expense.shares.insert(Person::new("A"), dec!(20));
    expense.shares.insert(Person::new("B"), dec!(10));
    assert_eq!(split_rule_label(expense), "custom");
}

#[test]
fn warnings_report_dangling_people_and_share_drift() {
    let mut ledger = trio();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Boat", dec!(30), "A", ["A", "B"]),
        &clock(),
    )
    .expect("add");
    ledger.roster.retain(|p| p.as_str() != "B");
    ledger.expenses[0].amount = dec!(40);

    let warnings = ledger_warnings(&ledger);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("unknown participant B"));
    assert!(warnings[1].contains("shares total"));
}

#[test]
fn warnings_report_participants_without_a_share() {
    let mut ledger = trio();
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Lunch", dec!(30), "A", ["A", "B", "C"]),
        &clock(),
    )
    .expect("add");
    let share = ledger.expenses[0].shares.shift_remove("C").expect("share");
    ledger.expenses[0].shares["B"] += share;

    let warnings = ledger_warnings(&ledger);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("no share for participant C"));
}
