use std::fs;

use rust_decimal_macros::dec;
use splitledger_core::{
    storage::LedgerStorage, time::FixedClock, CoreError, ExpenseDraft, ExpenseService,
    LedgerService,
};
use splitledger_domain::Ledger;
use splitledger_storage_json::{slug, JsonLedgerStorage, StoragePaths};
use tempfile::tempdir;

fn sample_ledger() -> Ledger {
    let mut ledger = LedgerService::create_with_roster("Beach Trip", ["Ana", "Ben"]).expect("roster");
    let clock = FixedClock::on(chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    ExpenseService::add(
        &mut ledger,
        ExpenseDraft::new("Ice cream", dec!(10.01), "Ana", ["Ana", "Ben"]),
        &clock,
    )
    .expect("expense");
    ledger
}

#[test]
fn json_storage_can_save_and_load_ledger() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let ledger = sample_ledger();

    storage.save_ledger("Beach Trip", &ledger).expect("save ledger");
    let loaded = storage.load_ledger("beach trip").expect("load ledger");

    assert_eq!(loaded, ledger);
    assert_eq!(loaded.expenses[0].share_of("Ben"), dec!(5.01));
    let path = storage.ledger_path("Beach Trip");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("beach_trip.json"));
    assert_eq!(storage.list_ledgers().expect("list"), vec!["beach_trip"]);

    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.contains("\"split_policy\": \"equal\""));
}

#[test]
fn missing_ledger_is_reported_by_name() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    assert!(matches!(
        storage.load_ledger("nope"),
        Err(CoreError::LedgerNotFound(name)) if name == "nope"
    ));
}

#[test]
fn overwriting_keeps_a_backup_of_the_previous_file() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::new(StoragePaths::under(dir.path())).expect("create storage");
    let mut ledger = sample_ledger();

    storage.save_ledger("trip", &ledger).expect("first save");
    assert!(storage.list_backups("trip").expect("list").is_empty());

    LedgerService::rename(&mut ledger, "Renamed");
    storage.save_ledger("trip", &ledger).expect("second save");

    let backups = storage.list_backups("trip").expect("list");
    assert_eq!(backups.len(), 1);
    let previous = storage.restore_backup(&backups[0]).expect("restore");
    assert_eq!(previous.name, "Beach Trip");
    assert_eq!(storage.load_ledger("trip").expect("load").name, "Beach Trip");
}

#[test]
fn explicit_backups_carry_a_note_and_are_pruned() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonLedgerStorage::with_retention(StoragePaths::under(dir.path()), 2)
        .expect("create storage");
    let ledger = sample_ledger();

    let mut created = Vec::new();
    for note in ["first", "second", "third"] {
        created.push(
            storage
                .backup_ledger("trip", &ledger, Some(note))
                .expect("backup"),
        );
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    assert!(created[2].id.ends_with("_third.json"));
    assert!(created[2].id.starts_with(&format!("{}_", slug("trip"))));
    let backups = storage.list_backups("trip").expect("list");
    assert_eq!(backups.len(), 2);
    assert_eq!(backups[0].id, created[2].id);
    assert!(!created[0].path.exists());
}

#[test]
fn slug_falls_back_for_symbol_only_names() {
    assert_eq!(slug("  ?!  "), "ledger");
    assert_eq!(slug("Flat 3B"), "flat_3b");
}
