use std::path::Path;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::tempdir;

const BIN_NAME: &str = "splitledger_cli";

fn script_command(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("SPLITLEDGER_CLI_SCRIPT", "1")
        .env("SPLITLEDGER_HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_squares_up_a_shared_dinner() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin(
            "ledger new Trip Ana Ben Cho\n\
             expense add 90 Ana --desc Dinner\n\
             balances\n\
             suggest\n\
             pay all --date 2024-03-02\n\
             suggest\n\
             exit\n",
        )
        .assert()
        .success()
        .stdout(contains("Created ledger `Trip` with 3 people."))
        .stdout(contains("1. Ben → Ana: $30.00"))
        .stdout(contains("2. Cho → Ana: $30.00"))
        .stdout(contains("No payments needed — all square."));

    assert!(home.path().join("ledgers").join("trip.json").is_file());
}

#[test]
fn ledgers_persist_between_sessions() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin(
            "ledger new \"Flat 3B\" Ana Ben\n\
             expense add 100 Ana Ana Ben --desc Groceries --split percent --values 60,r\n",
        )
        .assert()
        .success();

    script_command(home.path())
        .write_stdin(
            "ledger open \"Flat 3B\"\nhistory groceries\nsuggest\npay 1 --date 2024-03-03\n",
        )
        .assert()
        .success()
        .stdout(contains("Opened `Flat 3B`: 2 people, 1 expenses, 0 settlements."))
        .stdout(contains("percent: 60,r"))
        .stdout(contains("Ben → Ana: $40.00"))
        .stdout(contains("Recorded Ben → Ana: $40.00"))
        .stdout(contains("No payments needed — all square."));
}

#[test]
fn invalid_input_is_reported_and_the_script_continues() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin(
            "balances\n\
             ledger new Trip Ana Ben\n\
             expense add 0 Ana\n\
             expense add 30 Ana Ana,Zed\n\
             expense add 30 Ana --split thirds\n\
             settle add Ana Ana 10\n\
             person list\n",
        )
        .assert()
        .success()
        .stdout(contains("No ledger is open."))
        .stdout(contains("Enter a non-zero amount (positive or negative)."))
        .stdout(contains("Person not found: Zed"))
        .stdout(contains("Unknown split type `thirds`."))
        .stdout(contains("Choose two different people."))
        .stdout(contains("Ana").and(contains("Ben")));
}

#[test]
fn oversized_amounts_are_rejected_without_crashing() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin(
            "ledger new T Ana Ben\n\
             expense add 90 Ana Ana Ben --split percent --values 79228162514264337593543950335,r\n\
             expense add 79228162514264337593543950335 Ana\n\
             settle add Ben Ana 79228162514264337593543950335\n\
             balances\n\
             exit\n",
        )
        .assert()
        .success()
        .stdout(contains("Values are too large to split."))
        .stdout(contains("Amounts are limited to 1000000000000 either way."))
        .stdout(contains("Amounts are limited to 1000000000000."))
        .stdout(contains("Everyone is square."));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin("balance\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `balance`"))
        .stdout(contains("Did you mean `balances`?"));
}

#[test]
fn help_and_version_print_overviews() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin("help\nhelp expense\nversion\n")
        .assert()
        .success()
        .stdout(contains("Available commands"))
        .stdout(contains("Help: expense"))
        .stdout(contains("SplitLedger"));
}

#[test]
fn config_changes_are_saved() {
    let home = tempdir().expect("tempdir");
    script_command(home.path())
        .write_stdin("config set currency eur\nconfig backup before trip\nconfig show\n")
        .assert()
        .success()
        .stdout(contains("currency = EUR"))
        .stdout(contains("_before-trip.json"));

    let saved = std::fs::read_to_string(home.path().join("config").join("config.json"))
        .expect("config saved");
    assert!(saved.contains("\"currency\": \"EUR\""));
}
