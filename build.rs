use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let git_hash = command_stdout("git", &["rev-parse", "--short", "HEAD"])
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".into());
    let git_status = match command_stdout("git", &["status", "--porcelain"]) {
        Some(changes) if changes.is_empty() => "clean",
        Some(_) => "dirty",
        None => "unknown",
    };
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".into());
    let rustc_version =
        command_stdout(&rustc, &["--version"]).unwrap_or_else(|| "unknown".into());

    emit("HASH", &git_hash);
    emit("STATUS", git_status);
    emit(
        "TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit(
        "TARGET",
        &env::var("TARGET").unwrap_or_else(|_| "unknown-target".into()),
    );
    emit(
        "PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".into()),
    );
    emit("RUSTC", &rustc_version);
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env=SPLITLEDGER_BUILD_{key}={value}");
}

/// Trimmed stdout of a successful command, `None` when it cannot run or fails.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
