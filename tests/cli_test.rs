use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg("tests/fixtures/economy.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tenant,user,currency,balance"))
        // alice paid bob 30 and sold him a plank for 15
        .stdout(predicate::str::contains("guild1,alice,gold,85"))
        .stdout(predicate::str::contains("guild1,bob,gold,35"))
        // tenants keep separate ledgers
        .stdout(predicate::str::contains("guild2,carol,silver,5"))
        .stdout(predicate::str::contains("guild2,alice").not());

    Ok(())
}

#[test]
fn test_cli_without_script_prints_empty_table() {
    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.assert()
        .success()
        .stdout(predicate::eq("tenant,user,currency,balance\n"));
}

#[test]
fn test_many_commands_stream() {
    let script = common::generate_grants("g", 2000).unwrap();
    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("g,alice,gold,2000"));
}

#[test]
fn test_missing_script_fails() {
    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg("tests/fixtures/does_not_exist.csv");
    cmd.assert().failure();
}
