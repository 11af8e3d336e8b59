use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_rows_are_skipped() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,alice,gold,1.0",
        // Unknown operation
        "g1,teleport,alice",
        // Missing amount
        "g1,grantFunds,alice,gold",
        // Text in amount field
        "g1,grantFunds,alice,gold,lots",
        "g1,grantFunds,alice,gold,2.0",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains("g1,alice,gold,3"));
}

#[test]
fn test_failed_commands_leave_state_untouched() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,alice,gold,10",
        // Overdraft
        "g1,pay,alice,bob,gold,11",
        // Duplicate currency
        "g1,createCurrency,gold,G,1",
        // Unknown currency
        "g1,pay,alice,bob,silver,1",
        "g1,pay,alice,bob,gold,4",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stderr(predicate::str::contains("InsufficientFunds"))
        .stdout(predicate::str::contains("g1,alice,gold,6"))
        .stdout(predicate::str::contains("g1,bob,gold,4"));
}

#[test]
fn test_non_positive_amounts_rejected() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,alice,gold,10",
        "g1,pay,alice,bob,gold,0",
        "g1,pay,alice,bob,gold,-5",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Amount must be positive"))
        .stdout(predicate::str::contains("g1,alice,gold,10"))
        .stdout(predicate::str::contains("g1,bob").not());
}

#[test]
fn test_extreme_decimal_precision() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,alice,gold,0.0001",
        "g1,grantFunds,alice,gold,0.0001",
        "g1,grantFunds,bob,gold,1000000.0000",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("g1,alice,gold,0.0002"))
        .stdout(predicate::str::contains("g1,bob,gold,1000000"));
}
