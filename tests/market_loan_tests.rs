use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_market_fee_is_withheld_from_seller() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,buyer,gold,100",
        "g1,createItem,sword,damage=5,rarity=rare",
        "g1,giveItem,seller,sword,2",
        "g1,setConfig,market_fee,0.1",
        "g1,createMarket,bazaar",
        "g1,listItem,bazaar,seller,sword,2,50,gold",
        "g1,buyListing,bazaar,buyer,0",
        // Already sold
        "g1,buyListing,bazaar,buyer,0",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("listing not found: 0"))
        .stdout(predicate::str::contains("g1,buyer,gold,50"))
        .stdout(predicate::str::contains("g1,seller,gold,45"));
}

#[test]
fn test_only_seller_may_cancel() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,grantFunds,mallory,gold,1",
        "g1,createMarket,bazaar",
        "g1,createResource,ore,1,10",
        "g1,gather,ore,alice,5",
        "g1,listItem,bazaar,alice,ore,5,20,gold",
        "g1,cancelListing,bazaar,mallory,0",
        "g1,cancelListing,bazaar,alice,0",
        "g1,cancelListing,bazaar,alice,0",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("belongs to another seller"))
        .stderr(predicate::str::contains("listing not found: 0"));
}

#[test]
fn test_loan_disbursal_and_repayment() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,requestLoan,alice,100,gold",
        // Second request while one is open
        "g1,requestLoan,alice,50,gold",
        // Repaying before approval
        "g1,repayLoan,alice,10",
        "g1,approveLoan,alice,5,7",
        "g1,approveLoan,alice,5,7",
        "g1,repayLoan,alice,40",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("loan already exists: alice"))
        .stderr(predicate::str::contains("Invalid state"))
        .stdout(predicate::str::contains("g1,alice,gold,60"));
}

#[test]
fn test_craft_is_all_or_nothing() {
    let script = common::write_script(&[
        "g1,createCurrency,gold,G,1",
        "g1,createResource,wood,10,100",
        "g1,createResource,iron,10,100",
        "g1,gather,wood,alice,3",
        "g1,createRecipe,axe,wood,2,iron,1",
        "g1,craft,axe,alice",
        "g1,gather,iron,alice,1",
        "g1,craft,axe,alice",
        "g1,createMarket,bazaar",
        // One axe and one wood left
        "g1,listItem,bazaar,alice,axe,1,10,gold",
        "g1,listItem,bazaar,alice,wood,2,10,gold",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("guild-economy"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Insufficient funds: required 1, available 0").count(1))
        .stderr(predicate::str::contains("Insufficient funds: required 2, available 1").count(1));
}
