#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::write_file;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_ledger_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: load invoices and part-pay the oldest
    let invoices = write_file(
        "id, customer, number, date, net_amount\n\
         1, 7, INV-001, 2024-01-05, 100\n\
         2, 7, INV-002, 2024-01-10, 200\n",
    );
    let payments = write_file("customer, amount, date, method\n7, 60, 2024-02-01, cash\n");

    let output = Command::new(cargo_bin!("freightdesk"))
        .arg("allocate")
        .arg(payments.path())
        .arg("--invoices")
        .arg(invoices.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1,7,INV-001,2024-01-05,100,60,PARTIALLY_PAID"));

    // 2. Second run: no invoice file, the ledger comes from the database
    let payments = write_file("customer, amount, date, method\n7, 100, 2024-02-02, upi\n");

    let output = Command::new(cargo_bin!("freightdesk"))
        .arg("allocate")
        .arg(payments.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1,7,INV-001,2024-01-05,100,100,PAID"));
    assert!(stdout.contains("2,7,INV-002,2024-01-10,200,60,PARTIALLY_PAID"));
}

#[test]
fn test_rocksdb_rate_cards_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let requests = write_file(
        "customer, pincode, state, weight, mode\n1, , Delhi, 0.2, premium\n",
    );

    let rates = write_file("customer, sector, premium_upto250g\n1, Delhi, 80\n");
    let output = Command::new(cargo_bin!("freightdesk"))
        .arg("quote")
        .arg(requests.path())
        .arg("--rates")
        .arg(rates.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = Command::new(cargo_bin!("freightdesk"))
        .arg("quote")
        .arg(requests.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1,,Delhi,Delhi,80,0,0,80"));
}
