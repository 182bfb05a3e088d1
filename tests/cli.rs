use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const BATCH_HEADER: &str = "date,bank,income,outcome,balance,category,description,original_id\n";

fn ledger_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("statement-ledger").unwrap();
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env_remove("STATEMENT_LEDGER_DATA_DIR")
        .env("RUST_LOG", "off");
    cmd
}

fn init(data_dir: &Path) {
    ledger_cmd(data_dir).arg("init").assert().success();
}

#[test]
fn init_creates_layout() {
    let temp = TempDir::new().unwrap();

    ledger_cmd(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(temp.path().join("config.json").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("lookup/balances.json"))
            .unwrap()
            .trim(),
        "{}"
    );
    for dir in ["00--raw", "01--resolved", "02--categorized", "03--reconciled"] {
        assert!(temp.path().join("data").join(dir).is_dir());
    }
}

#[test]
fn config_shows_paths() {
    let temp = TempDir::new().unwrap();

    ledger_cmd(temp.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("03--reconciled"))
        .stdout(predicate::str::contains("Drift tolerance:    0.01"));
}

#[test]
fn resolve_prefers_complete_extract() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    let raw = temp.path().join("data/00--raw");

    fs::write(
        raw.join("NU_1_01JAN2023_31JAN2023.csv"),
        "Data,Valor,Identificador,Descrição\n\
         05/01/2023,-10.00,full-1,Mercado\n\
         20/01/2023,50.00,full-2,Pix\n",
    )
    .unwrap();
    fs::write(
        raw.join("NU_2_15JAN2023_15FEB2023.csv"),
        "Data,Valor,Identificador,Descrição\n\
         20/01/2023,50.00,part-1,Pix\n\
         02/02/2023,7.00,part-2,Estorno\n",
    )
    .unwrap();
    fs::write(raw.join("notes.txt"), "ignore me").unwrap();

    ledger_cmd(temp.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("nubank\n  2023: 01, 02\n"))
        .stdout(predicate::str::contains("nubank 2023-02"))
        .stdout(predicate::str::contains("notes.txt"));

    let resolved = temp.path().join("data/01--resolved");
    let january = fs::read_to_string(resolved.join("nubank_2023-01.csv")).unwrap();
    assert!(january.contains("full-1"));
    assert!(!january.contains("part-1"));

    let february = fs::read_to_string(resolved.join("nubank_2023-02.csv")).unwrap();
    assert!(february.contains("part-2"));
}

#[test]
fn reconcile_anchors_ledger_to_checkpoint() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    fs::write(
        temp.path().join("lookup/balances.json"),
        r#"{"x": {"initial": 100, "2023-01": 150}}"#,
    )
    .unwrap();
    fs::write(
        temp.path().join("data/02--categorized/x_2023-01.csv"),
        format!("{}2023-01-10,x,50,30,,,,a1\n", BATCH_HEADER),
    )
    .unwrap();

    ledger_cmd(temp.path())
        .arg("reconcile")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 succeeded, 0 failed"));

    let ledger = fs::read_to_string(
        temp.path()
            .join("data/03--reconciled/x_2023-01-10_2023-01-10.csv"),
    )
    .unwrap();
    let lines: Vec<&str> = ledger.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("2023-01-10,x,100.00,0.00,100.00,initial-balance"));
    assert!(lines[2].starts_with("2023-01-10,x,50.00,30.00,120.00"));
    assert!(lines[3].starts_with("2023-01-10,x,30.00,0.00,150.00,reconciler-adjustment"));
}

#[test]
fn reconcile_fails_when_a_bank_fails() {
    let temp = TempDir::new().unwrap();
    let batches = temp.path().join("batches");
    let out = temp.path().join("out");
    fs::create_dir_all(&batches).unwrap();

    fs::write(
        batches.join("good_2023-01.csv"),
        format!("{}2023-01-05,good,10,0,,,,g1\n", BATCH_HEADER),
    )
    .unwrap();
    // Dated outside its month
    fs::write(
        batches.join("bad_2023-01.csv"),
        format!("{}2023-02-05,bad,10,0,,,,b1\n", BATCH_HEADER),
    )
    .unwrap();

    ledger_cmd(temp.path())
        .arg("reconcile")
        .arg("--batches-dir")
        .arg(&batches)
        .arg("--balances")
        .arg(temp.path().join("missing.json"))
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("1 succeeded, 1 failed"));

    assert!(out.join("good_2023-01-05_2023-01-05.csv").exists());
    let written: Vec<_> = fs::read_dir(&out).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[test]
fn reconcile_missing_batches_dir_is_fatal() {
    let temp = TempDir::new().unwrap();

    ledger_cmd(temp.path())
        .arg("reconcile")
        .arg("--batches-dir")
        .arg(temp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
