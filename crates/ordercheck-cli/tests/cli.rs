use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIRMATION: &str = "\
Orderbekräftelse AB-17
Pos Art Benämning Order Mått Antal
1 GL-44 Isolerglas 1234567 1200x800 10
2 GL-45 Isolerglas 7654321 600x800 2
";

const INVOICE: &str = "\
Fakturanr: 881
Order: 1234567
Isolerglas 1200x800 5 pcs
Order: 7654321
Isolerglas 600x800 2 pcs
";

const ORDER: &str = "\
Kund: Fönster AB
Row 1
Fönster 1200x800
Färg: vit
Row 2
Fönster 600x800
Färg: vit
Row 3
Dörr 900x2100
Färg: röd
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = serde_json::json!({
            "storage": {
                "history_dir": dir.path().join("history"),
                "review_dir": dir.path().join("reviews"),
            }
        });
        fs::write(dir.path().join("config.json"), config.to_string()).unwrap();
        Self { dir }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ordercheck").unwrap();
        cmd.arg("--config").arg(self.path("config.json"));
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn compare_prints_text_table() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order comparison: confirmation vs invoice"))
        .stdout(predicate::str::contains("Invoice: 881  Confirmation: confirmation"))
        .stdout(predicate::str::is_match(r"1234567\s+10\s+5\s+NO").unwrap())
        .stdout(predicate::str::is_match(r"7654321\s+2\s+2\s+YES").unwrap())
        .stdout(predicate::str::contains("2 orders, 1 mismatches"));
}

#[test]
fn compare_csv_strict_fails_on_mismatch() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv), "--format", "csv", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Order number,Confirmed qty,Invoiced qty,Match"))
        .stdout(predicate::str::contains("1234567,10,5,NO"))
        .stderr(predicate::str::contains("1 of 2 orders do not match"));
}

#[test]
fn compare_writes_json_output() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);
    let out = ws.path("report.json");

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv), "-f", "json", "-o", arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["invoice_id"], "881");
    assert_eq!(report["mismatches"], 1);
    assert_eq!(report["rows"][1]["invoiced_qty"], 2);
}

#[test]
fn compare_forced_reverse_strategy_changes_result() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args([
            "compare",
            arg(&conf),
            arg(&inv),
            "--format",
            "csv",
            "--invoice-strategy",
            "reverse-anchor",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234567,10,0,NO"))
        .stdout(predicate::str::contains("7654321,2,5,NO"));
}

#[test]
fn compare_save_lands_in_history() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv), "--format", "csv", "--save"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved report to"));

    let names: Vec<String> = fs::read_dir(ws.path("history"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("881-confirmation-"));
    assert!(names[0].ends_with(".csv"));

    ws.cmd()
        .args(["history", "list", "--filter", "881-*"])
        .assert()
        .success()
        .stdout(predicate::str::contains(names[0].as_str()));

    ws.cmd()
        .args(["history", "show", names[0].as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234567,10,5,NO"));
}

#[test]
fn compare_saves_pdf_report() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv), "--format", "pdf", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Saved report to"));

    let entries: Vec<PathBuf> = fs::read_dir(ws.path("history"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("881-confirmation-"));
    assert!(name.ends_with(".pdf"));
    assert!(fs::read(&entries[0]).unwrap().starts_with(b"%PDF-"));

    ws.cmd()
        .args(["history", "show", name.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234567"))
        .stdout(predicate::str::contains("2 orders, 1 mismatches"));
}

#[test]
fn compare_pdf_requires_destination() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.txt", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv), "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("use --output or --save"));
}

#[test]
fn compare_missing_input_fails() {
    let ws = Workspace::new();
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&ws.path("missing.txt")), arg(&inv)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn compare_rejects_unsupported_format() {
    let ws = Workspace::new();
    let conf = ws.file("confirmation.docx", CONFIRMATION);
    let inv = ws.file("invoice.txt", INVOICE);

    ws.cmd()
        .args(["compare", arg(&conf), arg(&inv)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format: docx"));
}

#[test]
fn inspect_lists_anomalies() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    ws.cmd()
        .args(["inspect", arg(&order)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Row 3: Färg: röd (expected: Färg: vit)"))
        .stdout(predicate::str::contains("Dörr 900x2100"));
}

#[test]
fn inspect_json_output() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    let output = ws
        .cmd()
        .args(["inspect", arg(&order), "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let anomalies: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(anomalies.as_array().unwrap().len(), 1);
    assert_eq!(anomalies[0]["block_header"], "Row 3");
}

#[test]
fn review_saves_verdicts() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    ws.cmd()
        .args(["review", arg(&order), "--verdict", "not-ok"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Row 3 – Färg: röd – expected: Färg: vit – status: not OK",
        ))
        .stdout(predicate::str::contains("Saved 1 reviews"));

    let list = ws.cmd().args(["reviews", "list"]).output().unwrap();
    assert!(list.status.success());
    let stdout = String::from_utf8(list.stdout).unwrap();
    let name = stdout.lines().next().unwrap().trim().to_string();
    assert!(name.starts_with("order-"));

    ws.cmd()
        .args(["reviews", "show", name.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: not OK"));
}

#[test]
fn review_rejects_wrong_verdict_count() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    ws.cmd()
        .args(["review", arg(&order), "--verdict", "ok", "--verdict", "ok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Got 2 verdicts for 1 anomalies"));
}

#[test]
fn review_reads_piped_verdicts() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    ws.cmd()
        .args(["review", arg(&order)])
        .write_stdin("maybe\nnot ok\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please answer 'ok' or 'not ok'"))
        .stdout(predicate::str::contains("status: not OK"));
}

#[test]
fn review_fails_when_input_ends() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    ws.cmd()
        .args(["review", arg(&order)])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No verdict given for Row 3"));
    assert!(!ws.path("reviews").exists());
}

#[test]
fn review_without_anomalies_saves_nothing() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", "Row 1\nvit\nRow 2\nvit\n");

    ws.cmd()
        .args(["review", arg(&order), "--all", "ok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No anomalies found"));
    assert!(!ws.path("reviews").exists());
}

#[test]
fn config_set_and_get() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "confirmation.max_quantity", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set confirmation.max_quantity = 100"));

    ws.cmd()
        .args(["config", "get", "confirmation.max_quantity"])
        .assert()
        .success()
        .stdout(predicate::str::diff("100\n"));

    ws.cmd()
        .args(["config", "set", "invoice.strategy", "forward-block"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "get", "invoice.strategy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"forward-block\""));
}

#[test]
fn config_set_rejects_unknown_key() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "set", "confirmation.colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_init_refuses_overwrite() {
    let ws = Workspace::new();
    let path = ws.path("fresh.json");

    let mut cmd = Command::cargo_bin("ordercheck").unwrap();
    cmd.args(["config", "init", "--output", arg(&path)])
        .assert()
        .success();
    assert!(path.exists());

    let mut cmd = Command::cargo_bin("ordercheck").unwrap();
    cmd.args(["config", "init", "--output", arg(&path)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn missing_explicit_config_fails() {
    let ws = Workspace::new();
    let order = ws.file("order.txt", ORDER);

    Command::cargo_bin("ordercheck")
        .unwrap()
        .args(["--config", arg(&ws.path("nope.json")), "inspect", arg(&order)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
