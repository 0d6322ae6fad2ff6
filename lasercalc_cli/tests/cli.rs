//! End-to-end tests for the `lasercalc` binary.
//!
//! Each test works in its own temporary directory and runs the binary as a
//! subprocess via `assert_cmd`.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lasercalc() -> Command {
    Command::cargo_bin("lasercalc").unwrap()
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// calc
// ---------------------------------------------------------------------------

#[test]
fn calc_reads_stdin_and_fills_defaults() {
    let json = stdout_json(
        lasercalc()
            .args(["calc", "-"])
            .write_stdin(r#"{ "type": "quotation", "base_cost": 1000.0, "target_margin_percent": 25.0 }"#),
    );
    assert_eq!(json["type"], "quotation");
    assert!(json["final_recommended_price"].as_f64().unwrap() > 1000.0);
}

#[test]
fn calc_report_prints_text() {
    lasercalc()
        .args(["calc", "-", "--report"])
        .write_stdin(r#"{ "type": "setup", "batch_quantity": 25 }"#)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("LaserCalc Pro | Setup Time"))
        .stdout(predicate::str::contains("Report ID: LCP-"));
}

#[test]
fn calc_error_is_json_on_stderr() {
    lasercalc()
        .args(["calc", "-"])
        .write_stdin(r#"{ "type": "quotation", "target_margin_percent": 100.0 }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"DivisionByZero\""));
}

#[test]
fn calc_marking_unsupported_method_fails() {
    lasercalc()
        .args(["calc", "-"])
        .write_stdin(r#"{ "type": "marking", "material": "wood", "method": "foaming" }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnsupportedCombination"));
}

#[test]
fn calc_price_per_meter() {
    let json = stdout_json(
        lasercalc()
            .args(["calc", "-"])
            .write_stdin(r#"{ "type": "price_per_meter", "material": "stainless_steel", "thickness_mm": 2.0 }"#),
    );
    assert_eq!(json["type"], "price_per_meter");
    assert!(json["cost_per_meter"].as_f64().unwrap() > 0.0);
}

#[test]
fn calc_unknown_type_fails() {
    lasercalc()
        .args(["calc", "-"])
        .write_stdin(r#"{ "type": "beam" }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));
}

#[test]
fn calc_uses_settings_file() {
    let tmp = TempDir::new().unwrap();
    let settings = tmp.path().join("shop.json");
    fs::write(&settings, r#"{ "setup_labor_rate": 70.0 }"#).unwrap();

    let json = stdout_json(lasercalc().args(["template", "setup", "--settings"]).arg(&settings));
    assert_eq!(json["setup_labor_rate"], 70.0);
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

#[test]
fn lookup_pierce_found() {
    let json = stdout_json(lasercalc().args([
        "lookup",
        "pierce",
        "--material",
        "mild_steel",
        "--thickness",
        "3",
    ]));
    assert_eq!(json["seconds_per_pierce"]["status"], "found");
    assert_eq!(json["seconds_per_pierce"]["value"], 0.5);
}

#[test]
fn lookup_pierce_not_found_is_not_an_error() {
    let json = stdout_json(lasercalc().args([
        "lookup",
        "pierce",
        "--material",
        "copper",
        "--thickness",
        "15",
    ]));
    assert_eq!(json["seconds_per_pierce"]["status"], "not_found");
}

#[test]
fn lookup_kerf() {
    let json = stdout_json(lasercalc().args([
        "lookup",
        "kerf",
        "--material",
        "mild_steel",
        "--thickness",
        "3",
        "--nozzle",
        "2.0mm_nozzle",
    ]));
    assert_eq!(json["kerf_width_mm"]["value"], 0.32);
    assert_eq!(json["recommended_nozzles"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// worksheet
// ---------------------------------------------------------------------------

#[test]
fn worksheet_new_add_run() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("q-2291.lcw");
    let input = tmp.path().join("pierce.json");
    fs::write(&input, r#"{ "type": "pierce", "label": "Base plate", "hole_count": 12 }"#).unwrap();

    lasercalc()
        .args(["worksheet", "new"])
        .arg(&path)
        .args(["--estimator", "Dana", "--job", "Q-2291", "--customer", "Northside Fab"])
        .assert()
        .success();

    lasercalc()
        .args(["worksheet", "add"])
        .arg(&path)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::is_match("^[0-9a-f-]{36}\n$").unwrap());

    assert!(!path.with_extension("lcw.lock").exists());

    let json = stdout_json(lasercalc().args(["worksheet", "run"]).arg(&path));
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["label"], "Base plate");
    assert_eq!(entries[0]["outcome"]["Ok"]["type"], "pierce");
}

#[test]
fn worksheet_new_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("job.lcw");
    lasercalc().args(["worksheet", "new"]).arg(&path).assert().success();
    lasercalc()
        .args(["worksheet", "new"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn worksheet_add_rejects_invalid_input() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("job.lcw");
    let input = tmp.path().join("bad.json");
    fs::write(&input, r#"{ "type": "kerf", "thickness_mm": 80.0 }"#).unwrap();

    lasercalc().args(["worksheet", "new"]).arg(&path).assert().success();
    lasercalc()
        .args(["worksheet", "add"])
        .arg(&path)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));
}
