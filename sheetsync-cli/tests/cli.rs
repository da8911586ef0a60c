use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn sheetsync(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sheetsync").expect("sheetsync binary");
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

const COMPLETE_SETTINGS: &str = r#"
spreadsheet_id: sheet-1
auth_client_email: svc@example.iam
auth_private_key: key
auth_private_key_id: kid
user_synchronized_segments: [seg1]
user_attribute: email
user_range: Users!A1:A100
"#;

fn write_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let settings = dir.join("settings.yaml");
    std::fs::write(&settings, COMPLETE_SETTINGS).unwrap();

    let workbook = dir.join("workbook.json");
    std::fs::write(
        &workbook,
        serde_json::to_string_pretty(&json!({
            "spreadsheet_id": "sheet-1",
            "sheets": [{
                "sheet_id": 1,
                "title": "Users",
                "row_count": 2,
                "rows": [["email"], ["known@x.io"]]
            }]
        }))
        .unwrap(),
    )
    .unwrap();

    let messages = dir.join("messages.json");
    std::fs::write(
        &messages,
        serde_json::to_string(&json!([
            { "user": { "id": "1", "email": "new@x.io" }, "segments": [{ "id": "seg1" }], "message_id": "m1" },
            { "user": { "id": "2", "email": "known@x.io" }, "segments": [{ "id": "seg1" }], "message_id": "m2" },
            { "user": { "id": "3" }, "segments": [{ "id": "seg1" }], "message_id": "m3" }
        ]))
        .unwrap(),
    )
    .unwrap();

    (settings, workbook, messages)
}

#[test]
fn init_writes_default_settings_once() {
    let home = TempDir::new().unwrap();

    sheetsync(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default settings"));
    assert!(home.path().join(".sheetsync/settings.yaml").exists());

    sheetsync(home.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    sheetsync(home.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn status_of_fresh_settings_requires_setup() {
    let home = TempDir::new().unwrap();
    sheetsync(home.path()).arg("init").assert().success();

    let output = sheetsync(home.path())
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "setupRequired");
    assert_eq!(json["messages"].as_array().unwrap().len(), 4);
}

#[test]
fn status_without_settings_points_at_init() {
    let home = TempDir::new().unwrap();
    sheetsync(home.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sheetsync init"));
}

#[test]
fn status_of_complete_settings_is_ok() {
    let home = TempDir::new().unwrap();
    let (settings, _, _) = write_fixtures(home.path());
    sheetsync(home.path())
        .args(["status", "--settings"])
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("Users!A1:A100"));
}

#[test]
fn sync_appends_new_values_and_grows_the_sheet() {
    let home = TempDir::new().unwrap();
    let (settings, workbook, messages) = write_fixtures(home.path());

    sheetsync(home.path())
        .args(["sync", "user:update", "--settings"])
        .arg(&settings)
        .arg("--messages")
        .arg(&messages)
        .arg("--workbook")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 1 row(s) to Users!A3:A3"))
        .stdout(predicate::str::contains("1 success | 2 skip"));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&workbook).unwrap()).unwrap();
    assert_eq!(saved["sheets"][0]["row_count"], 3);
    assert_eq!(saved["sheets"][0]["rows"][2], json!(["new@x.io"]));
}

#[test]
fn dry_run_reports_range_and_leaves_workbook_untouched() {
    let home = TempDir::new().unwrap();
    let (settings, workbook, messages) = write_fixtures(home.path());
    let before = std::fs::read_to_string(&workbook).unwrap();

    let output = sheetsync(home.path())
        .args(["sync", "user:update", "--dry-run", "--json", "--settings"])
        .arg(&settings)
        .arg("--messages")
        .arg(&messages)
        .arg("--workbook")
        .arg(&workbook)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "would_write");
    assert_eq!(json["range"], "Users!A3:A3");
    assert_eq!(json["records"][0]["result"], "pending");
    assert_eq!(json["records"][1]["result"], "skip");
    assert_eq!(std::fs::read_to_string(&workbook).unwrap(), before);
}

#[test]
fn sync_rejects_unknown_channel() {
    let home = TempDir::new().unwrap();
    let (settings, workbook, messages) = write_fixtures(home.path());
    sheetsync(home.path())
        .args(["sync", "foo", "--settings"])
        .arg(&settings)
        .arg("--messages")
        .arg(&messages)
        .arg("--workbook")
        .arg(&workbook)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Channel 'foo' is not registered. Allowed channels are user:update, account:update.",
        ));
}

#[test]
fn range_prints_insert_range() {
    let home = TempDir::new().unwrap();
    sheetsync(home.path())
        .args(["range", "Sheet1!A1:A10", "--occupied", "10", "--count", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sheet1!A11:A15"))
        .stdout(predicate::str::contains("max row: 15"));
}

#[test]
fn range_rejects_multi_column_ranges() {
    let home = TempDir::new().unwrap();
    sheetsync(home.path())
        .args(["range", "Sheet1!A1:C10", "--occupied", "1", "--count", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("single-column"));
}
