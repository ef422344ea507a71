//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn drillbook(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("drillbook").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("DRILLBOOK_NOTES")
        .env_remove("DRILLBOOK_ARITH_NOTES")
        .env_remove("DRILLBOOK_ROUND_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

fn read_notes(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("arith"))
        .stdout(predicate::str::contains("check-spec"));
}

#[test]
fn check_spec_accepts_mixed_spec() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["check-spec", "(1, 3~5)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted"))
        .stdout(predicate::str::contains("3~5"))
        .stdout(predicate::str::contains("3 distinct"));
}

#[test]
fn check_spec_reports_syntax_error() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["check-spec", "a~3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn check_spec_rejects_only_ones() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["check-spec", "(1, 1~1)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rejected"));
}

#[test]
fn notes_on_missing_file() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .arg("notes")
        .assert()
        .success()
        .stdout(predicate::str::contains("No stored records"));
}

#[test]
fn wrong_table_answers_fill_the_notes() {
    let dir = TempDir::new().unwrap();
    let mut stdin = "x\n".repeat(10);
    stdin.push_str("N\n");

    drillbook(dir.path())
        .args(["tables", "--seed", "5"])
        .write_stdin(stdin)
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 10:"))
        .stdout(predicate::str::contains("Accuracy: 0/10 (0%)"))
        .stdout(predicate::str::contains("Continue? (Y/N)"));

    let notes = read_notes(&dir.path().join("note.json"));
    let errors = notes["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 10);
    assert!(errors.iter().all(|r| r["type"] == "error" && r["user"] == "x"));
    assert_eq!(notes["timeouts"], serde_json::json!([]));

    drillbook(dir.path())
        .arg("notes")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 error(s), 0 timeout(s)"));
}

#[test]
fn end_of_input_saves_partial_batch() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["tables", "--notes", "drill.json"])
        .write_stdin("x\nx\n")
        .assert()
        .success();

    let notes = read_notes(&dir.path().join("drill.json"));
    assert_eq!(notes["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn arith_single_question_correct_and_reversed() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["arith", "--left", "3", "--right", "4", "--batch-size", "1"])
        .write_stdin("r21\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 × 4 = ?"))
        .stdout(predicate::str::contains("Accuracy: 1/1"));

    let notes = read_notes(&dir.path().join("arith-note.json"));
    assert_eq!(notes["errors"], serde_json::json!([]));
    assert!(!dir.path().join("note.json").exists());
}

#[test]
fn arith_never_replays_table_mistakes() {
    let dir = TempDir::new().unwrap();
    let mut stdin = "x\n".repeat(10);
    stdin.push_str("N\n");

    drillbook(dir.path())
        .args(["tables", "--seed", "8"])
        .write_stdin(stdin)
        .assert()
        .success();
    assert_eq!(
        read_notes(&dir.path().join("note.json"))["errors"]
            .as_array()
            .unwrap()
            .len(),
        10
    );

    let mut stdin = "0\n".repeat(10);
    stdin.push_str("N\n");
    let output = drillbook(dir.path())
        .args(["arith", "--left", "2~9", "--right", "2~9", "--seed", "8"])
        .write_stdin(stdin)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let prompts: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("Question "))
        .collect();
    assert_eq!(prompts.len(), 10);
    assert!(prompts.iter().all(|l| l.contains(" × ")), "{prompts:?}");
    assert!(!stdout.contains("alpha") && !stdout.contains("R2"));

    let arith = read_notes(&dir.path().join("arith-note.json"));
    assert_eq!(arith["errors"].as_array().unwrap().len(), 10);
    let tables = read_notes(&dir.path().join("note.json"));
    assert_eq!(tables["errors"].as_array().unwrap().len(), 10);

    drillbook(dir.path())
        .args(["notes", "--arith"])
        .assert()
        .success()
        .stdout(predicate::str::contains("arith-note.json"))
        .stdout(predicate::str::contains(" × "));
}

#[test]
fn shared_record_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["arith", "--digits", "2x2", "--notes", "note.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must name different files"));
}

#[test]
fn arith_rejects_bad_operand() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["arith", "--left", "1", "--right", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid left operand"));
}

#[test]
fn arith_rejects_zero_digits() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["arith", "--digits", "0x2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn notes_clear_empties_the_store() {
    let dir = TempDir::new().unwrap();
    let notes_path = dir.path().join("note.json");
    std::fs::write(
        &notes_path,
        r#"{"errors": [{"question": "R2(4) = ?", "correct": 2.0, "user": "3", "time": 2.0, "type": "error"}], "timeouts": []}"#,
    )
    .unwrap();

    drillbook(dir.path())
        .args(["notes", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 record(s)"));

    let notes = read_notes(&notes_path);
    assert_eq!(notes["errors"], serde_json::json!([]));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    drillbook(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created drillbook.toml"))
        .stdout(predicate::str::contains("Created tables/example.toml"));

    assert!(dir.path().join("drillbook.toml").exists());

    drillbook(dir.path())
        .args(["validate", "--tables", "tables/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tables"))
        .stdout(predicate::str::contains("All tables valid"));

    drillbook(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        r#"
[[tables]]
name = "sq"
pairs = [[2, 4], [2, 5]]

[[tables]]
name = "sq"
"#,
    )
    .unwrap();

    drillbook(dir.path())
        .args(["validate", "--tables", "bad.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[sq] WARNING: duplicate x value"))
        .stdout(predicate::str::contains("duplicate table name"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["validate", "--tables", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn config_file_sets_notes_path_and_report_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("drillbook.toml"),
        "notes_path = \"custom.json\"\nbatch_size = 2\nreport_dir = \"reports\"\n",
    )
    .unwrap();

    drillbook(dir.path())
        .args(["tables", "--seed", "1"])
        .write_stdin("x\nx\nn\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Session report:"));

    let notes = read_notes(&dir.path().join("custom.json"));
    assert_eq!(notes["errors"].as_array().unwrap().len(), 2);
    let reports: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    drillbook(dir.path())
        .args(["notes", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
