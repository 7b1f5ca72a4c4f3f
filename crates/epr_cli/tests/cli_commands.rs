use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};

fn epr(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_epr"))
        .arg("--database")
        .arg(db)
        .arg("--template-dir")
        .arg(db.with_file_name("no-templates"))
        .args(args)
        .env_remove("EPR_CONFIG")
        .env_remove("EPR_LOG_LEVEL")
        .output()
        .expect("run epr")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn stderr_error(output: &Output) -> Value {
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .rev()
        .find(|line| line.starts_with('{'))
        .expect("error payload line");
    serde_json::from_str(line).expect("error payload json")
}

#[test]
fn create_update_get_round_through_the_binary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("epr.db");

    let created = stdout_json(&epr(
        &db,
        &["create", "--employee-name", "Ada Lovelace", "--department", "Research"],
    ));
    let id = created["id"].as_i64().expect("id");
    assert_eq!(created["position"], "");

    let updated = stdout_json(&epr(
        &db,
        &["update", &id.to_string(), "--department", "Engineering", "--goals", ""],
    ));
    assert_eq!(updated["department"], "Engineering");
    assert_eq!(updated["employee_name"], "Ada Lovelace");

    let fetched = stdout_json(&epr(&db, &["get", &id.to_string()]));
    assert_eq!(fetched, updated);

    let listed = stdout_json(&epr(&db, &["list"]));
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[test]
fn missing_rating_reports_not_found_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("epr.db");

    let body = stderr_error(&epr(&db, &["get", "41"]));
    assert_eq!(body["error"]["code"], "not_found");

    let body = stderr_error(&epr(&db, &["delete", "41"]));
    assert_eq!(body["error"]["code"], "not_found");
}

#[test]
fn export_without_template_assets_reports_template_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("epr.db");
    let created = stdout_json(&epr(&db, &["create", "--employee-name", "Grace"]));
    let id = created["id"].as_i64().expect("id").to_string();

    let out = dir.path().join("out.pdf");
    let body = stderr_error(&epr(
        &db,
        &["export", &id, "--out", out.to_str().expect("utf8 path")],
    ));
    assert_eq!(body["error"]["code"], "template_unavailable");
    assert!(!out.exists());
}

#[test]
fn templates_lists_builtin_keys_as_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("epr.db");

    let templates = stdout_json(&epr(&db, &["templates"]));
    let entries = templates.as_array().expect("array");
    assert!(entries.iter().any(|entry| entry["key"] == "default"));
    assert!(entries.iter().all(|entry| entry["available"] == false));
    assert!(!db.exists());
}
