use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mdt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mdt").unwrap();
    cmd.current_dir(dir.path()).env("MDT_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    mdt(dir).arg("init").assert().success();
}

fn create_cr(dir: &TempDir, key: &str, title: &str, problem: &str) {
    mdt(dir)
        .args(["cr", "create", key, "--title", title, "--problem", problem])
        .assert()
        .success();
}

fn declare(dir: &TempDir, key: &str, path: &str, role: &str, responsibility: &str) {
    mdt(dir)
        .args([
            "cr",
            "declare",
            key,
            path,
            "--role",
            role,
            "--responsibility",
            responsibility,
        ])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// mdt init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    mdt(&dir).arg("init").assert().success();

    assert!(dir.path().join(".mdt").is_dir());
    assert!(dir.path().join(".mdt/crs").is_dir());
    assert!(dir.path().join(".mdt/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    mdt(&dir).arg("init").assert().success();
    mdt(&dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// mdt cr
// ---------------------------------------------------------------------------

#[test]
fn cr_create_normalizes_key_and_writes_files() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    mdt(&dir)
        .args([
            "cr", "create", "mdt-66", "--title", "Split commands", "--problem", "One big file",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("MDT-066"));

    assert!(dir.path().join(".mdt/crs/MDT-066/manifest.yaml").exists());
    assert!(dir.path().join(".mdt/crs/MDT-066/cr.md").exists());
}

#[test]
fn cr_create_requires_init() {
    let dir = TempDir::new().unwrap();
    mdt(&dir)
        .args(["cr", "create", "MDT-001", "--title", "t", "--problem", "p"])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn cr_create_rejects_malformed_key() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    mdt(&dir)
        .args(["cr", "create", "66-MDT", "--title", "t", "--problem", "p"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid ticket key"));
}

#[test]
fn cr_show_unknown_key_exits_4() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    mdt(&dir)
        .args(["cr", "show", "MDT-999"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn cr_list_shows_created_crs() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    create_cr(&dir, "MDT-002", "Second", "p");
    create_cr(&dir, "MDT-001", "First", "p");

    let output = mdt(&dir).args(["cr", "list"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let first = stdout.find("MDT-001").unwrap();
    let second = stdout.find("MDT-002").unwrap();
    assert!(first < second, "list should be sorted by key");
}

#[test]
fn cr_declare_and_verify_size() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    create_cr(&dir, "MDT-010", "t", "p");
    declare(&dir, "MDT-010", "commands/login.ext", "feature", "login flow");

    mdt(&dir)
        .args([
            "cr",
            "verify-size",
            "MDT-010",
            "commands/login.ext",
            "--lines",
            "187",
        ])
        .assert()
        .success();

    mdt(&dir)
        .args(["cr", "show", "MDT-010"])
        .assert()
        .success()
        .stdout(predicate::str::contains("187"));
}

#[test]
fn cr_declare_rejects_unknown_role() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    create_cr(&dir, "MDT-011", "t", "p");
    mdt(&dir)
        .args([
            "cr",
            "declare",
            "MDT-011",
            "a.ext",
            "--role",
            "gizmo",
            "--responsibility",
            "r",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid role"));
}

// ---------------------------------------------------------------------------
// mdt design
// ---------------------------------------------------------------------------

fn duplicated_validation_cr(dir: &TempDir, key: &str) {
    create_cr(dir, key, "Split command validation", "Commands duplicate their request checks");
    declare(dir, key, "commands/login.ext", "feature", "input validation");
    declare(dir, key, "commands/signup.ext", "feature", "input validation");
}

#[test]
fn design_not_needed_for_trivial_cr() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    create_cr(&dir, "MDT-020", "Fix typo", "One wrong word");
    declare(&dir, "MDT-020", "errors.ext", "utility", "error text");

    mdt(&dir)
        .args(["design", "MDT-020"])
        .assert()
        .success()
        .stdout(predicate::str::contains("architecture design not needed"));
}

#[test]
fn design_surfaces_decisions_for_repeated_responsibility() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-021");

    mdt(&dir)
        .args(["design", "MDT-021"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 decision point(s)"))
        .stdout(predicate::str::contains("(recommended)"))
        .stdout(predicate::str::contains("input validation"));
}

#[test]
fn design_select_persists_document_and_criteria() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-022");

    mdt(&dir)
        .args(["design", "MDT-022", "--select", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("design r1 persisted"))
        .stdout(predicate::str::contains("shared/input-validation/"));

    let doc = std::fs::read_to_string(dir.path().join(".mdt/crs/MDT-022/cr.md")).unwrap();
    assert!(doc.contains("## Architecture Design (r1)"));
    assert!(doc.contains("### Shared Patterns"));
    assert!(doc.contains("### Size Guidance"));
    assert!(doc.contains("### Extension Rule"));
    assert!(doc.contains("- [ ] Every module in the r1 design"));

    // The extraction target landed in the artifact table.
    mdt(&dir)
        .args(["cr", "show", "MDT-022"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared/input-validation/"))
        .stdout(predicate::str::contains("r1"));
}

#[test]
fn design_blocked_by_stop_zone_exits_6() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-023");
    mdt(&dir)
        .args([
            "cr",
            "verify-size",
            "MDT-023",
            "commands/login.ext",
            "--lines",
            "301",
        ])
        .assert()
        .success();

    mdt(&dir)
        .args(["design", "MDT-023", "--select", "0"])
        .assert()
        .failure()
        .code(6)
        .stdout(predicate::str::contains("design blocked"))
        .stdout(predicate::str::contains("301"));

    // Nothing persisted.
    let doc = std::fs::read_to_string(dir.path().join(".mdt/crs/MDT-023/cr.md")).unwrap();
    assert!(!doc.contains("Architecture Design"));
}

#[test]
fn design_select_count_mismatch_exits_1() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-024");

    mdt(&dir)
        .args(["design", "MDT-024", "--select", "0,1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("selection count mismatch"));
}

#[test]
fn design_second_pass_adds_new_revision() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-025");

    mdt(&dir)
        .args(["design", "MDT-025", "--select", "0"])
        .assert()
        .success();
    mdt(&dir)
        .args(["design", "MDT-025", "--select", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("design r2 persisted"));

    let doc = std::fs::read_to_string(dir.path().join(".mdt/crs/MDT-025/cr.md")).unwrap();
    assert!(doc.contains("(r1)"));
    assert!(doc.contains("(r2)"));
}

// ---------------------------------------------------------------------------
// mdt thresholds / config
// ---------------------------------------------------------------------------

#[test]
fn thresholds_lists_all_roles() {
    let dir = TempDir::new().unwrap();
    mdt(&dir)
        .arg("thresholds")
        .assert()
        .success()
        .stdout(predicate::str::contains("feature"))
        .stdout(predicate::str::contains("200"))
        .stdout(predicate::str::contains("300"))
        .stdout(predicate::str::contains("complex-logic"))
        .stdout(predicate::str::contains("600"));
}

#[test]
fn config_show_prints_project() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    mdt(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project:"));
}

#[test]
fn config_validate_ok_by_default() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    mdt(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK"));
}

#[test]
fn json_output_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    duplicated_validation_cr(&dir, "MDT-030");

    let output = mdt(&dir)
        .args(["--json", "design", "MDT-030"])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["decisions"].as_array().unwrap().len(), 1);
}
