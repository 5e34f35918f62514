use assert_cmd::Command;
use predicates::prelude::*;

fn manuscript_cli(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("manuscript-cli").unwrap();
    cmd.env("MANUSCRIPT_CONFIG", config_dir.path().join("config.yaml"))
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn version_prints_package_version() {
    let dir = tempfile::tempdir().unwrap();
    manuscript_cli(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn deploy_without_env_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    manuscript_cli(&dir)
        .args(["deploy", "manuscript.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--env"));
}

#[test]
fn chainbase_deploy_is_not_available_yet() {
    let dir = tempfile::tempdir().unwrap();
    manuscript_cli(&dir)
        .args(["deploy", "manuscript.yaml", "--env", "chainbase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coming soon"));
}

#[test]
fn missing_descriptor_fails_first_step() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");
    manuscript_cli(&dir)
        .args(["deploy", missing.to_str().unwrap(), "--env", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step 1: Validating manuscript file"));
}

#[test]
fn list_of_missing_directory_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = dir.path().join("no-jobs-here");
    manuscript_cli(&dir)
        .args(["list", jobs.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No manuscript jobs found."));
}

#[test]
fn stopping_unknown_job_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        format!("baseDir: {}\n", dir.path().display()),
    )
    .unwrap();
    manuscript_cli(&dir)
        .args(["stop", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ghost'").and(predicate::str::contains("not found")));
}
