//! End-to-end tests for the srhelper binary: dispatch, validation, exit codes.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly.
#![allow(deprecated)]

mod common;

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Stand-in for spaceranger: `sh` runs `./count` from the working directory,
/// which records its arguments and exits with code 3.
const FAKE_COUNT: &str = r#"touch invoked
echo "$0 $@" > args.txt
exit 3
"#;

/// Command isolated from the user's config, pointed at a temp workspace.
fn srhelper(temp: &TempDir) -> Command {
    let root = temp.path();
    let settings = common::test_settings(root);
    fs::create_dir_all(&settings.samples_dir).unwrap();
    fs::write(root.join("count"), FAKE_COUNT).unwrap();

    let mut cmd = Command::new(cargo_bin("srhelper"));
    cmd.current_dir(root)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env("NO_COLOR", "1")
        .env("SRHELPER_SPACERANGER", "sh")
        .env("SRHELPER_SAMPLES_DIR", &settings.samples_dir)
        .env("SRHELPER_TRANSCRIPTOME", &settings.transcriptome);
    cmd
}

fn invoked(root: &Path) -> bool {
    root.join("invoked").exists()
}

#[test]
fn given_help_command_when_run_then_usage_on_stdout_and_success() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
    assert!(!invoked(temp.path()));
}

#[test]
fn given_no_command_when_run_then_prints_help_and_success() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn given_unknown_command_when_run_then_usage_on_stderr_and_exit_64() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .arg("frobnicate")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("frobnicate"))
        .stderr(predicate::str::contains("Usage"));
    assert!(!invoked(temp.path()));
}

#[test]
fn given_nonexistent_sample_when_run_then_names_it_and_exit_66() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["run", "ghost"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("ghost"));
    assert!(!invoked(temp.path()), "tool must not be invoked");
}

#[test]
fn given_valid_sample_when_run_then_forwards_tool_exit_code() {
    // Arrange
    let temp = TempDir::new().unwrap();
    common::make_sample(&temp.path().join("samples"), "A1");

    // Act
    srhelper(&temp).args(["run", "A1"]).assert().code(3);

    // Assert
    assert!(invoked(temp.path()));
    let args = fs::read_to_string(temp.path().join("args.txt")).unwrap();
    assert!(args.starts_with("count --id=A1 "));
    assert!(args.contains("--sample=A1"));
    assert!(args.contains("--unknown-slide=visium-1"));
}

#[test]
fn given_dry_run_when_run_then_prints_command_without_invoking() {
    let temp = TempDir::new().unwrap();
    common::make_sample(&temp.path().join("samples"), "A1");

    srhelper(&temp)
        .args(["run", "A1", "--dry-run", "--", "--nosecondary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sh count --id=A1"))
        .stdout(predicate::str::contains("--nosecondary"));
    assert!(!invoked(temp.path()));
}

#[test]
fn given_slide_without_area_when_run_then_usage_error() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["run", "A1", "--slide", "V19L29-096"])
        .assert()
        .code(64);
    assert!(!invoked(temp.path()));
}

#[test]
fn given_samples_when_list_then_reports_each_with_status() {
    let temp = TempDir::new().unwrap();
    common::make_sample(&temp.path().join("samples"), "A1");
    fs::create_dir_all(temp.path().join("samples").join("B2")).unwrap();

    srhelper(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"A1\s+ok\s+2 FASTQ").unwrap())
        .stdout(predicate::str::is_match(r"B2\s+invalid").unwrap());
}

#[test]
fn given_yaml_name_when_create_config_then_usage_error() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["create-config", "pipeline.yaml"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("not a JSON file name"));
    assert!(!temp.path().join("pipeline.yaml").exists());
}

#[test]
fn given_json_name_when_create_config_then_file_written() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["create-config", "pipeline.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pipeline.json"));

    let content = fs::read_to_string(temp.path().join("pipeline.json")).unwrap();
    assert!(content.contains("\"pipeline name\""));
}

#[test]
fn given_env_override_when_config_show_then_effective_value_printed() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["config", "show"])
        .env("SRHELPER_LOCALCORES", "12")
        .assert()
        .success()
        .stdout(predicate::str::contains("localcores = 12"))
        .stdout(predicate::str::contains("spaceranger = \"sh\""));
}

#[test]
fn given_missing_config_file_when_run_then_config_error() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["--config", "absent.toml", "list"])
        .assert()
        .code(78)
        .stderr(predicate::str::contains("absent.toml"));
}

#[cfg(unix)]
#[test]
fn given_tool_killed_by_signal_when_run_then_exit_128_plus_signal() {
    let temp = TempDir::new().unwrap();
    common::make_sample(&temp.path().join("samples"), "A1");
    let mut cmd = srhelper(&temp);
    fs::write(temp.path().join("count"), "kill -TERM $$\n").unwrap();

    cmd.args(["run", "A1"]).assert().code(128 + 15);
}

#[test]
fn given_trailing_slash_when_run_then_sample_taken_from_working_dir() {
    let temp = TempDir::new().unwrap();
    let elsewhere = temp.path().join("elsewhere");
    common::make_sample(&elsewhere, "A1");

    srhelper(&temp)
        .current_dir(&elsewhere)
        .args(["run", "A1/", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--id=A1"));
}

#[test]
fn given_malformed_env_value_when_run_then_config_error() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .arg("list")
        .env("SRHELPER_LOCALCORES", "many")
        .assert()
        .code(78)
        .stderr(predicate::str::contains("SRHELPER_LOCALCORES"));
}

#[test]
fn given_end_of_input_when_install_dependencies_then_nothing_installed() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["install-dependencies", "deps", "--no-spaceranger", "--no-human"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("mouse reference genome"))
        .stdout(predicate::str::contains("space ranger").not())
        .stdout(predicate::str::contains("human").not())
        .stderr(predicate::str::contains("nothing selected"));
    assert!(!temp.path().join("deps").exists());
}

#[test]
fn given_everything_excluded_when_install_dependencies_yes_then_no_prompt() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args([
            "install-dependencies",
            "deps",
            "--yes",
            "--no-spaceranger",
            "--no-human",
            "--no-mouse",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Y/n]").not())
        .stderr(predicate::str::contains("nothing selected"));
    assert!(!temp.path().join("deps").exists());
}

#[test]
fn given_no_global_config_when_config_init_then_path_reports_it() {
    let temp = TempDir::new().unwrap();

    srhelper(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srhelper.toml (not found)"));

    srhelper(&temp)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srhelper.toml"));

    srhelper(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srhelper.toml"))
        .stdout(predicate::str::contains("not found").not());

    srhelper(&temp)
        .args(["config", "init"])
        .assert()
        .code(73)
        .stderr(predicate::str::contains("--force"));

    #[cfg(target_os = "linux")]
    assert!(temp
        .path()
        .join(".config/srhelper/srhelper.toml")
        .is_file());
}
