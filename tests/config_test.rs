//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Note: These tests run against whatever global config exists on the machine,
//! so they only assert on fields the explicit config file sets.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use srhelper::application::ApplicationError;
use srhelper::config::Settings;

#[test]
fn given_explicit_config_when_load_then_overrides_scalars() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("srhelper.toml");
    fs::write(
        &path,
        r#"
spaceranger = "/opt/spaceranger-3.0.0/spaceranger"
samples_dir = "/data/visium/samples"
localcores = 16
create_bam = true
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.spaceranger, "/opt/spaceranger-3.0.0/spaceranger");
    assert_eq!(settings.samples_dir, PathBuf::from("/data/visium/samples"));
    assert_eq!(settings.localcores, Some(16));
    assert!(settings.create_bam);
}

#[test]
fn given_tilde_in_explicit_config_when_load_then_expands_home() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("srhelper.toml");
    fs::write(&path, "output_dir = \"~/visium/data\"\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    let output_dir = settings.output_dir.expect("output_dir set");
    assert!(output_dir.starts_with(&home));
    assert!(output_dir.ends_with("visium/data"));
}

#[test]
fn given_malformed_config_when_load_then_config_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "localcores = \"many\"\n").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn given_effective_settings_when_to_toml_then_round_trips_set_fields() {
    let settings = Settings {
        localmem: Some(64),
        ..Settings::default()
    };

    let toml = settings.to_toml().unwrap();

    assert!(toml.contains("localmem = 64"));
    assert!(toml.contains("unknown_slide = \"visium-1\""));
    assert!(!toml.contains("localcores"));
}
