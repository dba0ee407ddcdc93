//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use srhelper::config::Settings;
use srhelper::infrastructure::traits::CommandRunner;

/// One recorded external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub cmd: String,
    pub args: Vec<String>,
    pub interactive: bool,
}

/// CommandRunner that records calls instead of spawning processes.
pub struct RecordingRunner {
    pub calls: Mutex<Vec<Call>>,
    /// Exit code returned by every call
    pub exit_code: i32,
    /// Commands reported as missing by `is_installed` and failing to spawn
    pub missing: Vec<String>,
}

impl RecordingRunner {
    pub fn new(exit_code: i32) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            exit_code,
            missing: Vec::new(),
        }
    }

    pub fn with_missing(mut self, cmd: &str) -> Self {
        self.missing.push(cmd.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, cmd: &str, args: &[String], interactive: bool) -> io::Result<()> {
        if self.missing.iter().any(|m| m == cmd) {
            return Err(io::Error::new(io::ErrorKind::NotFound, cmd.to_string()));
        }
        self.calls.lock().unwrap().push(Call {
            cmd: cmd.to_string(),
            args: args.to_vec(),
            interactive,
        });
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &str, args: &[String]) -> io::Result<Output> {
        self.record(cmd, args, false)?;
        Ok(Output {
            status: exit_status(self.exit_code),
            stdout: Vec::new(),
            stderr: if self.exit_code == 0 {
                Vec::new()
            } else {
                format!("{cmd}: simulated failure").into_bytes()
            },
        })
    }

    fn run_interactive(&self, cmd: &str, args: &[String]) -> io::Result<i32> {
        self.record(cmd, args, true)?;
        Ok(self.exit_code)
    }

    fn is_installed(&self, cmd: &str) -> bool {
        !self.missing.iter().any(|m| m == cmd)
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Create a complete sample directory: two FASTQs, an image, an alignment.
pub fn make_sample(samples_dir: &Path, id: &str) -> PathBuf {
    let dir = samples_dir.join(id);
    let fastq_dir = dir.join("fastq");
    std::fs::create_dir_all(&fastq_dir).unwrap();
    std::fs::write(fastq_dir.join(format!("{id}_S1_L001_R1_001.fastq.gz")), "").unwrap();
    std::fs::write(fastq_dir.join(format!("{id}_S1_L001_R2_001.fastq.gz")), "").unwrap();
    std::fs::write(dir.join(format!("{id}_high_res.tiff")), "").unwrap();
    dir
}

/// Settings rooted in a temp directory, with an existing reference.
pub fn test_settings(root: &Path) -> Settings {
    let transcriptome = root.join("refdata-gex-GRCh38-2020-A");
    std::fs::create_dir_all(&transcriptome).unwrap();
    Settings {
        spaceranger: "spaceranger".into(),
        install_dir: root.join("install"),
        samples_dir: root.join("samples"),
        transcriptome,
        ..Settings::default()
    }
}
