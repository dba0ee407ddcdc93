//! Dependency installation service
//!
//! Downloads Space Ranger and the reference transcriptomes with `curl`
//! and unpacks them with `tar`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::Dependency;
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// External tools the installer shells out to.
pub const REQUIRED_TOOLS: &[&str] = &["curl", "tar"];

/// Service installing Space Ranger and reference genomes.
pub struct InstallService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl InstallService {
    /// Create a new install service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { fs, cmd, settings }
    }

    /// Download URL for a dependency; the Space Ranger URL is configurable.
    pub fn url(&self, dependency: Dependency) -> &str {
        match dependency {
            Dependency::SpaceRanger => &self.settings.spaceranger_url,
            Dependency::Reference(r) => r.url(),
        }
    }

    /// Check that `curl` and `tar` are available and create `dir`.
    pub fn prepare(&self, dir: &Path) -> ApplicationResult<()> {
        debug!("prepare: dir={}", dir.display());
        if let Some(tool) = REQUIRED_TOOLS.iter().find(|t| !self.cmd.is_installed(t)) {
            return Err(ApplicationError::ToolNotFound {
                tool: tool.to_string(),
            });
        }
        self.fs
            .create_dir_all(dir)
            .with_path_context("create installation directory", dir)
    }

    /// Download and unpack one dependency into `dir`.
    ///
    /// Returns the path of the downloaded archive.
    pub fn install(&self, dir: &Path, dependency: Dependency) -> ApplicationResult<PathBuf> {
        let archive = dir.join(dependency.archive_name());
        debug!("install: {} -> {}", dependency, archive.display());

        self.checked(
            "curl",
            &[
                "-fL".to_string(),
                "-o".to_string(),
                archive.display().to_string(),
                self.url(dependency).to_string(),
            ],
        )?;
        self.checked(
            "tar",
            &[
                "-xzf".to_string(),
                archive.display().to_string(),
                "-C".to_string(),
                dir.display().to_string(),
            ],
        )?;

        Ok(archive)
    }

    /// Run a tool with captured output; a non-zero exit becomes `ToolFailed`.
    fn checked(&self, tool: &str, args: &[String]) -> ApplicationResult<()> {
        let output = self
            .cmd
            .run(tool, args)
            .map_err(|e| ApplicationError::spawn(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ApplicationError::ToolFailed {
                tool: tool.to_string(),
                message: stderr.trim().to_string(),
                exit_code: output.status.code(),
            });
        }
        Ok(())
    }
}
