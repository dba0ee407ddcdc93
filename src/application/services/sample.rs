//! Sample discovery service
//!
//! Scans sample directories for the raw inputs Space Ranger needs:
//! FASTQ reads, the brightfield tissue image and an optional Loupe
//! alignment JSON.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{is_alignment, is_fastq, is_image, DomainError, Sample, SampleFiles};
use crate::infrastructure::traits::FileSystem;

/// Service for locating and inspecting Visium samples.
pub struct SampleService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl SampleService {
    /// Create a new sample service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Map a sample argument to its directory.
    ///
    /// Anything containing a path separator (including a trailing one, as
    /// left by tab completion) is taken as-is; a bare name is looked up in
    /// `samples_dir`.
    pub fn resolve_path(&self, sample: &str) -> PathBuf {
        let path = Path::new(sample);
        if path.is_absolute()
            || sample.chars().any(std::path::is_separator)
            || sample == "."
            || sample == ".."
        {
            path.to_path_buf()
        } else {
            self.settings.samples_dir.join(sample)
        }
    }

    /// Discover the input files of the sample directory at `dir`.
    ///
    /// Fails with `MissingInput` if `dir` is not a directory. A sample that is
    /// found but incomplete is returned as-is; check `Sample::is_valid`.
    pub fn discover(&self, dir: &Path) -> ApplicationResult<Sample> {
        debug!("discover: dir={}", dir.display());
        if !self.fs.is_dir(dir) {
            return Err(DomainError::MissingInput(dir.to_path_buf()).into());
        }

        let id = self
            .fs
            .canonicalize(dir)
            .ok()
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| dir.file_name())
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string();

        let mut files = SampleFiles::default();
        for path in self
            .fs
            .walk_files(dir)
            .with_path_context("scan sample directory", dir)?
        {
            let name = match path.file_name().and_then(OsStr::to_str) {
                Some(n) if !n.starts_with('.') => n,
                _ => continue,
            };

            if is_fastq(name) {
                files.fastqs.push(path);
            } else if is_image(&path) {
                files.image.get_or_insert(path);
            } else if is_alignment(&path) {
                files.alignment.get_or_insert(path);
            }
        }

        debug!(
            "discover: id={}, fastqs={}, image={:?}, alignment={:?}",
            id,
            files.fastqs.len(),
            files.image,
            files.alignment
        );
        Ok(Sample {
            id,
            path: dir.to_path_buf(),
            files,
            error: None,
        })
    }

    /// Resolve and discover a sample, requiring it to be complete.
    pub fn require_valid(&self, sample: &str) -> ApplicationResult<Sample> {
        let dir = self.resolve_path(sample);
        let found = self.discover(&dir)?;
        if !found.is_valid() {
            return Err(DomainError::InvalidSample {
                path: dir,
                problems: found.problems(),
            }
            .into());
        }
        Ok(found)
    }

    /// Discover every sample directory one level below `dir`
    /// (default: `samples_dir`). Hidden entries and plain files are skipped.
    ///
    /// A directory that cannot be scanned is reported as an invalid sample
    /// carrying the scan error; it does not abort the listing.
    pub fn list(&self, dir: Option<&Path>) -> ApplicationResult<Vec<Sample>> {
        let dir = dir.unwrap_or(&self.settings.samples_dir);
        debug!("list: dir={}", dir.display());
        if !self.fs.is_dir(dir) {
            return Err(DomainError::MissingInput(dir.to_path_buf()).into());
        }

        let entries = self
            .fs
            .list_dir(dir)
            .with_path_context("read samples directory", dir)?;

        let samples = entries
            .iter()
            .filter(|p| self.fs.is_dir(p))
            .filter(|p| {
                p.file_name()
                    .and_then(OsStr::to_str)
                    .is_some_and(|n| !n.starts_with('.'))
            })
            .map(|p| {
                self.discover(p).unwrap_or_else(|e| {
                    warn!("list: cannot scan {}: {}", p.display(), e);
                    Sample::unreadable(p, e.to_string())
                })
            })
            .collect();
        Ok(samples)
    }
}
