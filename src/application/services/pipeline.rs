//! JSON pipeline configuration
//!
//! The pipeline file lists the samples of one processing batch along with
//! the Space Ranger installation, reference and output locations. Keys are
//! human-readable (`"space ranger directory"`), so every field is renamed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{expand_env_vars, DomainError, SPACERANGER_VERSION};
use crate::infrastructure::traits::FileSystem;

const INFORMATION: &str = "Edit this file to add references to the 10X Visium data to process. \
Run `srhelper help create-config` to see how to edit it.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineMetadata {
    #[serde(rename = "File generation date")]
    pub generated: String,
    #[serde(rename = "Information", default)]
    pub information: String,
}

/// One sample entry of a pipeline file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineSample {
    pub name: String,
    /// Read archive accession (e.g. SRR number) or FASTQ location
    #[serde(rename = "FASTQ", default)]
    pub fastq: String,
    /// Tissue image, relative to the sample directory
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    pub metadata: PipelineMetadata,
    #[serde(rename = "pipeline name")]
    pub pipeline_name: String,
    #[serde(rename = "space ranger directory")]
    pub spaceranger_dir: PathBuf,
    #[serde(rename = "genome installation directory")]
    pub genome_dir: PathBuf,
    #[serde(rename = "output directory")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub samples: Vec<PipelineSample>,
}

impl PipelineConfig {
    /// Empty pipeline with one example sample, stamped with `now`.
    pub fn template(now: DateTime<Utc>) -> Self {
        Self {
            metadata: PipelineMetadata {
                generated: now.to_rfc3339_opts(SecondsFormat::Secs, true),
                information: INFORMATION.to_string(),
            },
            pipeline_name: "TEST PIPELINE".into(),
            spaceranger_dir: PathBuf::from(format!("~/visium/spaceranger-{SPACERANGER_VERSION}")),
            genome_dir: PathBuf::from("~/visium/references"),
            output_dir: PathBuf::from("~/visium/data"),
            samples: vec![PipelineSample {
                name: "A1".into(),
                fastq: "SRR REFERENCE NUMBER".into(),
                image: Some("A1_high_res.tiff".into()),
            }],
        }
    }

    /// Serialize as pretty JSON with four-space indentation.
    pub fn to_json(&self) -> ApplicationResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)
            .map_err(|e| ApplicationError::Pipeline {
                message: format!("serialize: {e}"),
            })?;
        let mut json = String::from_utf8(buf).map_err(|e| ApplicationError::Pipeline {
            message: format!("serialize: {e}"),
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Parse pipeline JSON; `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> ApplicationResult<Self> {
        let mut config: Self =
            serde_json::from_str(content).map_err(|e| ApplicationError::Pipeline {
                message: format!("parse {}: {}", origin.display(), e),
            })?;
        config.expand_paths();
        Ok(config)
    }

    /// Look up a sample entry by name.
    pub fn sample(&self, name: &str) -> Option<&PipelineSample> {
        self.samples.iter().find(|s| s.name == name)
    }

    /// Path of the `spaceranger` executable inside the installation.
    pub fn spaceranger_bin(&self) -> PathBuf {
        self.spaceranger_dir.join("spaceranger")
    }

    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref()));
        self.spaceranger_dir = expand(&self.spaceranger_dir);
        self.genome_dir = expand(&self.genome_dir);
        self.output_dir = expand(&self.output_dir);
    }
}

/// Reads and writes pipeline files.
pub struct PipelineService {
    fs: Arc<dyn FileSystem>,
}

impl PipelineService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write an empty pipeline configuration to `output`.
    ///
    /// `output` must have a `.json` extension. An existing file is only
    /// replaced when `force` is set.
    pub fn create(&self, output: &Path, force: bool) -> ApplicationResult<()> {
        debug!("create: output={}, force={}", output.display(), force);
        let is_json = output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(DomainError::NotJsonFileName(output.to_path_buf()).into());
        }
        if self.fs.exists(output) && !force {
            return Err(ApplicationError::AlreadyExists(output.to_path_buf()));
        }

        let json = PipelineConfig::template(Utc::now()).to_json()?;
        self.fs
            .ensure_parent(output)
            .with_path_context("create parent directory", output)?;
        self.fs
            .write(output, &json)
            .with_path_context("write pipeline config", output)
    }

    /// Load a pipeline configuration file.
    pub fn load(&self, path: &Path) -> ApplicationResult<PipelineConfig> {
        debug!("load: path={}", path.display());
        if !self.fs.is_file(path) {
            return Err(DomainError::MissingInput(path.to_path_buf()).into());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read pipeline config", path)?;
        PipelineConfig::parse(&content, path)
    }
}
