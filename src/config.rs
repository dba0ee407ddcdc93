//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/srhelper/srhelper.toml`
//! 3. Explicit config: `--config <FILE>`
//! 4. Environment variables: `SRHELPER_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Reference, SPACERANGER_URL};

const ENV_PREFIX: &str = "SRHELPER";

/// Unified configuration for srhelper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Space Ranger executable (name on PATH or path)
    pub spaceranger: String,
    /// Download URL of the Space Ranger archive (signed URLs expire)
    pub spaceranger_url: String,
    /// Where `install-dependencies` puts archives by default
    pub install_dir: PathBuf,
    /// Directory containing one sub-directory per sample
    pub samples_dir: PathBuf,
    /// Reference transcriptome passed to `--transcriptome`
    pub transcriptome: PathBuf,
    /// Parent of per-run output directories (spaceranger default: cwd)
    pub output_dir: Option<PathBuf>,
    pub localcores: Option<u32>,
    /// Memory cap in GB
    pub localmem: Option<u32>,
    /// Generate the possorted BAM
    pub create_bam: bool,
    /// Slide version used when no serial number is given
    pub unknown_slide: String,
}

impl Default for Settings {
    fn default() -> Self {
        let install_dir = PathBuf::from("~/visium");
        Self {
            spaceranger: "spaceranger".into(),
            spaceranger_url: SPACERANGER_URL.into(),
            samples_dir: install_dir.join("samples"),
            transcriptome: install_dir.join(Reference::Human.name()),
            install_dir,
            output_dir: None,
            localcores: None,
            localmem: None,
            create_bam: false,
            unknown_slide: "visium-1".into(),
        }
    }
}

/// Raw settings for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub spaceranger: Option<String>,
    pub spaceranger_url: Option<String>,
    pub install_dir: Option<PathBuf>,
    pub samples_dir: Option<PathBuf>,
    pub transcriptome: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub localcores: Option<u32>,
    pub localmem: Option<u32>,
    pub create_bam: Option<bool>,
    pub unknown_slide: Option<String>,
}

/// Get the XDG config directory for srhelper.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "srhelper").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("srhelper.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        let expand = |p: &Path| PathBuf::from(expand_env_vars(p.to_string_lossy().as_ref()));

        self.install_dir = expand(&self.install_dir);
        self.samples_dir = expand(&self.samples_dir);
        self.transcriptome = expand(&self.transcriptome);
        self.output_dir = self.output_dir.as_deref().map(expand);
        // May be a path like ~/visium/spaceranger-3.0.0/spaceranger
        self.spaceranger = expand_env_vars(&self.spaceranger);
    }

    /// Overlay config onto self: every field the overlay specifies wins.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            spaceranger: overlay
                .spaceranger
                .clone()
                .unwrap_or_else(|| self.spaceranger.clone()),
            spaceranger_url: overlay
                .spaceranger_url
                .clone()
                .unwrap_or_else(|| self.spaceranger_url.clone()),
            install_dir: overlay
                .install_dir
                .clone()
                .unwrap_or_else(|| self.install_dir.clone()),
            samples_dir: overlay
                .samples_dir
                .clone()
                .unwrap_or_else(|| self.samples_dir.clone()),
            transcriptome: overlay
                .transcriptome
                .clone()
                .unwrap_or_else(|| self.transcriptome.clone()),
            output_dir: overlay.output_dir.clone().or_else(|| self.output_dir.clone()),
            localcores: overlay.localcores.or(self.localcores),
            localmem: overlay.localmem.or(self.localmem),
            create_bam: overlay.create_bam.unwrap_or(self.create_bam),
            unknown_slide: overlay
                .unknown_slide
                .clone()
                .unwrap_or_else(|| self.unknown_slide.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/srhelper/srhelper.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `SRHELPER_*` prefix
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current, env_source())?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply SRHELPER_* environment variables as explicit overrides.
    ///
    /// An unset variable leaves the field alone; a value of the wrong type
    /// is a config error, same as in a file.
    fn apply_env_overrides(settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            spaceranger: env_value(&config, "spaceranger")?,
            spaceranger_url: env_value(&config, "spaceranger_url")?,
            install_dir: env_value::<String>(&config, "install_dir")?.map(PathBuf::from),
            samples_dir: env_value::<String>(&config, "samples_dir")?.map(PathBuf::from),
            transcriptome: env_value::<String>(&config, "transcriptome")?.map(PathBuf::from),
            output_dir: env_value::<String>(&config, "output_dir")?.map(PathBuf::from),
            localcores: env_value(&config, "localcores")?,
            localmem: env_value(&config, "localmem")?,
            create_bam: env_value(&config, "create_bam")?,
            unknown_slide: env_value(&config, "unknown_slide")?,
        };

        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# srhelper configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/srhelper/srhelper.toml
#   Explicit: srhelper --config <FILE>
#   Env:      SRHELPER_* environment variables (e.g. SRHELPER_SAMPLES_DIR)

# Space Ranger executable, on PATH or as a path
# spaceranger = "~/visium/spaceranger-3.0.0/spaceranger"

# Download URL for install-dependencies (10x signs these URLs, they expire)
# spaceranger_url = "https://cf.10xgenomics.com/releases/spatial-exp/spaceranger-3.0.0.tar.gz?..."

# Default installation directory for install-dependencies
# install_dir = "~/visium"

# One sub-directory per sample: FASTQs, tissue image, optional alignment JSON
# samples_dir = "~/visium/samples"

# Reference transcriptome
# transcriptome = "~/visium/refdata-gex-GRCh38-2020-A"

# Parent directory for run outputs (<output_dir>/<id>)
# output_dir = "~/visium/data"

# Resource limits
# localcores = 8
# localmem = 64

# create_bam = false
# unknown_slide = "visium-1"
"#
        .to_string()
    }
}

/// `SRHELPER_*` variables from the process environment.
fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .try_parsing(true)
}

/// Typed lookup of one environment override; `None` when unset.
fn env_value<T: DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("{}_{}: {}", ENV_PREFIX, key.to_uppercase(), e),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
