//! Domain entities: core data structures

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

/// Space Ranger release installed by `install-dependencies`.
pub const SPACERANGER_VERSION: &str = "3.0.0";

/// Signed download URL of the Space Ranger release archive.
pub const SPACERANGER_URL: &str = "https://cf.10xgenomics.com/releases/spatial-exp/spaceranger-3.0.0.tar.gz?Expires=1711892573&Key-Pair-Id=APKAI7S6A5RYOXBWRPDA&Signature=aFYZ9LHh705yiMvx9Qhs4fo~9wvcN0OKbnMKM2pM8UnzCbxaqAJEDZ-mbwm3Azr-Ary9KKMvzSC1fDy2wXI5jv-OySeSIuCh~odZ-1BqQh1xsjzJbVcOSqclzZRQZW5k2e-voXHRCO15uOGYWCEYyooVUwkWFBE5f8bG3UGVe6WDZprs1xp51-7iLD9mxo3KAcbNhDGBMBfTOaHnEK3JHVx7btEdtLZKR1q8FboYv1vEovyFH2Fx0fDRxV5rS9XzIS4GQo5-cicCkGaEPiXdMrpTLYvyKY4mt3h33SrVHujF5v9NOR5lw0~S2UcV7tDG~zRskLvmFwFyCJKaLAUcIw__";

/// Image extensions accepted as the brightfield tissue image (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg", "jpeg", "png"];

/// Illumina bcl2fastq naming: `{prefix}_S{n}[_L{lane}]_{R1|R2|I1|I2}_001.fastq.gz`
static ILLUMINA_FASTQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.+?)_S\d+(?:_L\d{3})?_(?:R[12]|I[12])_\d{3}\.f(?:ast)?q\.gz$")
        .expect("static regex")
});

/// Reference transcriptome published by 10x Genomics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    Human,
    Mouse,
}

impl Reference {
    /// Directory name the archive unpacks to.
    pub fn name(&self) -> &'static str {
        match self {
            Reference::Human => "refdata-gex-GRCh38-2020-A",
            Reference::Mouse => "refdata-gex-mm10-2020-A",
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Reference::Human => {
                "https://cf.10xgenomics.com/supp/spatial-exp/refdata-gex-GRCh38-2020-A.tar.gz"
            }
            Reference::Mouse => {
                "https://cf.10xgenomics.com/supp/spatial-exp/refdata-gex-mm10-2020-A.tar.gz"
            }
        }
    }
}

/// Something `install-dependencies` can download and unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    SpaceRanger,
    Reference(Reference),
}

impl Dependency {
    /// Archive file name inside the installation directory.
    pub fn archive_name(&self) -> String {
        match self {
            Dependency::SpaceRanger => format!("spaceranger-{SPACERANGER_VERSION}.tar.gz"),
            Dependency::Reference(r) => format!("{}.tar.gz", r.name()),
        }
    }

    /// Human-readable label used in prompts and progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Dependency::SpaceRanger => "space ranger",
            Dependency::Reference(Reference::Human) => "the human reference genome",
            Dependency::Reference(Reference::Mouse) => "the mouse reference genome",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw input files discovered in a sample directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFiles {
    /// FASTQ read files, sorted
    pub fastqs: Vec<PathBuf>,
    /// Brightfield tissue image
    pub image: Option<PathBuf>,
    /// Manual fiducial alignment (Loupe JSON)
    pub alignment: Option<PathBuf>,
}

impl SampleFiles {
    /// Distinct directories holding the FASTQ files, sorted.
    pub fn fastq_dirs(&self) -> Vec<PathBuf> {
        self.fastqs
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .sorted()
            .dedup()
            .collect()
    }

    /// Distinct Illumina sample prefixes of the FASTQ files, sorted.
    ///
    /// Files not following the Illumina naming scheme contribute nothing.
    pub fn fastq_samples(&self) -> Vec<String> {
        self.fastqs
            .iter()
            .filter_map(|p| p.file_name().and_then(OsStr::to_str))
            .filter_map(illumina_prefix)
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect()
    }
}

/// One Visium sample: a directory of raw inputs for a tissue section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Directory name, used as the default run id
    pub id: String,
    pub path: PathBuf,
    pub files: SampleFiles,
    /// Why the directory could not be scanned
    pub error: Option<String>,
}

impl Sample {
    /// A sample directory whose scan failed; always invalid.
    pub fn unreadable(path: &Path, error: impl Into<String>) -> Self {
        Self {
            id: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            files: SampleFiles::default(),
            error: Some(error.into()),
        }
    }

    /// Reasons this sample cannot be processed; empty when valid.
    pub fn problems(&self) -> Vec<String> {
        if let Some(error) = &self.error {
            return vec![error.clone()];
        }
        let mut problems = Vec::new();
        if self.files.fastqs.is_empty() {
            problems.push("missing FASTQ files".to_string());
        }
        if self.files.image.is_none() {
            problems.push("missing tissue image".to_string());
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.problems().is_empty()
    }
}

/// Check whether a file name is a gzipped FASTQ.
pub fn is_fastq(name: &str) -> bool {
    name.ends_with(".fastq.gz") || name.ends_with(".fq.gz")
}

/// Extract the Illumina sample prefix (`--sample` value) from a FASTQ name.
pub fn illumina_prefix(name: &str) -> Option<&str> {
    ILLUMINA_FASTQ
        .captures(name)
        .and_then(|c| c.name("prefix"))
        .map(|m| m.as_str())
}

/// Check whether a path has a tissue image extension (case-insensitive).
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check whether a path is a Loupe alignment JSON.
pub fn is_alignment(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` and `${VAR}` syntax
/// - `~` for home directory
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
