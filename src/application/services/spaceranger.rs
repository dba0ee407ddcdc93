//! Space Ranger invocation service
//!
//! Turns a sample directory plus settings into a `spaceranger count`
//! command line, then runs it with inherited stdio and forwards its exit code.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::{PipelineService, SampleService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{DomainError, Reference, Sample};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// What the user asked `run` to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Sample name (in `samples_dir`) or path to a sample directory
    pub sample: String,
    /// Run id; defaults to the sample id
    pub id: Option<String>,
    /// Slide serial number; requires `area`
    pub slide: Option<String>,
    /// Capture area (e.g. `A1`); requires `slide`
    pub area: Option<String>,
    /// JSON pipeline file overriding binary, reference and output locations
    pub pipeline: Option<PathBuf>,
    /// Passed to spaceranger verbatim, after the derived arguments
    pub extra_args: Vec<String>,
}

/// A fully derived external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote unless every character is shell-inert.
fn shell_quote(s: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "-_./=,:+@%".contains(c);
    if !s.is_empty() && s.chars().all(safe) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Inputs to `count_args` after all lookups are done.
#[derive(Debug, Clone)]
pub struct CountPlan<'a> {
    pub id: &'a str,
    pub sample: &'a Sample,
    pub transcriptome: &'a Path,
    pub image: &'a Path,
    /// `(slide, area)` when the serial number is known
    pub slide: Option<(&'a str, &'a str)>,
    pub output_dir: Option<&'a Path>,
    pub settings: &'a Settings,
    pub extra_args: &'a [String],
}

/// Derive the `spaceranger count` argument list.
///
/// Order: `count`, id, transcriptome, fastqs, sample prefixes, image,
/// slide/area or unknown-slide, loupe alignment, create-bam, output dir,
/// resource limits, extra arguments.
pub fn count_args(plan: &CountPlan<'_>) -> Vec<String> {
    let files = &plan.sample.files;
    let join = |paths: Vec<PathBuf>| {
        paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(",")
    };

    let mut args = vec![
        "count".to_string(),
        format!("--id={}", plan.id),
        format!("--transcriptome={}", plan.transcriptome.display()),
        format!("--fastqs={}", join(files.fastq_dirs())),
    ];

    let prefixes = files.fastq_samples();
    if !prefixes.is_empty() {
        args.push(format!("--sample={}", prefixes.join(",")));
    }

    args.push(format!("--image={}", plan.image.display()));

    match plan.slide {
        Some((slide, area)) => {
            args.push(format!("--slide={slide}"));
            args.push(format!("--area={area}"));
        }
        None => args.push(format!("--unknown-slide={}", plan.settings.unknown_slide)),
    }

    if let Some(alignment) = &files.alignment {
        args.push(format!("--loupe-alignment={}", alignment.display()));
    }

    args.push(format!("--create-bam={}", plan.settings.create_bam));

    if let Some(dir) = plan.output_dir {
        args.push(format!("--output-dir={}", dir.join(plan.id).display()));
    }
    if let Some(cores) = plan.settings.localcores {
        args.push(format!("--localcores={cores}"));
    }
    if let Some(mem) = plan.settings.localmem {
        args.push(format!("--localmem={mem}"));
    }

    args.extend(plan.extra_args.iter().cloned());
    args
}

/// Service wrapping the external Space Ranger processor.
pub struct SpaceRangerService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl SpaceRangerService {
    /// Create a new Space Ranger service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { fs, cmd, settings }
    }

    /// Validate all inputs and derive the command line, without running it.
    ///
    /// # Errors
    /// - `IncompleteSlide` if only one of slide/area is given
    /// - `MissingInput` if the sample, pipeline file, image or reference is absent
    /// - `InvalidSample` if the sample lacks FASTQs or an image
    pub fn prepare(&self, request: &RunRequest) -> ApplicationResult<Invocation> {
        debug!("prepare: request={:?}", request);
        let slide = match (&request.slide, &request.area) {
            (Some(slide), Some(area)) => Some((slide.as_str(), area.as_str())),
            (None, None) => None,
            _ => return Err(DomainError::IncompleteSlide.into()),
        };

        let pipeline = request
            .pipeline
            .as_deref()
            .map(|p| PipelineService::new(self.fs.clone()).load(p))
            .transpose()?;

        let samples = SampleService::new(self.fs.clone(), self.settings.clone());
        let sample = samples.require_valid(&request.sample)?;

        let mut program = self.settings.spaceranger.clone();
        let mut transcriptome = self.settings.transcriptome.clone();
        let mut output_dir = self.settings.output_dir.clone();
        let mut image = sample.files.image.clone();

        if let Some(pipeline) = &pipeline {
            program = pipeline.spaceranger_bin().display().to_string();
            let reference = self
                .settings
                .transcriptome
                .file_name()
                .unwrap_or_else(|| OsStr::new(Reference::Human.name()));
            transcriptome = pipeline.genome_dir.join(reference);
            output_dir = Some(pipeline.output_dir.clone());
            if let Some(name) = pipeline.sample(&sample.id).and_then(|s| s.image.as_deref()) {
                let path = sample.path.join(name);
                if !self.fs.is_file(&path) {
                    return Err(DomainError::MissingInput(path).into());
                }
                image = Some(path);
            }
        }

        if !self.fs.is_dir(&transcriptome) {
            return Err(DomainError::MissingInput(transcriptome).into());
        }
        // require_valid guarantees an image was discovered
        let image = image.ok_or_else(|| DomainError::InvalidSample {
            path: sample.path.clone(),
            problems: sample.problems(),
        })?;

        let id = request.id.clone().unwrap_or_else(|| sample.id.clone());
        let args = count_args(&CountPlan {
            id: &id,
            sample: &sample,
            transcriptome: &transcriptome,
            image: &image,
            slide,
            output_dir: output_dir.as_deref(),
            settings: &self.settings,
            extra_args: &request.extra_args,
        });

        Ok(Invocation { program, args })
    }

    /// Spawn the processor once and return its exit code unchanged.
    pub fn execute(&self, invocation: &Invocation) -> ApplicationResult<i32> {
        info!("running: {}", invocation);
        let code = self
            .cmd
            .run_interactive(&invocation.program, &invocation.args)
            .map_err(|e| ApplicationError::spawn(&invocation.program, e))?;
        debug!("execute: exit code {}", code);
        Ok(code)
    }

    /// Prepare and execute in one step.
    pub fn run(&self, request: &RunRequest) -> ApplicationResult<i32> {
        let invocation = self.prepare(request)?;
        self.execute(&invocation)
    }
}
