//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod install;
mod pipeline;
mod sample;
mod spaceranger;

pub use install::{InstallService, REQUIRED_TOOLS};
pub use pipeline::{PipelineConfig, PipelineMetadata, PipelineSample, PipelineService};
pub use sample::SampleService;
pub use spaceranger::{count_args, CountPlan, Invocation, RunRequest, SpaceRangerService};
