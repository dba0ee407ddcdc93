//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    InstallService, PipelineService, SampleService, SpaceRangerService,
};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding the shared dependencies of all services.
///
/// Services are cheap to build; each accessor returns a fresh one.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, cmd }
    }

    pub fn samples(&self) -> SampleService {
        SampleService::new(self.fs.clone(), self.settings.clone())
    }

    pub fn spaceranger(&self) -> SpaceRangerService {
        SpaceRangerService::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
    }

    pub fn installer(&self) -> InstallService {
        InstallService::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
    }

    pub fn pipelines(&self) -> PipelineService {
        PipelineService::new(self.fs.clone())
    }
}
