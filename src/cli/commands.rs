//! Command dispatch: maps parsed subcommands to services

use std::io::{self, BufRead};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::RunRequest;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::CliResult;
use crate::config::{global_config_path, Settings};
use crate::domain::{Dependency, Reference};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Entry point after argument parsing. Returns the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(exitcode::OK);
    };

    if let Commands::Completion { shell } = command {
        return cmd_completion(*shell);
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    execute_with(&ServiceContainer::new(settings), command)
}

/// Dispatch a subcommand against an already wired container.
pub fn execute_with(container: &ServiceContainer, command: &Commands) -> CliResult<i32> {
    match command {
        Commands::Run {
            sample,
            id,
            slide,
            area,
            pipeline,
            dry_run,
            extra,
        } => {
            let request = RunRequest {
                sample: sample.clone(),
                id: id.clone(),
                slide: slide.clone(),
                area: area.clone(),
                pipeline: pipeline.clone(),
                extra_args: extra.clone(),
            };
            cmd_run(container, &request, *dry_run)
        }
        Commands::List { dir } => cmd_list(container, dir.as_deref()),
        Commands::InstallDependencies {
            dir,
            yes,
            no_spaceranger,
            no_human,
            no_mouse,
        } => {
            let dir = dir
                .clone()
                .unwrap_or_else(|| container.settings.install_dir.clone());
            let offered = [
                (Dependency::SpaceRanger, !no_spaceranger),
                (Dependency::Reference(Reference::Human), !no_human),
                (Dependency::Reference(Reference::Mouse), !no_mouse),
            ];
            let candidates: Vec<Dependency> = offered
                .iter()
                .filter(|(_, wanted)| *wanted)
                .map(|(d, _)| *d)
                .collect();
            let selected = if *yes {
                candidates
            } else {
                select_interactively(&candidates)?
            };
            cmd_install(container, &dir, &selected)
        }
        Commands::CreateConfig { output, force } => cmd_create_config(container, output, *force),
        Commands::Config { command } => cmd_config(container, command),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

#[instrument(skip(container))]
fn cmd_run(container: &ServiceContainer, request: &RunRequest, dry_run: bool) -> CliResult<i32> {
    let service = container.spaceranger();
    let invocation = service.prepare(request)?;
    if dry_run {
        output::info(&invocation);
        return Ok(exitcode::OK);
    }
    Ok(service.execute(&invocation)?)
}

#[instrument(skip(container))]
fn cmd_list(container: &ServiceContainer, dir: Option<&Path>) -> CliResult<i32> {
    let dir = dir.unwrap_or(&container.settings.samples_dir);
    let samples = container.samples().list(Some(dir))?;

    output::header(&format!("Samples in {}", dir.display()));
    if samples.is_empty() {
        output::warning("no sample directories found");
        return Ok(exitcode::OK);
    }

    for sample in &samples {
        if sample.is_valid() {
            let image = sample
                .files
                .image
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            output::success_detail(&format!(
                "{:<20} ok       {} FASTQ, image {}",
                sample.id,
                sample.files.fastqs.len(),
                image
            ));
        } else {
            output::failure(&format!(
                "{:<20} invalid  {}",
                sample.id,
                sample.problems().join(", ")
            ));
        }
    }
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_install(
    container: &ServiceContainer,
    dir: &Path,
    selected: &[Dependency],
) -> CliResult<i32> {
    if selected.is_empty() {
        output::warning("nothing selected, nothing to install");
        return Ok(exitcode::OK);
    }

    let installer = container.installer();
    installer.prepare(dir)?;
    for dependency in selected {
        output::info(&format!("Downloading {}...", dependency));
        let archive = installer.install(dir, *dependency)?;
        output::success_detail(&format!("{} ({})", dependency, archive.display()));
    }
    output::success(&format!("Installed into {}", dir.display()));
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_create_config(container: &ServiceContainer, file: &Path, force: bool) -> CliResult<i32> {
    container.pipelines().create(file, force)?;
    output::action(
        "Created",
        &format!("empty pipeline configuration `{}`", file.display()),
    );
    Ok(exitcode::OK)
}

fn cmd_completion(shell: clap_complete::Shell) -> CliResult<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(exitcode::OK)
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| ApplicationError::Config {
                message: "cannot determine the user config directory".into(),
            })?;
            if container.fs.exists(&path) && !force {
                return Err(ApplicationError::AlreadyExists(path).into());
            }
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) if container.fs.exists(&path) => {
                output::info(&format!("global: {}", path.display()))
            }
            Some(path) => output::info(&format!("global: {} (not found)", path.display())),
            None => output::warning("cannot determine the user config directory"),
        },
    }
    Ok(exitcode::OK)
}

/// Ask `[Y/n]` for each candidate, all questions first.
/// An empty answer or `y` means yes; end of input means no.
fn select_interactively(candidates: &[Dependency]) -> CliResult<Vec<Dependency>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock();
    let mut selected = Vec::new();
    for dependency in candidates {
        output::prompt(&format!("Download {} [Y/n]?", dependency));
        let mut answer = String::new();
        let read = lines
            .read_line(&mut answer)
            .map_err(|e| InfraError::io("read answer", e))?;
        if read > 0 && is_yes(&answer) {
            selected.push(*dependency);
        }
    }
    Ok(selected)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}
