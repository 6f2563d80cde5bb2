//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::AnnotateRequest;
use crate::cli::args::{AnnotateArgs, Cli, Commands, ConfigCommands, InputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::AnnotationPolicy;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::util::path::anchor;

/// Loaded settings and services for commands that read inputs.
struct Context {
    project_dir: Option<PathBuf>,
    container: ServiceContainer,
}

impl Context {
    fn load(cli: &Cli) -> CliResult<Self> {
        let settings = Settings::load(cli.project_dir.as_deref())?;
        debug!("settings: {:?}", settings);
        Ok(Self {
            project_dir: cli.project_dir.clone(),
            container: ServiceContainer::new(settings),
        })
    }

    /// Resolve a configured path against `-C`; flags are taken as given.
    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.project_dir {
            Some(dir) => anchor(dir, path),
            None => path.to_path_buf(),
        }
    }

    fn inputs(&self, inputs: &InputArgs) -> (PathBuf, PathBuf) {
        let settings = &self.container.settings;
        (
            inputs
                .entities
                .clone()
                .unwrap_or_else(|| self.resolve(&settings.entities_file)),
            inputs
                .forest
                .clone()
                .unwrap_or_else(|| self.resolve(&settings.forest_file)),
        )
    }
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Tree { inputs }) => cmd_tree(&Context::load(cli)?, inputs),
        Some(Commands::Annotate(args)) => cmd_annotate(&Context::load(cli)?, args),
        None => cmd_annotate(&Context::load(cli)?, &AnnotateArgs::default()),
    }
}

/// Build the run request: configured values overridden by flags.
fn build_request(ctx: &Context, args: &AnnotateArgs) -> CliResult<AnnotateRequest> {
    let settings = &ctx.container.settings;
    let policy = args.policy.unwrap_or(settings.policy);

    if args.evolves_depth.is_some() && policy != AnnotationPolicy::Evolves {
        return Err(CliError::InvalidArgs(format!(
            "--evolves-depth only applies to the evolves policy (active: {policy})"
        )));
    }
    if args.unmatched_nodes.is_some() && policy != AnnotationPolicy::Lineage {
        return Err(CliError::InvalidArgs(format!(
            "--unmatched-nodes only applies to the lineage policy (active: {policy})"
        )));
    }

    let (entities_file, forest_file) = ctx.inputs(&args.inputs);
    let mut request = AnnotateRequest::from_settings(settings);
    request.entities_file = entities_file;
    request.forest_file = forest_file;
    request.policy = policy;
    request.output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| ctx.resolve(&settings.output_dir_for(policy)));
    if let Some(depth) = args.evolves_depth {
        request.options.evolves_depth = depth;
    }
    if let Some(unmatched) = args.unmatched_nodes {
        request.options.unmatched_nodes = unmatched;
    }
    request.dry_run = args.dry_run;
    Ok(request)
}

#[instrument(skip(ctx))]
fn cmd_annotate(ctx: &Context, args: &AnnotateArgs) -> CliResult<()> {
    let request = build_request(ctx, args)?;
    debug!("request: {:?}", request);

    let report = ctx.container.annotation.run(&request, |path| {
        output::action("Created file", &path.display());
    })?;

    if report.summary.annotated == 0 && report.summary.unmatched > 0 {
        output::warning("no species in the evolution forest matched an entity record");
    }

    if report.dry_run {
        output::header(&format!(
            "Dry run ({}): {} file(s) would be written to {}",
            request.policy,
            report.files.len(),
            report.output_dir.display()
        ));
        if !ctx.container.fs.is_dir(&report.output_dir) {
            output::detail(&format!("{} would be created", report.output_dir.display()));
        }
        for file in &report.files {
            output::detail(&file.display());
        }
        output::info(&format!(
            "{} annotated, {} unmatched species skipped",
            report.summary.annotated, report.summary.unmatched
        ));
    }
    Ok(())
}

#[instrument(skip(ctx))]
fn cmd_tree(ctx: &Context, inputs: &InputArgs) -> CliResult<()> {
    let (entities_file, forest_file) = ctx.inputs(inputs);
    let trees = ctx.container.annotation.render(&entities_file, &forest_file)?;
    for tree in trees {
        output::info(&tree);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let project_dir = cli.project_dir.as_deref().unwrap_or(Path::new("."));
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let fs = RealFileSystem;
            let mark = |path: &Path| if fs.exists(path) { "" } else { " (not found)" };
            match global_config_path() {
                Some(global) => output::action("global", &format!("{}{}", global.display(), mark(&global))),
                None => output::action("global", "unavailable (no home directory)"),
            }
            let local = local_config_path(project_dir);
            output::action("local", &format!("{}{}", local.display(), mark(&local)));
        }
        ConfigCommands::Init { global, force } => {
            let target = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))?
            } else {
                local_config_path(project_dir)
            };
            init_config(&RealFileSystem, &target, *force)?;
            output::success(&format!("Created {}", target.display()));
        }
    }
    Ok(())
}

/// Write the commented template to `target`.
fn init_config(fs: &dyn FileSystem, target: &Path, force: bool) -> CliResult<()> {
    if fs.exists(target) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            target.display()
        )));
    }
    fs.ensure_parent(target)
        .map_err(|e| InfraError::io(format!("create directory for {}", target.display()), e))?;
    fs.write(target, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", target.display()), e))?;
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
