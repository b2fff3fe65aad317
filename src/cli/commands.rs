//! Command dispatch: load the tree, run one operation, persist if it changed.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use tracing::{debug, instrument};

use crate::application::services::{AggregationMode, StatusService};
use crate::cli::args::{AddKind, Cli, Commands, ConfigCommands, DefaultCommands, JobCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    LeafKind, Outcome, TreeNodeConvert, ViewId, ViewNode, ViewTemplate, WorkItem,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::SourceError;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    // Commands that do not need the tree
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config { command } => return cmd_config(command, &local_dir(cli)?),
        _ => {}
    }

    let settings = Settings::load(Some(&local_dir(cli)?))?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings)?;

    match command {
        Commands::Tree { path, status } => cmd_tree(&container, path, *status),
        Commands::Status { path, strict } => cmd_status(&container, path, *strict),
        Commands::Add { parent, name, kind } => cmd_add(&container, parent, name, kind),
        Commands::Remove { path } => cmd_remove(&container, path),
        Commands::Rename { path, new_name } => cmd_rename(&container, path, new_name),
        Commands::Move { path, new_parent } => cmd_move(&container, path, new_parent),
        Commands::CheckName {
            parent,
            name,
            current,
        } => cmd_check_name(&container, parent, name.as_deref(), current.as_deref()),
        Commands::Default { command } => cmd_default(&container, command),
        Commands::Describe { path } => cmd_describe(&container, path),
        Commands::Replace { path, file } => cmd_replace(&container, path, file),
        Commands::Import { parent, file } => cmd_import(&container, parent, file),
        Commands::Job { command } => cmd_job(&container, command),
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn local_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e))),
    }
}

/// Split `a/b/c` into owner path `a/b` and name `c`.
fn split_path(path: &str) -> CliResult<(&str, &str)> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(CliError::InvalidArgs("the root view has no owner".to_string()));
    }
    Ok(match trimmed.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", trimmed),
    })
}

fn resolve(container: &ServiceContainer, path: &str) -> CliResult<ViewId> {
    Ok(container.views.resolve_path(path)?)
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

fn read_document(container: &ServiceContainer, file: &Path) -> CliResult<String> {
    container
        .fs
        .read_to_string(file)
        .map_err(|e| CliError::Infra(InfraError::io(format!("read {}", file.display()), e)))
}

fn outcome_label(outcome: Option<Outcome>) -> String {
    match outcome {
        Some(Outcome::Success) => "success".green().to_string(),
        Some(Outcome::Unstable) => "unstable".yellow().to_string(),
        Some(Outcome::Failure) => "failure".red().to_string(),
        Some(Outcome::Aborted) => "aborted".dimmed().to_string(),
        None => "-".dimmed().to_string(),
    }
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, path: &str, with_status: bool) -> CliResult<()> {
    let id = resolve(container, path)?;

    let statuses: HashMap<ViewId, Option<Outcome>> = if with_status {
        let ids: Vec<ViewId> = container
            .ctx
            .with_tree(|tree| tree.iter_from(id).map(|(v, _)| v).collect())?;
        ids.into_iter()
            .map(|v| -> CliResult<(ViewId, Option<Outcome>)> {
                Ok((v, container.status.worst_result(v)?))
            })
            .collect::<CliResult<_>>()?
    } else {
        HashMap::new()
    };

    let rendered = container.ctx.with_tree(|tree| {
        tree.to_tree_with(id, &|view: ViewId, node: &ViewNode| match statuses.get(&view) {
            Some(worst) => format!("{} {}", node, outcome_label(*worst)),
            None => node.to_string(),
        })
    })?;
    output::info(&rendered);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_status(container: &ServiceContainer, path: &str, strict: bool) -> CliResult<()> {
    let id = resolve(container, path)?;
    let report = if strict {
        StatusService::with_mode(
            container.ctx.clone(),
            container.catalog.clone(),
            AggregationMode::Strict,
        )
        .status_report(id)?
    } else {
        container.status.status_report(id)?
    };

    output::header(&format!("{}: {}", display_path(path), outcome_label(report.worst)));
    for leaf in &report.leaves {
        match &leaf.error {
            Some(err) => output::failure(&format!("{}: {}", leaf.path, err)),
            None => output::detail(&format!("{}: {}", leaf.path, outcome_label(leaf.worst))),
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_add(container: &ServiceContainer, parent: &str, name: &str, kind: &AddKind) -> CliResult<()> {
    let parent_id = resolve(container, parent)?;
    let template = match kind {
        AddKind::Nested { default_view } => ViewTemplate::Nested {
            default_view: default_view.clone(),
        },
        AddKind::List { include, jobs } => {
            let jobs: Vec<&str> = jobs.iter().map(String::as_str).collect();
            ViewTemplate::Leaf(LeafKind::list(include.as_deref(), &jobs))
        }
        AddKind::All => ViewTemplate::Leaf(LeafKind::All),
    };
    container.views.add_view(parent_id, name, template)?;
    container.save_tree()?;
    output::action("Added", &name);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_remove(container: &ServiceContainer, path: &str) -> CliResult<()> {
    let (parent, name) = split_path(path)?;
    let parent_id = resolve(container, parent)?;
    if container.views.remove_view(parent_id, name)? {
        container.save_tree()?;
        output::action("Removed", &path);
    } else {
        output::warning(&format!("no view at {path}"));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_rename(container: &ServiceContainer, path: &str, new_name: &str) -> CliResult<()> {
    let (parent, name) = split_path(path)?;
    let parent_id = resolve(container, parent)?;
    container.views.rename_view(parent_id, name, new_name)?;
    container.save_tree()?;
    output::action("Renamed", &format!("{name} -> {new_name}"));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_move(container: &ServiceContainer, path: &str, new_parent: &str) -> CliResult<()> {
    let id = resolve(container, path)?;
    let parent_id = resolve(container, new_parent)?;
    container.views.move_view(id, parent_id)?;
    container.save_tree()?;
    output::action("Moved", &format!("{} -> {}", path, display_path(new_parent)));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_check_name(
    container: &ServiceContainer,
    parent: &str,
    name: Option<&str>,
    current: Option<&str>,
) -> CliResult<()> {
    let parent_id = resolve(container, parent)?;
    let validation = container.views.check_name_available(parent_id, name, current)?;
    if validation.is_ok() {
        output::success("name is available");
        Ok(())
    } else {
        Err(CliError::Usage(validation.message.unwrap_or_default()))
    }
}

#[instrument(skip(container))]
fn cmd_default(container: &ServiceContainer, command: &DefaultCommands) -> CliResult<()> {
    match command {
        DefaultCommands::Show { path } => {
            let id = resolve(container, path)?;
            let summary = container.views.summary(id)?;
            let resolved = container
                .views
                .resolve_default(id)?
                .map(|child| container.views.summary(child))
                .transpose()?;
            output::info(&format!(
                "configured: {}",
                summary.default_view.as_deref().unwrap_or("-")
            ));
            output::info(&format!(
                "resolved:   {}",
                resolved.map(|s| s.name).unwrap_or_else(|| "-".to_string())
            ));
        }
        DefaultCommands::Set { path, name } => {
            let id = resolve(container, path)?;
            container.views.set_default_view(id, name.as_deref())?;
            container.save_tree()?;
            match name {
                Some(name) if !name.trim().is_empty() => output::action("Default", name),
                _ => output::action("Default", "cleared"),
            }
        }
        DefaultCommands::Candidates { path } => {
            let id = resolve(container, path)?;
            for option in container.views.default_candidates(id)? {
                output::info(&option.label);
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_describe(container: &ServiceContainer, path: &str) -> CliResult<()> {
    let id = resolve(container, path)?;
    print!("{}", container.views.describe(id)?);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_replace(container: &ServiceContainer, path: &str, file: &Path) -> CliResult<()> {
    let id = resolve(container, path)?;
    let document = read_document(container, file)?;
    container.views.replace_from_description(id, &document)?;
    container.save_tree()?;
    output::action("Replaced", &display_path(path));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_import(container: &ServiceContainer, parent: &str, file: &Path) -> CliResult<()> {
    let parent_id = resolve(container, parent)?;
    let document = read_document(container, file)?;
    let id = container.views.add_description(parent_id, &document)?;
    container.save_tree()?;
    output::action("Imported", &container.views.summary(id)?.path);
    Ok(())
}

#[instrument(skip(container))]
fn cmd_job(container: &ServiceContainer, command: &JobCommands) -> CliResult<()> {
    let catalog = Arc::clone(&container.catalog);
    let to_cli = |e: SourceError| CliError::from(crate::application::ApplicationError::from(e));
    match command {
        JobCommands::List => {
            for job in catalog.snapshot().map_err(to_cli)? {
                let state = if job.disabled {
                    "disabled".dimmed().to_string()
                } else {
                    outcome_label(job.last_outcome)
                };
                output::info(&format!("{} {}", job.name, state));
            }
            return Ok(());
        }
        JobCommands::Add {
            name,
            outcome,
            disabled,
        } => {
            let mut item = WorkItem::new(name);
            item.last_outcome = *outcome;
            if *disabled {
                item = item.disabled();
            }
            catalog.upsert(item).map_err(to_cli)?;
            output::action("Registered", name);
        }
        JobCommands::Record { name, outcome } => {
            catalog.record_outcome(name, *outcome).map_err(to_cli)?;
            output::action("Recorded", &format!("{name} {outcome}"));
        }
        JobCommands::Disable { name } => {
            catalog.set_disabled(name, true).map_err(to_cli)?;
            output::action("Disabled", name);
        }
        JobCommands::Enable { name } => {
            catalog.set_disabled(name, false).map_err(to_cli)?;
            output::action("Enabled", name);
        }
    }
    container.save_catalog()?;
    Ok(())
}

fn cmd_config(command: &ConfigCommands, dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(dir))?;
            print!("{}", settings.to_toml()?);
        }
        ConfigCommands::Template => print!("{}", Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no home directory)"),
            }
            output::info(&format!("local:  {}", local_config_path(dir).display()));
        }
    }
    Ok(())
}
