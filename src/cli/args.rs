//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::Outcome;

/// Hierarchical view organizer: nest job views, resolve defaults, roll up status
#[derive(Parser, Debug)]
#[command(name = "nestview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (multiple -d increase the level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory searched for a local .nestview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the view tree
    Tree {
        /// View path (default: root)
        #[arg(default_value = "")]
        path: String,
        /// Annotate each view with its status
        #[arg(short, long)]
        status: bool,
    },

    /// Show the worst outcome of a view and where it comes from
    Status {
        /// View path (default: root)
        #[arg(default_value = "")]
        path: String,
        /// Fail if any job source errors
        #[arg(long)]
        strict: bool,
    },

    /// Add a view
    Add {
        /// Path of the nested view receiving the new view
        parent: String,
        /// Name of the new view
        name: String,
        #[command(subcommand)]
        kind: AddKind,
    },

    /// Remove a view and everything below it
    Remove {
        /// View path
        path: String,
    },

    /// Rename a view
    Rename {
        /// View path
        path: String,
        /// New name
        new_name: String,
    },

    /// Move a view under another nested view
    Move {
        /// View path
        path: String,
        /// Path of the new owner
        new_parent: String,
    },

    /// Check whether a name is free in a nested view
    #[command(name = "check-name")]
    CheckName {
        /// Path of the nested view
        parent: String,
        /// Candidate name
        name: Option<String>,
        /// Name the view currently has (rename form)
        #[arg(long)]
        current: Option<String>,
    },

    /// Inspect or change the default view of a nested view
    Default {
        #[command(subcommand)]
        command: DefaultCommands,
    },

    /// Print the configuration document of a view
    Describe {
        /// View path (default: root)
        #[arg(default_value = "")]
        path: String,
    },

    /// Replace a view's configuration from a document
    Replace {
        /// View path
        path: String,
        /// Document to apply
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Create views from a document
    Import {
        /// Path of the nested view receiving the new view
        parent: String,
        /// Document to import
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage the job catalog
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Kind of view created by `add`
#[derive(Subcommand, Debug)]
pub enum AddKind {
    /// Container of other views
    Nested {
        /// Child shown when the view is opened
        #[arg(long)]
        default_view: Option<String>,
    },
    /// Jobs selected by name and pattern
    List {
        /// Pattern a whole job name must match
        #[arg(short, long)]
        include: Option<String>,
        /// Job names
        jobs: Vec<String>,
    },
    /// Every job
    All,
}

#[derive(Subcommand, Debug)]
pub enum DefaultCommands {
    /// Show the configured and resolved default view
    Show {
        /// Path of the nested view
        #[arg(default_value = "")]
        path: String,
    },
    /// Set the default view (omit the name to clear it)
    Set {
        /// Path of the nested view
        path: String,
        /// Child name
        name: Option<String>,
    },
    /// List the names selectable as default view
    Candidates {
        /// Path of the nested view
        #[arg(default_value = "")]
        path: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// List jobs
    List,
    /// Register a job
    Add {
        name: String,
        /// Last outcome
        #[arg(short, long)]
        outcome: Option<Outcome>,
        /// Register as disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Record the outcome of a finished run
    Record { name: String, outcome: Outcome },
    /// Disable a job
    Disable { name: String },
    /// Enable a job
    Enable { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_add_list_when_parsing_then_collects_jobs() {
        let cli = Cli::try_parse_from([
            "nestview", "add", "team", "builds", "list", "-i", "build-.*", "deploy",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add {
                parent,
                name,
                kind: AddKind::List { include, jobs },
            }) => {
                assert_eq!(parent, "team");
                assert_eq!(name, "builds");
                assert_eq!(include.as_deref(), Some("build-.*"));
                assert_eq!(jobs, vec!["deploy".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_record_when_parsing_then_outcome_is_case_insensitive() {
        let cli = Cli::try_parse_from(["nestview", "job", "record", "nightly", "FAILURE"]).unwrap();

        match cli.command {
            Some(Commands::Job {
                command: JobCommands::Record { outcome, .. },
            }) => assert_eq!(outcome, Outcome::Failure),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_debug_flags_when_parsing_then_counts() {
        let cli = Cli::try_parse_from(["nestview", "-dd", "tree"]).unwrap();
        assert_eq!(cli.debug, 2);
    }
}
