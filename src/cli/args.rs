//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::{AnnotationPolicy, EvolvesDepth, UnmatchedNodes};

/// Annotate creature records with evolution links and write one JSON file per record
#[derive(Parser, Debug)]
#[command(name = "dexlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory: holds dexlink.toml and anchors relative paths (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Without a subcommand, `annotate` runs with configured defaults
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate records and write one file per record
    Annotate(AnnotateArgs),

    /// Show the evolution forest, marking species missing from the records
    Tree {
        #[command(flatten)]
        inputs: InputArgs,
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

/// Input file overrides shared by several subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    /// Entity records (JSON array)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub entities: Option<PathBuf>,

    /// Evolution forest (JSON array)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub forest: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output directory (default depends on policy)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Annotation policy [possible values: evolves, lineage]
    #[arg(short, long)]
    pub policy: Option<AnnotationPolicy>,

    /// evolves policy depth [possible values: root-only, full-tree]
    #[arg(long)]
    pub evolves_depth: Option<EvolvesDepth>,

    /// lineage policy at unmatched species [possible values: skip-over, prune]
    #[arg(long)]
    pub unmatched_nodes: Option<UnmatchedNodes>,

    /// Annotate and list target files without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config instead of project-local
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
