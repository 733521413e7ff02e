use clap::{Parser, Subcommand};
use covtree_core::{DisplayType, Direction, OrderingField};
use std::path::PathBuf;

use crate::render::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "covtree")]
#[command(about = "Browse a coverage report as a file/directory tree", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./Covtree.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Coverage report JSON (overrides `report_path` from the configuration)
    #[arg(short, long, global = true)]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List files and directories under a path
    Contents {
        /// Directory or file path (defaults to the repository root)
        #[arg(default_value = "")]
        path: String,

        /// Only count coverage recorded under this flag (repeatable)
        #[arg(short, long = "flag")]
        flags: Vec<String>,

        /// Case-insensitive substring filter; always lists files flat
        #[arg(short, long)]
        search: Option<String>,

        /// Display type: tree, list
        #[arg(short, long, default_value = "tree")]
        display: DisplayType,

        /// Sort by: name, coverage, hits, misses, partials, lines
        #[arg(long, default_value = "name")]
        order_by: OrderingField,

        /// Sort direction: asc, desc
        #[arg(long, default_value = "asc")]
        direction: Direction,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// List the flags present in the report, with how many sessions carry each
    Flags,
    /// Show totals for a single file
    File {
        path: String,

        /// Only count coverage recorded under this flag (repeatable)
        #[arg(short, long = "flag")]
        flags: Vec<String>,
    },
    /// Print configuration values
    PrintConfig,
}
