//! CLI argument parsing

use crate::config::{OutputFormat, UsageScope};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Infer React component composition trees from a source tree
#[derive(Parser, Debug)]
#[command(name = "component-graph")]
#[command(about = "Infer React component composition trees from a source tree")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the component tree and print it as a graph
    Analyze {
        /// Project directory to analyze
        path: PathBuf,

        /// Root component name (default: App)
        #[arg(short, long)]
        root: Option<String>,

        /// Output format (mermaid, json)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Write the graph to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Max tree depth
        #[arg(long)]
        depth: Option<usize>,

        /// Where tag usages are collected (declaration, file)
        #[arg(long)]
        usage_scope: Option<UsageScope>,

        /// Scan files on the calling thread only
        #[arg(long)]
        sequential: bool,
    },

    /// List every detected component
    Components {
        /// Project directory to analyze
        path: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Show version information
    Version,
}
