//! CLI module for component-graph

mod args;

pub use args::{Args, Command};

use crate::analysis::{Analyzer, GraphReport};
use crate::config::{CliOverrides, Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::logging::init_logger;
use crate::output::GraphSerializer;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logger(args.verbose, args.quiet);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Process exit status for a failed command
pub fn exit_status(err: &Error) -> u8 {
    match err {
        Error::RootNotFound { .. } => 2,
        _ => 1,
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            root,
            format,
            output,
            config,
            exclude,
            depth,
            usage_scope,
            sequential,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(CliOverrides {
                root,
                exclude,
                format,
                depth,
                usage_scope,
                sequential,
            });

            debug!(
                path = %path.display(),
                root = %cfg.analysis.root_component,
                format = ?cfg.output.format,
                depth = cfg.analysis.max_depth,
                scope = ?cfg.analysis.usage_scope,
                "analyze"
            );

            let analyzer = Analyzer::new(cfg)?.with_progress(args.verbose);
            let report = analyzer.run(&path)?;
            summarize(&report);

            let output_cfg = &analyzer.config().output;
            let text = GraphSerializer::from(output_cfg).render(
                &report.tree,
                output_cfg.format,
                Some(&report.analysis.root),
            )?;

            match output {
                Some(file) => {
                    fs::write(&file, &text)?;
                    info!("graph written to {}", file.display());
                }
                None => print!("{}", text),
            }
            Ok(())
        }

        Command::Components {
            path,
            config,
            exclude,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(CliOverrides {
                exclude,
                ..Default::default()
            });

            let analysis = Analyzer::new(cfg)?.analyze(&path)?;
            for definition in analysis.registry.definitions() {
                let marker = if analysis.registry.is_shadowed(&definition.id) {
                    "\t(shadowed)"
                } else {
                    ""
                };
                println!(
                    "{}\t{}{}",
                    definition.name(),
                    analysis.relative(definition.file()).display(),
                    marker
                );
            }
            Ok(())
        }

        Command::Version => {
            println!("component-graph {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    Config::load_or_default(&path)
}

fn summarize(report: &GraphReport) {
    for diagnostic in report.diagnostics() {
        let code = Error::from(diagnostic.clone()).code();
        debug!(code, "{}", diagnostic);
    }

    let graph = report.analysis.usage_graph();
    for cycle in graph.cycles() {
        let names: Vec<&str> = cycle.iter().map(|id| id.name.as_str()).collect();
        info!("cyclic component usage: {}", names.join(", "));
    }
    let unreachable = graph.unreachable_from(&report.tree.root);
    if !unreachable.is_empty() {
        let names: Vec<&str> = unreachable.iter().map(|id| id.name.as_str()).collect();
        info!(
            count = unreachable.len(),
            "not reachable from {}: {}",
            report.tree.root_name(),
            names.join(", ")
        );
    }

    for (name, ids) in report.analysis.registry.collisions() {
        debug!(definitions = ids.len(), "name collision: {}", name);
    }
}
