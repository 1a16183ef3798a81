//! component-graph - Infer React component trees from source
//!
//! Scans a JavaScript/TypeScript project, finds function and arrow-function
//! components that render JSX, correlates imports with the tags each
//! component renders, and emits the tree rooted at a chosen component as
//! a Mermaid flowchart or JSON.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{
    AnalysisResult, Analyzer, ComponentId, ComponentRegistry, ComponentTree, Diagnostic,
    GraphReport, TreeBuilder, UsageResolver,
};
pub use config::{Config, OutputFormat, UsageScope};
pub use error::{Error, Result};
pub use output::GraphSerializer;
pub use parser::ParseCache;

/// Analyze `root` with default settings and return the Mermaid graph
pub fn analyze_project(root: &std::path::Path) -> Result<String> {
    let report = Analyzer::new(Config::default())?.run(root)?;
    Ok(GraphSerializer::new().to_mermaid(&report.tree))
}
