// Analysis pipeline: catalog -> parse -> components -> usages -> tree

pub mod catalog;
pub mod registry;
pub mod tree;
pub mod usage;

pub use catalog::*;
pub use registry::*;
pub use tree::*;
pub use usage::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::ParseCache;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// A non-fatal problem found during analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A directory could not be listed; its subtree was skipped
    DirectoryRead { path: PathBuf, message: String },
    /// A file could not be read or parsed; it contributes nothing
    Parse { path: PathBuf, message: String },
    /// A component already on the current path was not expanded again
    CyclicUsage { chain: Vec<String> },
    /// Expansion stopped at the configured depth
    DepthLimit { component: String, depth: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DirectoryRead { path, message } => {
                write!(f, "cannot read directory {}: {}", path.display(), message)
            }
            Diagnostic::Parse { path, message } => {
                write!(f, "cannot parse {}: {}", path.display(), message)
            }
            Diagnostic::CyclicUsage { chain } => {
                write!(f, "cyclic usage truncated: {}", chain.join(" -> "))
            }
            Diagnostic::DepthLimit { component, depth } => {
                write!(f, "depth limit {} reached at {}", depth, component)
            }
        }
    }
}

impl From<Diagnostic> for Error {
    fn from(diagnostic: Diagnostic) -> Self {
        match diagnostic {
            Diagnostic::DirectoryRead { path, message } => Error::directory_read(path, message),
            Diagnostic::Parse { path, message } => Error::parse(path, message),
            Diagnostic::CyclicUsage { chain } => Error::CyclicUsage { chain },
            other @ Diagnostic::DepthLimit { .. } => Error::Other(other.to_string()),
        }
    }
}

/// Result of analyzing a project, before a tree is built
#[derive(Debug)]
pub struct AnalysisResult {
    /// Canonical project root
    pub root: PathBuf,
    /// Cataloged files, sorted
    pub files: Vec<PathBuf>,
    pub registry: ComponentRegistry,
    pub adjacency: Adjacency,
    /// Directory and parse problems
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    /// Whole-project usage graph
    pub fn usage_graph(&self) -> UsageGraph {
        UsageGraph::build(&self.registry, &self.adjacency)
    }

    /// Build the component tree rooted at `root_name`
    pub fn tree(&self, root_name: &str, max_depth: usize) -> Result<ComponentTree> {
        TreeBuilder::new(&self.registry, &self.adjacency)
            .with_max_depth(max_depth)
            .build(root_name)
    }

    /// Path relative to the project root, for display
    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// A finished analysis together with its tree
#[derive(Debug)]
pub struct GraphReport {
    pub analysis: AnalysisResult,
    pub tree: ComponentTree,
}

impl GraphReport {
    /// Analysis and tree diagnostics combined
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.analysis
            .diagnostics
            .iter()
            .chain(self.tree.diagnostics.iter())
            .collect()
    }
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    progress: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: false,
        })
    }

    /// Show a progress bar while parsing
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover source files under `root`
    pub fn catalog(&self, root: &Path) -> Result<Catalog> {
        let root = canonical_root(root)?;
        Ok(SourceCatalog::from_config(&self.config.analysis)?.scan(&root))
    }

    /// Run every stage up to usage resolution
    pub fn analyze(&self, root: &Path) -> Result<AnalysisResult> {
        let settings = &self.config.analysis;
        let root = canonical_root(root)?;

        // Step 1: Discover source files
        let catalog = SourceCatalog::from_config(settings)?.scan(&root);
        info!(files = catalog.len(), "cataloged {}", root.display());

        // Step 2: Parse every file once
        let cache = if settings.strict_parse {
            ParseCache::strict()
        } else {
            ParseCache::new()
        };
        self.parse_all(&catalog.files, &cache);

        // Step 3: Find component definitions
        let registry = ComponentRegistry::discover(&catalog.files, &cache, settings.parallel);
        info!(components = registry.len(), "components discovered");

        // Step 4: Correlate imports with JSX usages
        let adjacency = UsageResolver::new(&registry, &cache, &catalog.files)
            .with_scope(settings.usage_scope)
            .with_extensions(&settings.extensions)
            .resolve(settings.parallel);

        let mut diagnostics = catalog.diagnostics;
        diagnostics.extend(
            cache
                .failures()
                .into_iter()
                .map(|(path, message)| Diagnostic::Parse { path, message }),
        );

        Ok(AnalysisResult {
            root,
            files: catalog.files,
            registry,
            adjacency,
            diagnostics,
        })
    }

    /// Analyze and build the tree for the configured root component.
    ///
    /// Fails with [`Error::RootNotFound`] when the root is not a component.
    pub fn run(&self, root: &Path) -> Result<GraphReport> {
        let analysis = self.analyze(root)?;
        let tree = analysis.tree(
            &self.config.analysis.root_component,
            self.config.analysis.max_depth,
        )?;
        info!(nodes = tree.len(), root = tree.root_name(), "tree built");
        Ok(GraphReport { analysis, tree })
    }

    fn parse_all(&self, files: &[PathBuf], cache: &ParseCache) {
        let progress = if self.progress {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let parse = |path: &PathBuf| {
            cache.get(path);
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        };

        if self.config.analysis.parallel {
            files.par_iter().for_each(parse);
        } else {
            files.iter().for_each(parse);
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Parsing complete");
        }
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(Error::PathNotFound(root.to_path_buf()));
    }
    Ok(root.canonicalize()?)
}
