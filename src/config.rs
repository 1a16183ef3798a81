use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "component-graph.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Component the tree is rooted at
    pub root_component: String,
    /// File extensions (without the dot) that are cataloged
    pub extensions: Vec<String>,
    /// Glob patterns, relative to the project root, that are skipped
    pub exclude: Vec<String>,
    pub usage_scope: UsageScope,
    pub max_depth: usize,
    pub parallel: bool,
    /// Reject files whose syntax tree contains error nodes
    pub strict_parse: bool,
}

/// Where JSX tag usages are collected when resolving a component's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UsageScope {
    /// Only tags inside the component's own declaration
    #[default]
    Declaration,
    /// Every tag in the defining file
    File,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub direction: String,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mermaid,
    Json,
}

const DIRECTIONS: [&str; 5] = ["TD", "TB", "LR", "RL", "BT"];

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            root_component: "App".to_string(),
            extensions: ["js", "jsx", "ts", "tsx"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            exclude: vec![],
            usage_scope: UsageScope::default(),
            max_depth: 64,
            parallel: true,
            strict_parse: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            direction: "TD".to_string(),
        }
    }
}

impl std::str::FromStr for UsageScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "declaration" | "decl" => Ok(Self::Declaration),
            "file" => Ok(Self::File),
            other => Err(Error::config_validation(format!(
                "unknown usage scope: {}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mermaid" | "mmd" => Ok(Self::Mermaid),
            "json" => Ok(Self::Json),
            other => Err(Error::config_validation(format!(
                "unknown output format: {}",
                other
            ))),
        }
    }
}

/// CLI overrides applied on top of a loaded config
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root: Option<String>,
    pub exclude: Vec<String>,
    pub format: Option<OutputFormat>,
    pub depth: Option<usize>,
    pub usage_scope: Option<UsageScope>,
    pub sequential: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) {
        if let Some(root) = cli.root {
            self.analysis.root_component = root;
        }

        if !cli.exclude.is_empty() {
            self.analysis.exclude.extend(cli.exclude);
        }

        if let Some(format) = cli.format {
            self.output.format = format;
        }

        if let Some(d) = cli.depth {
            self.analysis.max_depth = d;
        }

        if let Some(scope) = cli.usage_scope {
            self.analysis.usage_scope = scope;
        }

        if cli.sequential {
            self.analysis.parallel = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis.root_component.trim().is_empty() {
            return Err(Error::config_validation("root_component cannot be empty"));
        }

        if self.analysis.max_depth == 0 {
            return Err(Error::config_validation("max_depth must be at least 1"));
        }

        if self.analysis.max_depth > 1024 {
            return Err(Error::config_validation("max_depth cannot exceed 1024"));
        }

        if self.analysis.extensions.is_empty() {
            return Err(Error::config_validation("at least one extension required"));
        }

        for pattern in &self.analysis.exclude {
            glob::Pattern::new(pattern)?;
        }

        if !DIRECTIONS.contains(&self.output.direction.as_str()) {
            return Err(Error::config_validation(format!(
                "direction must be one of {}",
                DIRECTIONS.join(", ")
            )));
        }

        Ok(())
    }
}
