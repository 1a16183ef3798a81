use std::path::PathBuf;
use thiserror::Error;

/// Component graph error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Cannot read directory {path}: {message}")]
    DirectoryRead { path: PathBuf, message: String },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Root component not found: {root}")]
    RootNotFound { root: String },

    #[error("Cyclic component usage: {}", chain.join(" -> "))]
    CyclicUsage { chain: Vec<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for component graph operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create a parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a directory read error
    pub fn directory_read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::DirectoryRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a root-not-found error
    pub fn root_not_found(root: impl Into<String>) -> Self {
        Error::RootNotFound { root: root.into() }
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Stable reason code for machine consumers
    pub fn code(&self) -> &'static str {
        match self {
            Error::Io(_) => "io-error",
            Error::ConfigParse(_) => "config-parse",
            Error::ConfigValidation(_) => "config-invalid",
            Error::PathNotFound(_) => "path-not-found",
            Error::DirectoryRead { .. } => "directory-read",
            Error::Parse { .. } => "parse-error",
            Error::RootNotFound { .. } => "root-not-found",
            Error::CyclicUsage { .. } => "cyclic-usage",
            Error::Json(_) => "json-error",
            Error::GlobPattern(_) => "glob-pattern",
            Error::Parser(_) => "parser-error",
            Error::Other(_) => "other",
        }
    }
}
