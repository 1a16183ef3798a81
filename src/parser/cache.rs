// Parse cache shared by the analysis passes
//
// Each path is read and parsed at most once per run. Concurrent callers asking
// for the same path block on the same cell and observe the same result.

use crate::error::{Error, Result};
use crate::parser::{JavaScriptParser, SourceFile};
use dashmap::DashMap;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

type Slot = Arc<OnceLock<Option<Arc<SourceFile>>>>;

thread_local! {
    // Grammars are loaded once per worker thread and reused for every file it parses
    static PARSER: RefCell<Option<JavaScriptParser>> = const { RefCell::new(None) };
}

/// Memoizes file content and syntax trees keyed by absolute path
#[derive(Default)]
pub struct ParseCache {
    entries: DashMap<PathBuf, Slot>,
    failures: DashMap<PathBuf, String>,
    parses: AtomicUsize,
    strict: bool,
}

impl ParseCache {
    /// Create a cache that accepts trees with recovered syntax errors
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache that treats recovered syntax errors as parse failures
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Get the parsed file for `path`, reading and parsing it on first use.
    ///
    /// Returns `None` when the file cannot be read or parsed; the failure is
    /// logged once and remembered.
    pub fn get(&self, path: &Path) -> Option<Arc<SourceFile>> {
        let key = absolute(path);
        let slot = self.entries.entry(key.clone()).or_default().value().clone();
        slot.get_or_init(|| self.load(&key)).clone()
    }

    /// Number of files actually parsed so far
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Number of distinct paths requested so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files that failed to load, sorted by path
    pub fn failures(&self) -> Vec<(PathBuf, String)> {
        let mut failures: Vec<(PathBuf, String)> = self
            .failures
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        failures.sort();
        failures
    }

    fn load(&self, path: &Path) -> Option<Arc<SourceFile>> {
        match self.parse(path) {
            Ok(file) => {
                debug!(path = %path.display(), "parsed");
                Some(Arc::new(file))
            }
            Err(e) => {
                warn!("{}", e);
                let message = match e {
                    Error::Parse { message, .. } => message,
                    other => other.to_string(),
                };
                self.failures.insert(path.to_path_buf(), message);
                None
            }
        }
    }

    fn parse(&self, path: &Path) -> Result<SourceFile> {
        self.parses.fetch_add(1, Ordering::Relaxed);
        let file = PARSER.with(|cell| -> Result<SourceFile> {
            let mut slot = cell.borrow_mut();
            if slot.is_none() {
                *slot = Some(JavaScriptParser::new()?);
            }
            match slot.as_mut() {
                Some(parser) => parser.parse_file(path),
                None => Err(Error::parser("no parser available")),
            }
        })?;

        if self.strict && file.has_syntax_errors() {
            let line = file.first_error_line().unwrap_or(1);
            return Err(Error::parse(path, format!("syntax error near line {}", line)));
        }

        Ok(file)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
