// Source file discovery

use crate::analysis::Diagnostic;
use crate::config::AnalysisConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Files found under a project root
#[derive(Debug, Default)]
pub struct Catalog {
    /// Matching files, sorted lexicographically
    pub files: Vec<PathBuf>,
    /// Directories that could not be listed
    pub diagnostics: Vec<Diagnostic>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Enumerates source files below a directory
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
}

impl SourceCatalog {
    /// Create a catalog for the given extensions (with or without the leading dot)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            exclude: Vec::new(),
        }
    }

    /// Build from analysis settings
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(&config.extensions).with_exclude(&config.exclude)
    }

    /// Skip paths matching any of these globs (relative to the scanned root)
    pub fn with_exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self.exclude.push(glob::Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Recursively scan `root`.
    ///
    /// Unreadable directories are reported and skipped; the rest of the tree
    /// is still scanned.
    pub fn scan(&self, root: &Path) -> Catalog {
        let mut catalog = Catalog::default();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path(), root));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    warn!("Error reading directory {}: {}", path.display(), e);
                    catalog.diagnostics.push(Diagnostic::DirectoryRead {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            if self.has_source_extension(entry.path()) {
                catalog.files.push(entry.into_path());
            }
        }

        catalog.files.sort();
        catalog
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.exclude.iter().any(|pattern| {
            pattern.matches_path(relative) || pattern.matches_path(&relative.join("_"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_scan_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App.tsx");
        touch(dir.path(), "index.js");
        touch(dir.path(), "styles.css");
        touch(dir.path(), "README.md");
        touch(dir.path(), "components/Header.jsx");
        touch(dir.path(), "components/util.ts");

        let catalog = SourceCatalog::new(&["js", "jsx", "ts", "tsx"]).scan(dir.path());
        let names: Vec<String> = catalog
            .files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            names,
            vec!["App.tsx", "components/Header.jsx", "components/util.ts", "index.js"]
        );
        assert!(catalog.diagnostics.is_empty());
    }

    #[test]
    fn test_scan_is_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["z.js", "a.js", "m/b.js", "b.js"] {
            touch(dir.path(), name);
        }
        let catalog = SourceCatalog::new(&[".js"]).scan(dir.path());
        let mut sorted = catalog.files.clone();
        sorted.sort();
        assert_eq!(catalog.files, sorted);
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/App.jsx");
        touch(dir.path(), "node_modules/react/index.js");
        touch(dir.path(), "src/App.test.jsx");

        let catalog = SourceCatalog::new(&["js", "jsx"])
            .with_exclude(&["node_modules/**", "**/*.test.jsx"])
            .unwrap()
            .scan(dir.path());

        assert_eq!(catalog.len(), 1);
        assert!(catalog.files[0].ends_with("src/App.jsx"));
    }

    #[test]
    fn test_missing_root_is_reported() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let catalog = SourceCatalog::new(&["js"]).scan(&missing);
        assert!(catalog.is_empty());
        assert_eq!(catalog.diagnostics.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App.js");
        touch(dir.path(), "locked/Hidden.js");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root can still list the directory; nothing to assert in that case
        let readable = fs::read_dir(&locked).is_ok();
        let catalog = SourceCatalog::new(&["js"]).scan(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert_eq!(catalog.len(), 1);
            assert_eq!(catalog.diagnostics.len(), 1);
        }
        assert!(catalog.files.iter().any(|p| p.ends_with("App.js")));
    }
}
