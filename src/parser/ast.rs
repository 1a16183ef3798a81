// Facts extracted from a parsed JavaScript/TypeScript file
//
// These are the only pieces of the syntax tree the analysis stages look at.

use serde::Serialize;

/// Shape of a top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// `function Name() {}`
    Function,
    /// `const Name = () => {}`
    ArrowFunction,
}

/// A top-level function or arrow-function binding
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// 1-based line of the declaration
    pub line: usize,
    /// Whether a named JSX element appears anywhere in the declaration
    pub has_jsx: bool,
    /// JSX opening-tag identifiers inside the declaration, in document order
    pub tags: Vec<String>,
}

impl Declaration {
    /// Heuristic component check: a declaration that builds JSX somewhere
    pub fn is_component(&self) -> bool {
        self.has_jsx
    }
}

/// What an import binding refers to in the source module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    /// `import Local from "..."`
    Default,
    /// `import * as Local from "..."`
    Namespace,
    /// `import { Name }` or `import { Name as Local }`
    Named(String),
}

/// A local name introduced by an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name bound in the importing file
    pub local: String,
    pub imported: ImportedName,
    /// Module specifier as written
    pub source: String,
    pub line: usize,
}

impl ImportBinding {
    /// Name the binding is expected to carry in its defining file
    pub fn lookup_name(&self) -> &str {
        match &self.imported {
            ImportedName::Named(name) => name,
            ImportedName::Default | ImportedName::Namespace => &self.local,
        }
    }

    /// Whether the specifier is relative to the importing file
    pub fn is_relative(&self) -> bool {
        self.source.starts_with("./") || self.source.starts_with("../") || self.source == "."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(local: &str, imported: ImportedName, source: &str) -> ImportBinding {
        ImportBinding {
            local: local.to_string(),
            imported,
            source: source.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_lookup_name() {
        assert_eq!(binding("Header", ImportedName::Default, "./Header").lookup_name(), "Header");
        assert_eq!(
            binding("TopBar", ImportedName::Named("Header".into()), "./Header").lookup_name(),
            "Header"
        );
        assert_eq!(binding("UI", ImportedName::Namespace, "./ui").lookup_name(), "UI");
    }

    #[test]
    fn test_is_relative() {
        assert!(binding("A", ImportedName::Default, "./A").is_relative());
        assert!(binding("A", ImportedName::Default, "../A").is_relative());
        assert!(!binding("A", ImportedName::Default, "react").is_relative());
        assert!(!binding("A", ImportedName::Default, "@/components/A").is_relative());
    }
}
