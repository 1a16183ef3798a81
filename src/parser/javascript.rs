// JavaScript/TypeScript front end using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Supported JavaScript variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsVariant {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
}

impl JsVariant {
    /// Detect variant from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Detect variant from a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Check if this is a TypeScript variant
    pub fn is_typescript(&self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }
}

/// A source file with its content and syntax tree
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub variant: JsVariant,
    tree: Tree,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("variant", &self.variant)
            .field("bytes", &self.content.len())
            .finish()
    }
}

impl SourceFile {
    /// Root node of the syntax tree
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Whether the parser had to recover from syntax errors
    pub fn has_syntax_errors(&self) -> bool {
        self.root().has_error()
    }

    /// 1-based line of the first error or missing node
    pub fn first_error_line(&self) -> Option<usize> {
        let mut line = None;
        for_each_descendant(self.root(), |node| {
            if line.is_none() && (node.is_error() || node.is_missing()) {
                line = Some(node.start_position().row + 1);
            }
        });
        line
    }

    /// Top-level declarations, including those behind `export`
    pub fn declarations(&self) -> Vec<Declaration> {
        let source = self.content.as_bytes();
        let mut decls = Vec::new();
        let root = self.root();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            collect_declarations(&child, source, &mut decls);
        }
        decls
    }

    /// Import bindings in statement order
    pub fn imports(&self) -> Vec<ImportBinding> {
        let source = self.content.as_bytes();
        let root = self.root();
        let mut bindings = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "import_statement" {
                parse_import(&child, source, &mut bindings);
            }
        }
        bindings
    }

    /// Every JSX opening-tag identifier in the file, in document order
    pub fn jsx_tags(&self) -> Vec<String> {
        jsx_tags(self.root(), self.content.as_bytes())
    }
}

/// Parser for JavaScript/TypeScript source files
pub struct JavaScriptParser {
    js_parser: Parser,
    tsx_parser: Parser,
}

impl JavaScriptParser {
    /// Create a new JavaScript/TypeScript parser
    pub fn new() -> Result<Self> {
        let mut js_parser = Parser::new();
        let js_language = tree_sitter_javascript::language();
        js_parser
            .set_language(&js_language)
            .map_err(|e| Error::parser(format!("Failed to set JavaScript language: {}", e)))?;

        // TSX accepts both type annotations and JSX, so it covers .ts as well
        let mut tsx_parser = Parser::new();
        let tsx_language = tree_sitter_typescript::language_tsx();
        tsx_parser
            .set_language(&tsx_language)
            .map_err(|e| Error::parser(format!("Failed to set TSX language: {}", e)))?;

        Ok(Self {
            js_parser,
            tsx_parser,
        })
    }

    /// Read and parse a JavaScript/TypeScript file
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceFile> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        let variant = JsVariant::from_path(path).ok_or_else(|| {
            Error::parse(path, "unknown JavaScript extension")
        })?;

        self.parse_source(source, path.to_path_buf(), variant)
    }

    /// Parse JavaScript/TypeScript source code
    pub fn parse_source(
        &mut self,
        source: String,
        path: PathBuf,
        variant: JsVariant,
    ) -> Result<SourceFile> {
        let parser = if variant.is_typescript() {
            &mut self.tsx_parser
        } else {
            &mut self.js_parser
        };

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| Error::parse(&path, "parser returned no tree"))?;

        Ok(SourceFile {
            path,
            content: source,
            variant,
            tree,
        })
    }
}

/// Visit `node` and all of its descendants in document order
pub fn for_each_descendant<'t>(node: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = node.walk();
    'outer: loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'outer;
            }
            if !cursor.goto_parent() {
                break 'outer;
            }
        }
    }
}

/// Named JSX element; fragments (`<>...</>`) have no tag name and do not count
fn is_jsx_element(node: &Node) -> bool {
    match node.kind() {
        "jsx_self_closing_element" => true,
        "jsx_element" => node
            .child_by_field_name("open_tag")
            .or_else(|| node.named_child(0))
            .is_some_and(|open| open.child_by_field_name("name").is_some()),
        _ => false,
    }
}

/// Check whether a subtree contains at least one named JSX element
pub fn contains_jsx(node: Node<'_>) -> bool {
    let mut found = false;
    for_each_descendant(node, |n| {
        if !found && is_jsx_element(&n) {
            found = true;
        }
    });
    found
}

/// Opening-tag identifiers of every JSX element under `node`
///
/// Member (`<UI.Button>`) and namespaced (`<svg:rect>`) tag names are skipped;
/// only plain identifiers can match an imported binding.
pub fn jsx_tags(node: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut tags = Vec::new();
    for_each_descendant(node, |n| {
        if matches!(n.kind(), "jsx_opening_element" | "jsx_self_closing_element") {
            if let Some(name) = n.child_by_field_name("name") {
                if name.kind() == "identifier" {
                    tags.push(get_text(&name, source).to_string());
                }
            }
        }
    });
    tags
}

fn collect_declarations(node: &Node, source: &[u8], decls: &mut Vec<Declaration>) {
    match node.kind() {
        "function_declaration" => push_function(node, source, decls),
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let (Some(name), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name.kind() != "identifier" || value.kind() != "arrow_function" {
                    continue;
                }
                decls.push(Declaration {
                    name: get_text(&name, source).to_string(),
                    kind: DeclarationKind::ArrowFunction,
                    line: declarator.start_position().row + 1,
                    has_jsx: contains_jsx(declarator),
                    tags: jsx_tags(declarator, source),
                });
            }
        }
        "export_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                // `export default function App() {}` may surface as a named expression
                if matches!(child.kind(), "function_expression" | "function") {
                    if child.child_by_field_name("name").is_some() {
                        push_function(&child, source, decls);
                    }
                    continue;
                }
                collect_declarations(&child, source, decls);
            }
        }
        _ => {}
    }
}

fn push_function(node: &Node, source: &[u8], decls: &mut Vec<Declaration>) {
    if let Some(name) = node.child_by_field_name("name") {
        decls.push(Declaration {
            name: get_text(&name, source).to_string(),
            kind: DeclarationKind::Function,
            line: node.start_position().row + 1,
            has_jsx: contains_jsx(*node),
            tags: jsx_tags(*node, source),
        });
    }
}

/// Parse an import statement into its local bindings
fn parse_import(node: &Node, source: &[u8], bindings: &mut Vec<ImportBinding>) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let module = strip_quotes(get_text(&source_node, source));
    let line = node.start_position().row + 1;

    let mut push = |local: &str, imported: ImportedName| {
        bindings.push(ImportBinding {
            local: local.to_string(),
            imported,
            source: module.clone(),
            line,
        });
    };

    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        if clause.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = clause.walk();
        for part in clause.named_children(&mut clause_cursor) {
            match part.kind() {
                "identifier" => push(get_text(&part, source), ImportedName::Default),
                "namespace_import" => {
                    let mut ns_cursor = part.walk();
                    let local = part
                        .named_children(&mut ns_cursor)
                        .find(|n| n.kind() == "identifier");
                    if let Some(local) = local {
                        push(get_text(&local, source), ImportedName::Namespace);
                    }
                }
                "named_imports" => {
                    let mut named_cursor = part.walk();
                    for specifier in part.named_children(&mut named_cursor) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = specifier.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = strip_quotes(get_text(&name, source));
                        let local = specifier
                            .child_by_field_name("alias")
                            .map(|alias| get_text(&alias, source).to_string())
                            .unwrap_or_else(|| imported.clone());
                        push(&local, ImportedName::Named(imported));
                    }
                }
                _ => {}
            }
        }
    }
}

fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// Get text content of a node
fn get_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}
