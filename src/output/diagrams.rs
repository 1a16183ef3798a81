// Graph serialization
//
// Renders a component tree as Mermaid flowchart text or as JSON.

use crate::analysis::ComponentTree;
use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Turns a [`ComponentTree`] into text for a rendering consumer
pub struct GraphSerializer {
    /// Layout direction (TD, TB, LR, RL, BT)
    direction: String,
}

#[derive(Serialize)]
struct JsonTree<'a> {
    root: &'a str,
    root_file: String,
    nodes: Vec<JsonNode<'a>>,
}

#[derive(Serialize)]
struct JsonNode<'a> {
    id: String,
    name: &'a str,
    parent: String,
    file: String,
    depth: usize,
}

impl GraphSerializer {
    pub fn new() -> Self {
        Self {
            direction: "TD".to_string(),
        }
    }

    pub fn with_direction(mut self, dir: &str) -> Self {
        self.direction = dir.to_string();
        self
    }

    /// Render in the configured format
    pub fn render(&self, tree: &ComponentTree, format: OutputFormat, base: Option<&Path>) -> Result<String> {
        match format {
            OutputFormat::Mermaid => Ok(self.to_mermaid(tree)),
            OutputFormat::Json => self.to_json(tree, base),
        }
    }

    /// Header line followed by one `parent ==> id[label];` line per edge
    pub fn to_mermaid(&self, tree: &ComponentTree) -> String {
        let mut out = format!("graph {};\n", self.direction);
        for edge in tree.edges() {
            out.push_str(&format!(
                "    {} ==> {}[{}];\n",
                sanitize_id(&edge.parent_ref),
                edge.child_id,
                escape_label(&edge.child_name)
            ));
        }
        out
    }

    /// Pretty-printed JSON; file paths are made relative to `base` when given
    pub fn to_json(&self, tree: &ComponentTree, base: Option<&Path>) -> Result<String> {
        let display = |path: &Path| -> String {
            base.and_then(|b| path.strip_prefix(b).ok())
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/")
        };

        let nodes = tree
            .nodes()
            .iter()
            .map(|node| JsonNode {
                id: node.id.to_string(),
                name: node.name(),
                parent: tree.parent_ref(node),
                file: display(&node.component.file),
                depth: node.depth,
            })
            .collect();

        let json = JsonTree {
            root: tree.root_name(),
            root_file: display(&tree.root.file),
            nodes,
        };
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

impl Default for GraphSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&OutputConfig> for GraphSerializer {
    fn from(config: &OutputConfig) -> Self {
        Self::new().with_direction(&config.direction)
    }
}

/// Recover `(parent, id, label)` triples from Mermaid text produced by
/// [`GraphSerializer::to_mermaid`]
pub fn parse_mermaid_edges(text: &str) -> Vec<(String, String, String)> {
    text.lines()
        .skip(1)
        .filter_map(|line| {
            let line = line.trim().trim_end_matches(';');
            let (parent, rest) = line.split_once(" ==> ")?;
            let (id, label) = rest.split_once('[')?;
            Some((
                parent.to_string(),
                id.to_string(),
                label.trim_end_matches(']').to_string(),
            ))
        })
        .collect()
}

/// Sanitize a string for use as a Mermaid node ID
fn sanitize_id(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn escape_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '[' | ']' | ';' | '"'))
        .collect()
}
