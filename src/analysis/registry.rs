// Component definition discovery
//
// A component is a top-level function declaration or arrow-function binding
// whose subtree contains a JSX element. This is a heuristic: class components
// and higher-order wrapped components are not recognised, and a plain helper
// that happens to build JSX is.

use crate::parser::{DeclarationKind, ParseCache};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Primary key of a component: where it is defined and under which name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId {
    pub file: PathBuf,
    pub name: String,
}

impl ComponentId {
    pub fn new(file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.file.display())
    }
}

/// A registered component definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentDefinition {
    pub id: ComponentId,
    pub kind: DeclarationKind,
    pub line: usize,
}

impl ComponentDefinition {
    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn file(&self) -> &Path {
        &self.id.file
    }
}

/// All component definitions of a project.
///
/// Definitions are keyed by `(file, name)`. A separate display index maps a
/// bare name to one definition; when several files define the same name, the
/// one registered last wins. Registration follows the sorted catalog order, so
/// the winner does not depend on scheduling.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    definitions: Vec<ComponentDefinition>,
    by_id: HashMap<ComponentId, usize>,
    by_name: HashMap<String, usize>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the top-level declarations of every file.
    ///
    /// Files that fail to parse contribute nothing.
    pub fn discover(files: &[PathBuf], cache: &ParseCache, parallel: bool) -> Self {
        let scan = |path: &PathBuf| -> Vec<ComponentDefinition> {
            let Some(source) = cache.get(path) else {
                return Vec::new();
            };
            source
                .declarations()
                .into_iter()
                .filter(|decl| decl.is_component())
                .map(|decl| ComponentDefinition {
                    id: ComponentId::new(path.clone(), decl.name),
                    kind: decl.kind,
                    line: decl.line,
                })
                .collect()
        };

        // collect() keeps input order, so registration below stays deterministic
        let per_file: Vec<Vec<ComponentDefinition>> = if parallel {
            files.par_iter().map(scan).collect()
        } else {
            files.iter().map(scan).collect()
        };

        let mut registry = Self::new();
        for definition in per_file.into_iter().flatten() {
            registry.register(definition);
        }
        debug!(components = registry.len(), "component discovery finished");
        registry
    }

    /// Add a definition; it becomes the display entry for its name
    pub fn register(&mut self, definition: ComponentDefinition) {
        let index = match self.by_id.get(&definition.id) {
            Some(&index) => {
                self.definitions[index] = definition;
                index
            }
            None => {
                let index = self.definitions.len();
                self.by_id.insert(definition.id.clone(), index);
                self.definitions.push(definition);
                index
            }
        };
        let name = self.definitions[index].id.name.clone();
        self.by_name.insert(name, index);
    }

    /// The winning definition for a bare name
    pub fn lookup(&self, name: &str) -> Option<&ComponentDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    pub fn get(&self, id: &ComponentId) -> Option<&ComponentDefinition> {
        self.by_id.get(id).map(|&i| &self.definitions[i])
    }

    /// Definition of `name` in a specific file
    pub fn defined_in(&self, file: &Path, name: &str) -> Option<&ComponentDefinition> {
        self.get(&ComponentId::new(file, name))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Whether another definition owns this definition's name in the display index
    pub fn is_shadowed(&self, id: &ComponentId) -> bool {
        match (self.by_id.get(id), self.by_name.get(&id.name)) {
            (Some(own), Some(winner)) => own != winner,
            _ => false,
        }
    }

    /// Names defined more than once, with every defining id (winner last)
    pub fn collisions(&self) -> Vec<(String, Vec<ComponentId>)> {
        let mut grouped: HashMap<&str, Vec<ComponentId>> = HashMap::new();
        for definition in &self.definitions {
            grouped
                .entry(definition.name())
                .or_default()
                .push(definition.id.clone());
        }
        let mut collisions: Vec<(String, Vec<ComponentId>)> = grouped
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, mut ids)| {
                let winner = self.by_name[name];
                ids.retain(|id| *id != self.definitions[winner].id);
                ids.push(self.definitions[winner].id.clone());
                (name.to_string(), ids)
            })
            .collect();
        collisions.sort();
        collisions
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.iter()
    }

    /// Definitions grouped by defining file, files in registration order
    pub fn by_file(&self) -> Vec<(&Path, Vec<&ComponentDefinition>)> {
        let mut groups: Vec<(&Path, Vec<&ComponentDefinition>)> = Vec::new();
        let mut positions: HashMap<&Path, usize> = HashMap::new();
        for definition in &self.definitions {
            let file = definition.file();
            match positions.get(file) {
                Some(&pos) => groups[pos].1.push(definition),
                None => {
                    positions.insert(file, groups.len());
                    groups.push((file, vec![definition]));
                }
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
