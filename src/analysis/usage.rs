// Import + JSX usage correlation
//
// A component's children are the imported components that it renders as a
// JSX tag. Order follows the tags in the source and repeats are kept.

use crate::analysis::registry::{ComponentDefinition, ComponentId, ComponentRegistry};
use crate::config::UsageScope;
use crate::parser::{ImportBinding, ImportedName, ParseCache};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Direct children of every component
#[derive(Debug, Default, Clone)]
pub struct Adjacency {
    lists: HashMap<ComponentId, Vec<ComponentId>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: ComponentId, children: Vec<ComponentId>) {
        self.lists.insert(component, children);
    }

    /// Children of `component`; empty when it has none or is unknown
    pub fn children(&self, component: &ComponentId) -> &[ComponentId] {
        self.lists.get(component).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, component: &ComponentId) -> bool {
        self.lists.contains_key(component)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Entries sorted by component id
    pub fn entries(&self) -> Vec<(&ComponentId, &[ComponentId])> {
        let mut entries: Vec<(&ComponentId, &[ComponentId])> = self
            .lists
            .iter()
            .map(|(id, children)| (id, children.as_slice()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Resolves which imported components each component renders
pub struct UsageResolver<'a> {
    registry: &'a ComponentRegistry,
    cache: &'a ParseCache,
    scope: UsageScope,
    extensions: Vec<String>,
    cataloged: HashSet<PathBuf>,
}

impl<'a> UsageResolver<'a> {
    pub fn new(registry: &'a ComponentRegistry, cache: &'a ParseCache, files: &[PathBuf]) -> Self {
        Self {
            registry,
            cache,
            scope: UsageScope::default(),
            extensions: ["js", "jsx", "ts", "tsx"].iter().map(|e| e.to_string()).collect(),
            cataloged: files.iter().cloned().collect(),
        }
    }

    pub fn with_scope(mut self, scope: UsageScope) -> Self {
        self.scope = scope;
        self
    }

    /// Extensions tried when resolving extensionless relative imports
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Build the adjacency list for every registered component
    pub fn resolve(&self, parallel: bool) -> Adjacency {
        let groups = self.registry.by_file();
        let resolve_file = |(file, definitions): &(&Path, Vec<&ComponentDefinition>)| {
            self.resolve_file(file, definitions)
        };

        let per_file: Vec<Vec<(ComponentId, Vec<ComponentId>)>> = if parallel {
            groups.par_iter().map(resolve_file).collect()
        } else {
            groups.iter().map(resolve_file).collect()
        };

        let mut adjacency = Adjacency::new();
        for (component, children) in per_file.into_iter().flatten() {
            adjacency.insert(component, children);
        }
        debug!(components = adjacency.len(), "usage resolution finished");
        adjacency
    }

    fn resolve_file(
        &self,
        file: &Path,
        definitions: &[&ComponentDefinition],
    ) -> Vec<(ComponentId, Vec<ComponentId>)> {
        let Some(source) = self.cache.get(file) else {
            return definitions
                .iter()
                .map(|d| (d.id.clone(), Vec::new()))
                .collect();
        };

        let candidates: Vec<(String, ComponentId)> = source
            .imports()
            .iter()
            .filter_map(|binding| {
                self.resolve_binding(binding, file)
                    .map(|id| (binding.local.clone(), id))
            })
            .collect();

        let declarations = source.declarations();
        let file_tags = match self.scope {
            UsageScope::File => source.jsx_tags(),
            UsageScope::Declaration => Vec::new(),
        };

        definitions
            .iter()
            .map(|definition| {
                let tags: &[String] = match self.scope {
                    UsageScope::File => &file_tags,
                    UsageScope::Declaration => declarations
                        .iter()
                        .rev()
                        .find(|d| d.name == definition.name())
                        .map(|d| d.tags.as_slice())
                        .unwrap_or(&[]),
                };
                let children = tags
                    .iter()
                    .filter_map(|tag| {
                        candidates
                            .iter()
                            .find(|(local, _)| local == tag)
                            .map(|(_, id)| id.clone())
                    })
                    .collect();
                (definition.id.clone(), children)
            })
            .collect()
    }

    /// Map an import binding to a registered component.
    ///
    /// Relative specifiers are resolved against the catalog first so that a
    /// name defined in several files picks the imported one; otherwise the
    /// display index decides.
    fn resolve_binding(&self, binding: &ImportBinding, importer: &Path) -> Option<ComponentId> {
        let name = binding.lookup_name();

        if binding.is_relative() && binding.imported != ImportedName::Namespace {
            let base = importer.parent().unwrap_or(Path::new("")).join(&binding.source);
            let base = normalize(&base);
            for candidate in self.candidate_paths(&base) {
                if !self.cataloged.contains(&candidate) {
                    continue;
                }
                if let Some(definition) = self.registry.defined_in(&candidate, name) {
                    return Some(definition.id.clone());
                }
            }
        }

        self.registry.lookup(name).map(|d| d.id.clone())
    }

    fn candidate_paths(&self, base: &Path) -> Vec<PathBuf> {
        let mut paths = vec![base.to_path_buf()];
        let file_name = base
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        for ext in &self.extensions {
            paths.push(base.with_file_name(format!("{}.{}", file_name, ext)));
        }
        for ext in &self.extensions {
            paths.push(base.join(format!("index.{}", ext)));
        }
        paths
    }
}

/// Lexically remove `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Component usage as a directed graph, for whole-project queries
pub struct UsageGraph {
    graph: DiGraph<ComponentId, ()>,
    index: HashMap<ComponentId, NodeIndex>,
}

impl UsageGraph {
    /// Build from the registry (nodes) and adjacency (edges, deduplicated)
    pub fn build(registry: &ComponentRegistry, adjacency: &Adjacency) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for definition in registry.definitions() {
            let node = graph.add_node(definition.id.clone());
            index.insert(definition.id.clone(), node);
        }
        for (from, children) in adjacency.entries() {
            let Some(&a) = index.get(from) else { continue };
            for child in children {
                let Some(&b) = index.get(child) else { continue };
                if graph.find_edge(a, b).is_none() {
                    graph.add_edge(a, b, ());
                }
            }
        }
        Self { graph, index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Groups of components that render each other, including self-renders
    pub fn cycles(&self) -> Vec<Vec<ComponentId>> {
        let mut cycles: Vec<Vec<ComponentId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut ids: Vec<ComponentId> =
                    scc.into_iter().map(|n| self.graph[n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Components that cannot be reached from `root`, in registration order
    pub fn unreachable_from(&self, root: &ComponentId) -> Vec<ComponentId> {
        let Some(&start) = self.index.get(root) else {
            return self.graph.node_indices().map(|n| self.graph[n].clone()).collect();
        };
        let mut reached = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            reached.insert(node);
        }
        self.graph
            .node_indices()
            .filter(|n| !reached.contains(n))
            .map(|n| self.graph[n].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::registry::ComponentDefinition;
    use crate::parser::DeclarationKind;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
        files: Vec<PathBuf>,
    }

    impl Project {
        fn new(files: &[(&str, &str)]) -> Self {
            let dir = TempDir::new().unwrap();
            let mut paths = Vec::new();
            for (name, source) in files {
                let path = dir.path().join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, source).unwrap();
                paths.push(path);
            }
            paths.sort();
            Self { dir, files: paths }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }
    }

    fn names(children: &[ComponentId]) -> Vec<&str> {
        children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_imported_and_rendered() {
        let project = Project::new(&[
            (
                "App.jsx",
                r#"
import Header from './Header';
import Footer from './Footer';
export default function App() {
    return <div><Header /><Header /></div>;
}
"#,
            ),
            ("Header.jsx", "export default function Header() { return <h1 />; }"),
            ("Footer.jsx", "export default function Footer() { return <footer />; }"),
        ]);
        let cache = ParseCache::strict();
        let registry = ComponentRegistry::discover(&project.files, &cache, false);
        let adjacency = UsageResolver::new(&registry, &cache, &project.files).resolve(false);

        let app = ComponentId::new(project.path("App.jsx"), "App");
        // Footer is imported but never rendered; Header repeats are kept
        assert_eq!(names(adjacency.children(&app)), vec!["Header", "Header"]);
        let header = ComponentId::new(project.path("Header.jsx"), "Header");
        assert!(adjacency.children(&header).is_empty());
        assert_eq!(adjacency.len(), 3);
    }

    #[test]
    fn test_rendered_but_not_imported_is_ignored() {
        let project = Project::new(&[
            ("App.jsx", "export function App() { return <Card />; }"),
            ("Card.jsx", "export const Card = () => <div />;"),
        ]);
        let cache = ParseCache::strict();
        let registry = ComponentRegistry::discover(&project.files, &cache, false);
        let adjacency = UsageResolver::new(&registry, &cache, &project.files).resolve(false);
        let app = ComponentId::new(project.path("App.jsx"), "App");
        assert!(adjacency.children(&app).is_empty());
    }

    #[test]
    fn test_usage_scope() {
        let project = Project::new(&[
            (
                "Layout.jsx",
                r#"
import { Sidebar } from './Sidebar';
import { Nav } from './Nav';
export const Layout = () => <main><Nav /></main>;
export const Aside = () => <aside><Sidebar /></aside>;
"#,
            ),
            ("Sidebar.jsx", "export const Sidebar = () => <div />;"),
            ("Nav.jsx", "export const Nav = () => <nav />;"),
        ]);
        let cache = ParseCache::strict();
        let registry = ComponentRegistry::discover(&project.files, &cache, false);
        let layout = ComponentId::new(project.path("Layout.jsx"), "Layout");

        let scoped = UsageResolver::new(&registry, &cache, &project.files)
            .with_scope(UsageScope::Declaration)
            .resolve(false);
        assert_eq!(names(scoped.children(&layout)), vec!["Nav"]);

        let file_wide = UsageResolver::new(&registry, &cache, &project.files)
            .with_scope(UsageScope::File)
            .resolve(false);
        assert_eq!(names(file_wide.children(&layout)), vec!["Nav", "Sidebar"]);
    }

    #[test]
    fn test_relative_import_picks_imported_file() {
        let project = Project::new(&[
            (
                "App.jsx",
                "import { Button } from './a/Button';\nexport function App() { return <Button />; }",
            ),
            ("a/Button.jsx", "export const Button = () => <button />;"),
            ("b/Button.jsx", "export const Button = () => <a />;"),
        ]);
        let cache = ParseCache::strict();
        let registry = ComponentRegistry::discover(&project.files, &cache, false);
        // display index picks b/, the import picks a/
        assert_eq!(registry.lookup("Button").unwrap().file(), project.path("b/Button.jsx"));

        let adjacency = UsageResolver::new(&registry, &cache, &project.files).resolve(false);
        let app = ComponentId::new(project.path("App.jsx"), "App");
        assert_eq!(adjacency.children(&app)[0].file, project.path("a/Button.jsx"));
    }

    #[test]
    fn test_aliased_and_index_imports() {
        let project = Project::new(&[
            (
                "src/App.jsx",
                r#"
import { Header as TopBar } from '../shared/Header';
import Grid from './grid';
export function App() { return <TopBar><Grid /></TopBar>; }
"#,
            ),
            ("shared/Header.jsx", "export function Header() { return <h1 />; }"),
            ("src/grid/index.jsx", "export default function Grid() { return <table />; }"),
        ]);
        let cache = ParseCache::strict();
        let registry = ComponentRegistry::discover(&project.files, &cache, false);
        let adjacency = UsageResolver::new(&registry, &cache, &project.files).resolve(true);
        let app = ComponentId::new(project.path("src/App.jsx"), "App");
        let children = adjacency.children(&app);
        assert_eq!(names(children), vec!["Header", "Grid"]);
        assert_eq!(children[1].file, project.path("src/grid/index.jsx"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/./../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/./b")), PathBuf::from("/a/b"));
    }

    fn definition(name: &str) -> ComponentDefinition {
        ComponentDefinition {
            id: ComponentId::new("/src/x.tsx", name),
            kind: DeclarationKind::Function,
            line: 1,
        }
    }

    #[test]
    fn test_usage_graph_cycles_and_reachability() {
        let mut registry = ComponentRegistry::new();
        for name in ["App", "A", "B", "Orphan", "Selfish"] {
            registry.register(definition(name));
        }
        let id = |name: &str| ComponentId::new("/src/x.tsx", name);

        let mut adjacency = Adjacency::new();
        adjacency.insert(id("App"), vec![id("A"), id("A")]);
        adjacency.insert(id("A"), vec![id("B")]);
        adjacency.insert(id("B"), vec![id("A")]);
        adjacency.insert(id("Selfish"), vec![id("Selfish")]);

        let graph = UsageGraph::build(&registry, &adjacency);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);

        let cycles = graph.cycles();
        assert_eq!(cycles.len(), 2);
        assert!(cycles.contains(&vec![id("A"), id("B")]));
        assert!(cycles.contains(&vec![id("Selfish")]));

        let unreachable = graph.unreachable_from(&id("App"));
        assert_eq!(unreachable, vec![id("Orphan"), id("Selfish")]);
    }
}
