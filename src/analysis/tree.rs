// Component tree construction
//
// The tree is fully unrolled: a component rendered from two places yields two
// nodes. Expansion uses an explicit stack in preorder, so node numbering and
// edge order match a depth-first walk of the children lists.

use crate::analysis::registry::{ComponentId, ComponentRegistry};
use crate::analysis::usage::Adjacency;
use crate::analysis::Diagnostic;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Index of a node in a [`ComponentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0 + 1)
    }
}

/// One instantiation of a component in the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub component: ComponentId,
    /// `None` for direct children of the root
    pub parent: Option<NodeId>,
    /// Distance from the root; direct children have depth 1
    pub depth: usize,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.component.name
    }
}

/// A `parentRef -> childId[childName]` edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub parent_ref: String,
    pub child_id: String,
    pub child_name: String,
}

/// The unrolled composition tree below a root component
#[derive(Debug, Clone)]
pub struct ComponentTree {
    pub root: ComponentId,
    nodes: Vec<TreeNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ComponentTree {
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    /// Nodes in emission (preorder) order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reference used for the root in edge lists.
    ///
    /// This is the component name, suffixed with `_root` when the name has
    /// the shape of a generated node id (`c1`, `c2`, ...).
    pub fn root_ref(&self) -> String {
        let name = &self.root.name;
        if is_generated_id(name) {
            format!("{}_root", name)
        } else {
            name.clone()
        }
    }

    /// Reference used for a node's parent in edge lists
    pub fn parent_ref(&self, node: &TreeNode) -> String {
        match node.parent {
            Some(parent) => parent.to_string(),
            None => self.root_ref(),
        }
    }

    /// One edge per node, in emission order
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .map(|node| Edge {
                parent_ref: self.parent_ref(node),
                child_id: node.id.to_string(),
                child_name: node.component.name.clone(),
            })
            .collect()
    }

    /// Names from the root down to `node`, inclusive
    pub fn path_to(&self, node: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = self.node(node);
        while let Some(n) = current {
            names.push(n.component.name.clone());
            current = n.parent.and_then(|p| self.node(p));
        }
        names.push(self.root.name.clone());
        names.reverse();
        names
    }
}

fn is_generated_id(name: &str) -> bool {
    name.strip_prefix('c')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

struct Pending {
    parent: Option<NodeId>,
    component: ComponentId,
    depth: usize,
}

/// Expands adjacency lists into a [`ComponentTree`]
pub struct TreeBuilder<'a> {
    registry: &'a ComponentRegistry,
    adjacency: &'a Adjacency,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(registry: &'a ComponentRegistry, adjacency: &'a Adjacency) -> Self {
        Self {
            registry,
            adjacency,
            max_depth: 64,
        }
    }

    /// Nodes at this depth are emitted but not expanded
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Build the tree rooted at the component registered under `root_name`.
    ///
    /// Fails with [`Error::RootNotFound`] when no such component exists.
    pub fn build(&self, root_name: &str) -> Result<ComponentTree> {
        let root = self
            .registry
            .lookup(root_name)
            .map(|d| d.id.clone())
            .filter(|id| self.adjacency.contains(id))
            .ok_or_else(|| Error::root_not_found(root_name))?;
        Ok(self.build_from(root))
    }

    /// Build the tree below a specific component
    pub fn build_from(&self, root: ComponentId) -> ComponentTree {
        let mut tree = ComponentTree {
            root,
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        };

        let mut stack: Vec<Pending> = self
            .adjacency
            .children(&tree.root)
            .iter()
            .rev()
            .map(|child| Pending {
                parent: None,
                component: child.clone(),
                depth: 1,
            })
            .collect();

        while let Some(pending) = stack.pop() {
            if self.on_path(&tree, pending.parent, &pending.component) {
                let mut chain = match pending.parent {
                    Some(parent) => tree.path_to(parent),
                    None => vec![tree.root.name.clone()],
                };
                chain.push(pending.component.name.clone());
                warn!("Cyclic component usage truncated: {}", chain.join(" -> "));
                tree.diagnostics.push(Diagnostic::CyclicUsage { chain });
                continue;
            }

            let id = NodeId(tree.nodes.len());
            tree.nodes.push(TreeNode {
                id,
                component: pending.component.clone(),
                parent: pending.parent,
                depth: pending.depth,
            });

            let children = self.adjacency.children(&pending.component);
            if children.is_empty() {
                continue;
            }
            if pending.depth >= self.max_depth {
                warn!(
                    "Depth limit {} reached at {}, children not expanded",
                    self.max_depth, pending.component.name
                );
                tree.diagnostics.push(Diagnostic::DepthLimit {
                    component: pending.component.name.clone(),
                    depth: pending.depth,
                });
                continue;
            }

            for child in children.iter().rev() {
                stack.push(Pending {
                    parent: Some(id),
                    component: child.clone(),
                    depth: pending.depth + 1,
                });
            }
        }

        tree
    }

    /// Whether `component` already appears between `parent` and the root
    fn on_path(&self, tree: &ComponentTree, parent: Option<NodeId>, component: &ComponentId) -> bool {
        let mut current = parent;
        while let Some(id) = current {
            let node = &tree.nodes[id.0];
            if node.component == *component {
                return true;
            }
            current = node.parent;
        }
        tree.root == *component
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::registry::ComponentDefinition;
    use crate::parser::DeclarationKind;

    fn id(name: &str) -> ComponentId {
        ComponentId::new("/src/components.tsx", name)
    }

    /// `edges` are `(parent, child)` pairs; children keep their listed order
    fn setup(names: &[&str], edges: &[(&str, &str)]) -> (ComponentRegistry, Adjacency) {
        let mut registry = ComponentRegistry::new();
        for name in names {
            registry.register(ComponentDefinition {
                id: id(name),
                kind: DeclarationKind::Function,
                line: 1,
            });
        }
        let mut lists: Vec<(&str, Vec<ComponentId>)> = names.iter().map(|n| (*n, Vec::new())).collect();
        for (from, child) in edges {
            if let Some(entry) = lists.iter_mut().find(|(name, _)| name == from) {
                entry.1.push(id(child));
            }
        }
        let mut adjacency = Adjacency::new();
        for (name, children) in lists {
            adjacency.insert(id(name), children);
        }
        (registry, adjacency)
    }

    fn edge_strings(tree: &ComponentTree) -> Vec<String> {
        tree.edges()
            .into_iter()
            .map(|e| format!("{}->{}[{}]", e.parent_ref, e.child_id, e.child_name))
            .collect()
    }

    #[test]
    fn test_root_named_like_node_id() {
        let (registry, adjacency) = setup(&["c1", "c2"], &[("c1", "c2")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("c1").unwrap();
        assert_eq!(tree.root_ref(), "c1_root");
        assert_eq!(edge_strings(&tree), vec!["c1_root->c1[c2]"]);

        assert!(is_generated_id("c12"));
        assert!(!is_generated_id("c"));
        assert!(!is_generated_id("card"));
    }

    #[test]
    fn test_single_child() {
        let (registry, adjacency) = setup(&["App", "Header"], &[("App", "Header")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(edge_strings(&tree), vec!["App->c1[Header]"]);
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn test_preorder_emission() {
        let (registry, adjacency) = setup(
            &["App", "Layout", "Nav", "Footer"],
            &[("App", "Layout"), ("App", "Footer"), ("Layout", "Nav")],
        );
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(
            edge_strings(&tree),
            vec!["App->c1[Layout]", "c1->c2[Nav]", "App->c3[Footer]"]
        );
        assert_eq!(tree.node(NodeId(1)).unwrap().depth, 2);
        assert_eq!(tree.nodes().iter().filter(|n| n.parent.is_none()).count(), 2);
    }

    #[test]
    fn test_shared_component_is_duplicated() {
        let (registry, adjacency) = setup(
            &["App", "Page", "Sidebar", "Button"],
            &[
                ("App", "Page"),
                ("App", "Sidebar"),
                ("Page", "Button"),
                ("Sidebar", "Button"),
            ],
        );
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        let buttons: Vec<&TreeNode> = tree.nodes().iter().filter(|n| n.name() == "Button").collect();
        assert_eq!(tree.len(), 4);
        assert_eq!(buttons.len(), 2);
        assert_ne!(buttons[0].id, buttons[1].id);
        assert_ne!(buttons[0].parent, buttons[1].parent);
    }

    #[test]
    fn test_repeated_usage_is_kept() {
        let (registry, adjacency) = setup(&["App", "Row"], &[("App", "Row"), ("App", "Row")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(edge_strings(&tree), vec!["App->c1[Row]", "App->c2[Row]"]);
    }

    #[test]
    fn test_root_not_found() {
        let (registry, adjacency) = setup(&["Header"], &[]);
        let err = TreeBuilder::new(&registry, &adjacency).build("App").unwrap_err();
        assert!(matches!(err, Error::RootNotFound { ref root } if root == "App"));
    }

    #[test]
    fn test_root_without_children_is_empty_tree() {
        let (registry, adjacency) = setup(&["App"], &[]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_mutual_cycle_is_truncated() {
        let (registry, adjacency) = setup(
            &["App", "A", "B"],
            &[("App", "A"), ("A", "B"), ("B", "A")],
        );
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(edge_strings(&tree), vec!["App->c1[A]", "c1->c2[B]"]);
        assert_eq!(
            tree.diagnostics,
            vec![Diagnostic::CyclicUsage {
                chain: vec!["App".into(), "A".into(), "B".into(), "A".into()]
            }]
        );
    }

    #[test]
    fn test_cycle_back_to_root() {
        let (registry, adjacency) = setup(&["App", "Modal"], &[("App", "Modal"), ("Modal", "App")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.diagnostics.len(), 1);
    }

    #[test]
    fn test_self_render_is_truncated() {
        let (registry, adjacency) = setup(&["App", "Tree"], &[("App", "Tree"), ("Tree", "Tree")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(tree.len(), 1);
        assert!(matches!(tree.diagnostics[0], Diagnostic::CyclicUsage { .. }));
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        // the visited set is per path, not global
        let (registry, adjacency) = setup(
            &["App", "A", "B"],
            &[("App", "A"), ("App", "B"), ("B", "A")],
        );
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let (registry, adjacency) = setup(
            &["App", "L1", "L2", "L3"],
            &[("App", "L1"), ("L1", "L2"), ("L2", "L3")],
        );
        let tree = TreeBuilder::new(&registry, &adjacency)
            .with_max_depth(2)
            .build("App")
            .unwrap();
        assert_eq!(edge_strings(&tree), vec!["App->c1[L1]", "c1->c2[L2]"]);
        assert_eq!(
            tree.diagnostics,
            vec![Diagnostic::DepthLimit {
                component: "L2".into(),
                depth: 2
            }]
        );
    }

    #[test]
    fn test_path_to() {
        let (registry, adjacency) = setup(&["App", "A", "B"], &[("App", "A"), ("A", "B")]);
        let tree = TreeBuilder::new(&registry, &adjacency).build("App").unwrap();
        assert_eq!(tree.path_to(NodeId(1)), vec!["App", "A", "B"]);
    }
}
