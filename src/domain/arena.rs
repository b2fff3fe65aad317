//! Arena-backed view tree.
//!
//! Every view lives in a generational arena. Parents own their children
//! through `NestedView::children`; the child-to-parent link (`owner`) is a
//! plain index back-reference, so ownership stays a tree even though the
//! structure is navigable in both directions.

use std::fmt;

use generational_arena::{Arena, Index};
use regex::Regex;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle of a view inside a [`ViewTree`].
///
/// Handles are generational: once a view is removed or replaced its handle
/// never resolves again, not even to a view later stored in the same slot.
pub type ViewId = Index;

/// Work-item selection of a leaf view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafKind {
    /// Jobs listed by name, plus jobs whose whole name matches `include_regex`.
    List {
        include_regex: Option<String>,
        jobs: Vec<String>,
    },
    /// Every job known to the work-item source.
    All,
}

impl LeafKind {
    pub fn list(include_regex: Option<&str>, jobs: &[&str]) -> Self {
        LeafKind::List {
            include_regex: include_regex.map(str::to_string),
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LeafKind::List { .. } => "list",
            LeafKind::All => "all",
        }
    }

    /// Compile the include pattern, anchored so it must match a whole job name.
    pub fn include_pattern(&self) -> DomainResult<Option<Regex>> {
        match self {
            LeafKind::List {
                include_regex: Some(pattern),
                ..
            } if !pattern.is_empty() => Regex::new(&format!("^(?:{pattern})$"))
                .map(Some)
                .map_err(|e| DomainError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }),
            _ => Ok(None),
        }
    }
}

/// Payload of a composite view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedView {
    /// Children in insertion order
    pub(crate) children: Vec<ViewId>,
    /// Name of the child to redirect to; may not resolve
    pub(crate) default_view: Option<String>,
}

impl NestedView {
    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn default_view(&self) -> Option<&str> {
        self.default_view.as_deref()
    }
}

#[derive(Debug, Clone)]
pub enum ViewKind {
    Nested(NestedView),
    Leaf(LeafKind),
}

/// Tree node in the arena-based view hierarchy.
#[derive(Debug)]
pub struct ViewNode {
    pub(crate) name: String,
    /// Enclosing nested view, None only for the tree root
    pub(crate) owner: Option<ViewId>,
    pub(crate) kind: ViewKind,
}

impl ViewNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<ViewId> {
        self.owner
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, ViewKind::Nested(_))
    }

    pub fn as_nested(&self) -> Option<&NestedView> {
        match &self.kind {
            ViewKind::Nested(nested) => Some(nested),
            ViewKind::Leaf(_) => None,
        }
    }

    pub(crate) fn as_nested_mut(&mut self) -> Option<&mut NestedView> {
        match &mut self.kind {
            ViewKind::Nested(nested) => Some(nested),
            ViewKind::Leaf(_) => None,
        }
    }

    pub fn leaf_kind(&self) -> Option<&LeafKind> {
        match &self.kind {
            ViewKind::Leaf(leaf) => Some(leaf),
            ViewKind::Nested(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ViewKind::Nested(_) => "nested",
            ViewKind::Leaf(leaf) => leaf.type_name(),
        }
    }
}

impl fmt::Display for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.type_name())
    }
}

/// The whole view hierarchy, rooted at the host's top-level nested view.
#[derive(Debug)]
pub struct ViewTree {
    arena: Arena<ViewNode>,
    root: ViewId,
}

impl ViewTree {
    pub fn new(root_name: &str) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(ViewNode {
            name: root_name.to_string(),
            owner: None,
            kind: ViewKind::Nested(NestedView::default()),
        });
        Self { arena, root }
    }

    pub fn root(&self) -> ViewId {
        self.root
    }

    /// Number of live views, root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.arena.contains(id)
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewNode> {
        self.arena.get(id)
    }

    /// Like [`ViewTree::get`], but a stale handle is an error.
    pub fn node(&self, id: ViewId) -> DomainResult<&ViewNode> {
        self.arena.get(id).ok_or(DomainError::StaleView)
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> DomainResult<&mut ViewNode> {
        self.arena.get_mut(id).ok_or(DomainError::StaleView)
    }

    pub fn name(&self, id: ViewId) -> Option<&str> {
        self.get(id).map(ViewNode::name)
    }

    /// Children of a nested view; empty for leaves and stale handles.
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.get(id)
            .and_then(ViewNode::as_nested)
            .map(NestedView::children)
            .unwrap_or(&[])
    }

    pub(crate) fn nested(&self, id: ViewId) -> DomainResult<&NestedView> {
        let node = self.node(id)?;
        node.as_nested()
            .ok_or_else(|| DomainError::NotNested(node.name.clone()))
    }

    pub(crate) fn nested_mut(&mut self, id: ViewId) -> DomainResult<&mut NestedView> {
        let node = self.node_mut(id)?;
        let name = node.name.clone();
        node.as_nested_mut().ok_or(DomainError::NotNested(name))
    }

    /// Store a node without linking it into its owner's children.
    #[instrument(level = "trace", skip(self, kind))]
    pub(crate) fn insert_node(&mut self, name: &str, kind: ViewKind, owner: Option<ViewId>) -> ViewId {
        self.arena.insert(ViewNode {
            name: name.to_string(),
            owner,
            kind,
        })
    }

    /// Append `child` to `parent`'s children and point its owner at `parent`.
    pub(crate) fn link_child(&mut self, parent: ViewId, child: ViewId) -> DomainResult<()> {
        self.nested_mut(parent)?.children.push(child);
        self.node_mut(child)?.owner = Some(parent);
        Ok(())
    }

    /// Drop a whole subtree from the arena. The caller unlinks it from its
    /// owner first. Returns the number of views freed.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn free_subtree(&mut self, id: ViewId) -> usize {
        let doomed: Vec<ViewId> = self.iter_postorder_from(id).map(|(idx, _)| idx).collect();
        for idx in &doomed {
            self.arena.remove(*idx);
        }
        doomed.len()
    }

    /// Owners of `id`, nearest first, ending with the root.
    #[instrument(level = "trace", skip(self))]
    pub fn owner_chain(&self, id: ViewId) -> Vec<ViewId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(ViewNode::owner);
        while let Some(owner) = current {
            chain.push(owner);
            current = self.get(owner).and_then(ViewNode::owner);
        }
        chain
    }

    /// True when `ancestor` is `id` itself or one of its owners.
    pub fn is_ancestor_or_self(&self, ancestor: ViewId, id: ViewId) -> bool {
        ancestor == id || self.owner_chain(id).contains(&ancestor)
    }

    /// Slash-separated path from the root, empty for the root itself.
    pub fn path_of(&self, id: ViewId) -> Option<String> {
        let node = self.get(id)?;
        if id == self.root {
            return Some(String::new());
        }
        let mut names = vec![node.name.as_str()];
        for owner in self.owner_chain(id) {
            if owner == self.root {
                break;
            }
            names.push(self.get(owner)?.name.as_str());
        }
        names.reverse();
        Some(names.join("/"))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_from(&self, id: ViewId) -> TreeIterator<'_> {
        TreeIterator::new(self, id)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder_from(&self, id: ViewId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, id)
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        self.iter_from(self.root)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, id: ViewId) -> usize {
        if let Some(node) = self.get(id) {
            1 + node
                .as_nested()
                .map(|nested| {
                    nested
                        .children
                        .iter()
                        .map(|&child| self.depth(child))
                        .max()
                        .unwrap_or(0)
                })
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects every leaf view reachable from `id`, in pre-order.
    ///
    /// Nested views are traversed but never reported, so an empty nested
    /// view contributes nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_views(&self, id: ViewId) -> Vec<ViewId> {
        self.iter_from(id)
            .filter(|(_, node)| !node.is_nested())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Pre-order, left-to-right traversal of a subtree.
pub struct TreeIterator<'a> {
    tree: &'a ViewTree,
    stack: Vec<ViewId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ViewTree, start: ViewId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (ViewId, &'a ViewNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                if let Some(nested) = node.as_nested() {
                    self.stack.extend(nested.children.iter().rev());
                }
                return Some((current, node));
            }
        }
        None
    }
}

/// Post-order traversal: children before their owner.
pub struct PostOrderIterator<'a> {
    tree: &'a ViewTree,
    stack: Vec<(ViewId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a ViewTree, start: ViewId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push((start, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (ViewId, &'a ViewNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                if let Some(nested) = node.as_nested() {
                    for &child in nested.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                }
            }
        }
        None
    }
}
