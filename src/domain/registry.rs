//! Child registry of nested views: add, remove, rename, move and lookups.

use tracing::{debug, instrument};

use crate::domain::arena::{LeafKind, NestedView, ViewId, ViewKind, ViewTree};
use crate::domain::error::{DomainError, DomainResult};

/// Path separator for addressing views from the root.
pub const PATH_SEPARATOR: char = '/';

/// What to create when adding a single view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTemplate {
    Nested { default_view: Option<String> },
    Leaf(LeafKind),
}

impl ViewTemplate {
    pub fn nested() -> Self {
        ViewTemplate::Nested { default_view: None }
    }

    pub(crate) fn into_kind(self) -> ViewKind {
        match self {
            ViewTemplate::Nested { default_view } => ViewKind::Nested(NestedView {
                children: Vec::new(),
                default_view: default_view.filter(|d| !d.trim().is_empty()),
            }),
            ViewTemplate::Leaf(leaf) => ViewKind::Leaf(leaf),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Ok,
    Error,
}

/// Outcome of a form field check, rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    pub kind: ValidationKind,
    pub message: Option<String>,
}

impl FormValidation {
    pub fn ok() -> Self {
        Self {
            kind: ValidationKind::Ok,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.kind == ValidationKind::Ok
    }
}

/// Reject blank names and names that would break path addressing.
pub fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName {
            name: name.to_string(),
            reason: "name must not be blank".to_string(),
        });
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(DomainError::InvalidName {
            name: name.to_string(),
            reason: format!("name must not contain '{PATH_SEPARATOR}'"),
        });
    }
    Ok(())
}

impl ViewTree {
    /// Child of `parent` called `name`, if any.
    pub fn get_child(&self, parent: ViewId, name: &str) -> Option<ViewId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    pub fn exists(&self, parent: ViewId, name: &str) -> bool {
        self.get_child(parent, name).is_some()
    }

    /// Children in insertion order.
    pub fn list_children(&self, parent: ViewId) -> Vec<ViewId> {
        self.children(parent).to_vec()
    }

    /// Children in display order (by name).
    pub fn list_children_sorted(&self, parent: ViewId) -> Vec<ViewId> {
        let mut children = self.list_children(parent);
        children.sort_by(|a, b| self.name(*a).cmp(&self.name(*b)));
        children
    }

    /// Resolve `a/b/c` starting at the root. Empty segments are ignored, so
    /// `""` and `"/"` address the root.
    pub fn resolve_path(&self, path: &str) -> DomainResult<ViewId> {
        let mut current = self.root();
        for segment in path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()) {
            current = self
                .get_child(current, segment)
                .ok_or_else(|| DomainError::ViewNotFound(path.to_string()))?;
        }
        Ok(current)
    }

    /// Add a new child view under `parent`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_view(&mut self, parent: ViewId, name: &str, template: ViewTemplate) -> DomainResult<ViewId> {
        validate_name(name)?;
        self.nested(parent)?;
        if let ViewTemplate::Leaf(leaf) = &template {
            leaf.include_pattern()?;
        }
        if self.exists(parent, name) {
            return Err(DomainError::DuplicateName(name.to_string()));
        }

        let child = self.insert_node(name, template.into_kind(), Some(parent));
        self.link_child(parent, child)?;
        debug!("add_view: added {} under {:?}", name, parent);
        Ok(child)
    }

    /// Remove the child called `name` and its subtree. Absent names are a
    /// no-op; returns whether anything was removed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_view(&mut self, parent: ViewId, name: &str) -> DomainResult<bool> {
        self.nested(parent)?;
        let Some(child) = self.get_child(parent, name) else {
            return Ok(false);
        };

        let nested = self.nested_mut(parent)?;
        nested.children.retain(|&id| id != child);
        if nested.default_view.as_deref() == Some(name) {
            nested.default_view = None;
        }
        let freed = self.free_subtree(child);
        debug!("remove_view: removed {} ({} views freed)", name, freed);
        Ok(true)
    }

    /// Rename a child. Renaming to the current name is accepted.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_view(&mut self, parent: ViewId, old_name: &str, new_name: &str) -> DomainResult<()> {
        validate_name(new_name)?;
        let child = self
            .get_child(parent, old_name)
            .ok_or_else(|| DomainError::ViewNotFound(old_name.to_string()))?;
        if old_name == new_name {
            return Ok(());
        }
        if self.exists(parent, new_name) {
            return Err(DomainError::DuplicateName(new_name.to_string()));
        }

        self.node_mut(child)?.name = new_name.to_string();
        let nested = self.nested_mut(parent)?;
        if nested.default_view.as_deref() == Some(old_name) {
            nested.default_view = Some(new_name.to_string());
        }
        Ok(())
    }

    /// Re-parent `id` under `new_parent`, appending it to the new siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn move_view(&mut self, id: ViewId, new_parent: ViewId) -> DomainResult<()> {
        if id == self.root() {
            return Err(DomainError::RootImmutable);
        }
        let name = self.node(id)?.name.clone();
        self.nested(new_parent)?;
        if self.is_ancestor_or_self(id, new_parent) {
            return Err(DomainError::CycleDetected(name));
        }
        let old_parent = self.node(id)?.owner.ok_or(DomainError::RootImmutable)?;
        if old_parent == new_parent {
            return Ok(());
        }
        if self.exists(new_parent, &name) {
            return Err(DomainError::DuplicateName(name));
        }

        self.nested_mut(old_parent)?.children.retain(|&child| child != id);
        self.link_child(new_parent, id)
    }

    /// Check a candidate name for a new or renamed child of `parent`.
    ///
    /// Blank input is accepted (the form has not been filled in yet), as is
    /// `excluding_self`, the current name of the view being renamed. The
    /// candidate is compared exactly as `add_view` would store it.
    pub fn check_name_available(
        &self,
        parent: ViewId,
        candidate: Option<&str>,
        excluding_self: Option<&str>,
    ) -> FormValidation {
        let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) else {
            return FormValidation::ok();
        };
        if excluding_self == Some(candidate) {
            return FormValidation::ok();
        }
        if self.exists(parent, candidate) {
            return FormValidation::error(DomainError::DuplicateName(candidate.to_string()).to_string());
        }
        FormValidation::ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> ViewTemplate {
        ViewTemplate::Leaf(LeafKind::All)
    }

    #[test]
    fn given_added_view_when_adding_same_name_then_duplicate_and_children_unchanged() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        let first = tree.add_view(root, "foo", all()).unwrap();

        let result = tree.add_view(root, "foo", ViewTemplate::nested());

        assert_eq!(result, Err(DomainError::DuplicateName("foo".into())));
        assert_eq!(tree.list_children(root), vec![first]);
        assert_eq!(tree.node(first).unwrap().owner(), Some(root));
    }

    #[test]
    fn given_leaf_parent_when_adding_then_not_nested() {
        let mut tree = ViewTree::new("root");
        let leaf = tree.add_view(tree.root(), "leaf", all()).unwrap();
        assert!(matches!(
            tree.add_view(leaf, "x", all()),
            Err(DomainError::NotNested(_))
        ));
    }

    #[test]
    fn given_default_child_when_renamed_then_default_follows() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        let nest = tree.add_view(root, "nest", ViewTemplate::nested()).unwrap();
        tree.add_view(nest, "a", all()).unwrap();
        tree.set_default_view(nest, Some("a")).unwrap();

        tree.rename_view(nest, "a", "b").unwrap();

        assert_eq!(tree.default_view(nest), Some("b"));
        assert!(tree.exists(nest, "b"));
        assert!(!tree.exists(nest, "a"));
    }

    #[test]
    fn given_move_into_own_subtree_when_moving_then_cycle_detected() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        let a = tree.add_view(root, "a", ViewTemplate::nested()).unwrap();
        let b = tree.add_view(a, "b", ViewTemplate::nested()).unwrap();

        assert_eq!(tree.move_view(a, b), Err(DomainError::CycleDetected("a".into())));
        assert_eq!(tree.move_view(a, a), Err(DomainError::CycleDetected("a".into())));
        assert_eq!(tree.move_view(root, a), Err(DomainError::RootImmutable));
    }

    #[test]
    fn given_move_to_other_nest_when_moving_then_owner_and_children_follow() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        let a = tree.add_view(root, "a", ViewTemplate::nested()).unwrap();
        let b = tree.add_view(root, "b", ViewTemplate::nested()).unwrap();
        let leaf = tree.add_view(a, "leaf", all()).unwrap();

        tree.move_view(leaf, b).unwrap();

        assert!(tree.list_children(a).is_empty());
        assert_eq!(tree.list_children(b), vec![leaf]);
        assert_eq!(tree.node(leaf).unwrap().owner(), Some(b));
    }

    #[test]
    fn given_nested_path_when_resolving_then_walks_from_root() {
        let mut tree = ViewTree::new("root");
        let a = tree.add_view(tree.root(), "a", ViewTemplate::nested()).unwrap();
        let b = tree.add_view(a, "b", all()).unwrap();

        assert_eq!(tree.resolve_path("a/b"), Ok(b));
        assert_eq!(tree.resolve_path("/"), Ok(tree.root()));
        assert!(matches!(tree.resolve_path("a/x"), Err(DomainError::ViewNotFound(_))));
    }
}
