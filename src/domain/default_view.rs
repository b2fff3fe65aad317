//! Default child selection for nested views.

use itertools::Itertools;

use crate::domain::arena::{ViewId, ViewTree};
use crate::domain::error::DomainResult;

/// One entry of the default-view selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultOption {
    /// Stored value; empty means "no default"
    pub value: String,
    pub label: String,
}

impl DefaultOption {
    fn none() -> Self {
        Self {
            value: String::new(),
            label: "None".to_string(),
        }
    }
}

impl ViewTree {
    /// Configured default view name, as stored (it may not resolve).
    pub fn default_view(&self, id: ViewId) -> Option<&str> {
        self.get(id)?.as_nested()?.default_view()
    }

    /// The child a nested view redirects to when addressed without a child
    /// name. Unset, empty and dangling defaults all resolve to `None`.
    pub fn resolve_default(&self, id: ViewId) -> Option<ViewId> {
        let name = self.default_view(id).filter(|n| !n.is_empty())?;
        self.get_child(id, name)
    }

    /// Store the default view name. Blank clears it; names that do not
    /// resolve are kept as-is.
    pub fn set_default_view(&mut self, id: ViewId, name: Option<&str>) -> DomainResult<()> {
        let value = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        self.nested_mut(id)?.default_view = value;
        Ok(())
    }

    /// Choices offered when configuring the default view: "None" first, then
    /// the leaf children by name. Nested children are not offered.
    pub fn default_candidates(&self, id: ViewId) -> DomainResult<Vec<DefaultOption>> {
        let nested = self.nested(id)?;
        let leaves = nested
            .children()
            .iter()
            .filter_map(|&child| self.get(child))
            .filter(|node| !node.is_nested())
            .map(|node| node.name().to_string())
            .sorted()
            .map(|name| DefaultOption {
                label: name.clone(),
                value: name,
            });

        Ok(std::iter::once(DefaultOption::none()).chain(leaves).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::LeafKind;
    use crate::domain::error::DomainError;
    use crate::domain::registry::ViewTemplate;

    #[test]
    fn given_unset_default_when_resolving_then_none() {
        let mut tree = ViewTree::new("root");
        let nest = tree.add_view(tree.root(), "nest", ViewTemplate::nested()).unwrap();
        tree.add_view(nest, "a", ViewTemplate::Leaf(LeafKind::All)).unwrap();

        assert_eq!(tree.resolve_default(nest), None);
    }

    #[test]
    fn given_dangling_default_when_resolving_then_none_without_error() {
        let mut tree = ViewTree::new("root");
        let nest = tree.add_view(tree.root(), "nest", ViewTemplate::nested()).unwrap();
        tree.set_default_view(nest, Some("ghost")).unwrap();

        assert_eq!(tree.default_view(nest), Some("ghost"));
        assert_eq!(tree.resolve_default(nest), None);
    }

    #[test]
    fn given_leaf_view_when_setting_default_then_not_nested() {
        let mut tree = ViewTree::new("root");
        let leaf = tree
            .add_view(tree.root(), "leaf", ViewTemplate::Leaf(LeafKind::All))
            .unwrap();
        assert!(matches!(
            tree.set_default_view(leaf, Some("x")),
            Err(DomainError::NotNested(_))
        ));
    }

    #[test]
    fn given_blank_default_when_setting_then_clears() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        tree.set_default_view(root, Some("a")).unwrap();
        tree.set_default_view(root, Some("  ")).unwrap();
        assert_eq!(tree.default_view(root), None);
    }
}
