//! Wholesale replacement of a subtree from a description (config reload).

use tracing::{debug, instrument};

use crate::domain::arena::{ViewId, ViewTree};
use crate::domain::description::ViewDescription;
use crate::domain::error::{DomainError, DomainResult};

impl ViewTree {
    /// Replace the view `target` and everything below it with `replacement`.
    ///
    /// All checks run before the tree is touched, so a rejected replacement
    /// leaves the tree exactly as it was. On success the new subtree sits at
    /// the old position under the old owner and keeps the old name; every
    /// node in it is owned by its structural parent, and all handles into
    /// the old subtree are stale. Returns the handle of the new top view.
    #[instrument(level = "debug", skip(self, replacement))]
    pub fn replace_subtree(&mut self, target: ViewId, replacement: &ViewDescription) -> DomainResult<ViewId> {
        if target == self.root() {
            return Err(DomainError::RootImmutable);
        }
        let node = self.node(target)?;
        let owner = node.owner().ok_or(DomainError::RootImmutable)?;
        if node.is_nested() != replacement.is_nested() {
            return Err(DomainError::invalid_description(format!(
                "cannot replace {} view \"{}\" with a {} description",
                node.type_name(),
                node.name(),
                if replacement.is_nested() { "nested" } else { "leaf" },
            )));
        }
        let name = node.name().to_string();
        let renamed = replacement.clone().with_name(&name);
        renamed.validate()?;

        let position = self
            .nested(owner)?
            .children()
            .iter()
            .position(|&child| child == target)
            .ok_or_else(|| DomainError::ViewNotFound(name.clone()))?;

        let fresh = self.materialize(&renamed, Some(owner))?;
        self.nested_mut(owner)?.children[position] = fresh;
        let freed = self.free_subtree(target);

        debug!(
            "replace_subtree: swapped {} at position {} ({} old views freed, {} new)",
            name,
            position,
            freed,
            self.iter_from(fresh).count()
        );
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::LeafKind;
    use crate::domain::registry::ViewTemplate;

    #[test]
    fn given_middle_sibling_when_replacing_then_position_is_kept() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        tree.add_view(root, "first", ViewTemplate::Leaf(LeafKind::All)).unwrap();
        let mid = tree.add_view(root, "mid", ViewTemplate::nested()).unwrap();
        tree.add_view(root, "last", ViewTemplate::Leaf(LeafKind::All)).unwrap();

        let fresh = tree
            .replace_subtree(mid, &ViewDescription::nested("whatever", vec![ViewDescription::all("x")]))
            .unwrap();

        let names: Vec<&str> = tree
            .list_children(root)
            .into_iter()
            .filter_map(|id| tree.name(id))
            .collect();
        assert_eq!(names, vec!["first", "mid", "last"]);
        assert_eq!(tree.list_children(root)[1], fresh);
        assert!(tree.get(mid).is_none());
    }

    #[test]
    fn given_leaf_target_and_nested_description_when_replacing_then_rejected() {
        let mut tree = ViewTree::new("root");
        let leaf = tree
            .add_view(tree.root(), "leaf", ViewTemplate::Leaf(LeafKind::All))
            .unwrap();

        let result = tree.replace_subtree(leaf, &ViewDescription::nested("leaf", vec![]));

        assert!(matches!(result, Err(DomainError::InvalidDescription { .. })));
        assert!(tree.get(leaf).is_some());
    }

    #[test]
    fn given_blank_document_name_when_replacing_then_name_ignored() {
        let mut tree = ViewTree::new("root");
        let a = tree.add_view(tree.root(), "A", ViewTemplate::nested()).unwrap();

        let fresh = tree
            .replace_subtree(a, &ViewDescription::nested(" ", vec![ViewDescription::all("x")]))
            .unwrap();

        assert_eq!(tree.name(fresh), Some("A"));
        assert!(tree.resolve_path("A/x").is_ok());
    }

    #[test]
    fn given_root_when_replacing_then_root_immutable() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        assert_eq!(
            tree.replace_subtree(root, &ViewDescription::nested("root", vec![])),
            Err(DomainError::RootImmutable)
        );
    }
}
