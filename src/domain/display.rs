use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{ViewId, ViewNode, ViewTree};

pub trait TreeNodeConvert {
    /// Render the subtree at `id`, labelling each view with `label`.
    fn to_tree_with<F>(&self, id: ViewId, label: &F) -> Tree<String>
    where
        F: Fn(ViewId, &ViewNode) -> String;

    fn to_tree_string(&self, id: ViewId) -> Tree<String> {
        self.to_tree_with(id, &|_, node: &ViewNode| node.to_string())
    }
}

impl TreeNodeConvert for ViewTree {
    #[instrument(level = "trace", skip(self, label))]
    fn to_tree_with<F>(&self, id: ViewId, label: &F) -> Tree<String>
    where
        F: Fn(ViewId, &ViewNode) -> String,
    {
        let Some(node) = self.get(id) else {
            return Tree::new("Empty tree".to_string());
        };

        // Children in display order, like the view tabs
        let leaves: Vec<_> = self
            .list_children_sorted(id)
            .into_iter()
            .map(|child| self.to_tree_with(child, label))
            .collect();

        Tree::new(label(id, node)).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::LeafKind;
    use crate::domain::registry::ViewTemplate;

    #[test]
    fn given_tree_when_rendering_then_lists_children_by_name() {
        let mut tree = ViewTree::new("root");
        let root = tree.root();
        tree.add_view(root, "zeta", ViewTemplate::Leaf(LeafKind::All)).unwrap();
        tree.add_view(root, "alpha", ViewTemplate::nested()).unwrap();

        let rendered = tree.to_tree_string(root).to_string();

        let alpha = rendered.find("alpha [nested]").unwrap();
        let zeta = rendered.find("zeta [all]").unwrap();
        assert!(alpha < zeta, "{rendered}");
    }
}
