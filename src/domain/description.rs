//! Serialized view descriptions.
//!
//! A description is a detached, owner-less copy of a subtree. It is what
//! gets written to and read from disk, and what a config reload hands to
//! the reconciliation step.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::arena::{LeafKind, NestedView, ViewId, ViewKind, ViewTree};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::registry::validate_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ViewDescription {
    Nested {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_view: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        views: Vec<ViewDescription>,
    },
    List {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        include_regex: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        jobs: Vec<String>,
    },
    All {
        name: String,
    },
}

impl ViewDescription {
    pub fn nested(name: &str, views: Vec<ViewDescription>) -> Self {
        ViewDescription::Nested {
            name: name.to_string(),
            default_view: None,
            views,
        }
    }

    pub fn list(name: &str, include_regex: Option<&str>, jobs: &[&str]) -> Self {
        ViewDescription::List {
            name: name.to_string(),
            include_regex: include_regex.map(str::to_string),
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
        }
    }

    pub fn all(name: &str) -> Self {
        ViewDescription::All {
            name: name.to_string(),
        }
    }

    /// Parse and fully validate a TOML document.
    pub fn parse(document: &str) -> DomainResult<Self> {
        let description = Self::from_toml(document)?;
        description.validate()?;
        Ok(description)
    }

    /// Deserialize a TOML document without the structural checks. Unknown
    /// keys are rejected for every kind.
    pub fn from_toml(document: &str) -> DomainResult<Self> {
        toml::from_str(document).map_err(|e| DomainError::invalid_description(e.to_string().trim()))
    }

    pub fn to_document(&self) -> DomainResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DomainError::invalid_description(format!("serialize: {e}")))
    }

    pub fn name(&self) -> &str {
        match self {
            ViewDescription::Nested { name, .. }
            | ViewDescription::List { name, .. }
            | ViewDescription::All { name } => name,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, ViewDescription::Nested { .. })
    }

    pub fn views(&self) -> &[ViewDescription] {
        match self {
            ViewDescription::Nested { views, .. } => views,
            _ => &[],
        }
    }

    pub fn with_name(mut self, new_name: &str) -> Self {
        match &mut self {
            ViewDescription::Nested { name, .. }
            | ViewDescription::List { name, .. }
            | ViewDescription::All { name } => *name = new_name.to_string(),
        }
        self
    }

    /// Structural checks for the whole subtree: names, sibling uniqueness
    /// and include patterns. Errors carry the offending path.
    pub fn validate(&self) -> DomainResult<()> {
        let mut stack = vec![(self, self.name().to_string())];
        while let Some((current, path)) = stack.pop() {
            validate_name(current.name())
                .map_err(|e| DomainError::invalid_description(format!("{path}: {e}")))?;

            if let Some(leaf) = current.leaf_kind() {
                leaf.include_pattern()
                    .map_err(|e| DomainError::invalid_description(format!("{path}: {e}")))?;
            }

            let mut seen = HashSet::new();
            for child in current.views() {
                if !seen.insert(child.name()) {
                    return Err(DomainError::invalid_description(format!(
                        "{path}: duplicate view name \"{}\"",
                        child.name()
                    )));
                }
                stack.push((child, format!("{path}/{}", child.name())));
            }
        }
        Ok(())
    }

    fn leaf_kind(&self) -> Option<LeafKind> {
        match self {
            ViewDescription::List {
                include_regex,
                jobs,
                ..
            } => Some(LeafKind::List {
                include_regex: include_regex.clone(),
                jobs: jobs.clone(),
            }),
            ViewDescription::All { .. } => Some(LeafKind::All),
            ViewDescription::Nested { .. } => None,
        }
    }

    fn view_kind(&self) -> ViewKind {
        match self {
            ViewDescription::Nested { default_view, .. } => ViewKind::Nested(NestedView {
                children: Vec::new(),
                default_view: default_view.clone().filter(|d| !d.trim().is_empty()),
            }),
            ViewDescription::List { .. } | ViewDescription::All { .. } => {
                ViewKind::Leaf(self.leaf_kind().unwrap_or(LeafKind::All))
            }
        }
    }
}

impl ViewTree {
    /// Build a whole tree from a description of its root, which must be nested.
    pub fn from_description(description: &ViewDescription) -> DomainResult<Self> {
        let ViewDescription::Nested {
            name,
            default_view,
            views,
        } = description
        else {
            return Err(DomainError::invalid_description(format!(
                "root view \"{}\" must be nested",
                description.name()
            )));
        };
        description.validate()?;

        let mut tree = ViewTree::new(name);
        let root = tree.root();
        tree.set_default_view(root, default_view.as_deref())?;
        for view in views {
            let top = tree.materialize(view, Some(root))?;
            tree.nested_mut(root)?.children.push(top);
        }
        Ok(tree)
    }

    /// Serialize the subtree rooted at `id`.
    pub fn describe(&self, id: ViewId) -> DomainResult<ViewDescription> {
        let node = self.node(id)?;
        Ok(match node.kind() {
            ViewKind::Nested(nested) => ViewDescription::Nested {
                name: node.name().to_string(),
                default_view: nested.default_view.clone(),
                views: nested
                    .children
                    .iter()
                    .map(|&child| self.describe(child))
                    .collect::<DomainResult<Vec<_>>>()?,
            },
            ViewKind::Leaf(LeafKind::List { include_regex, jobs }) => ViewDescription::List {
                name: node.name().to_string(),
                include_regex: include_regex.clone(),
                jobs: jobs.clone(),
            },
            ViewKind::Leaf(LeafKind::All) => ViewDescription::All {
                name: node.name().to_string(),
            },
        })
    }

    /// Build a description into the arena, depth first. Every descendant is
    /// owned by its structural parent; the top node gets `owner` but is not
    /// linked into any children list, so the caller decides where it goes.
    #[instrument(level = "trace", skip(self, description))]
    pub(crate) fn materialize(&mut self, description: &ViewDescription, owner: Option<ViewId>) -> DomainResult<ViewId> {
        let top = self.insert_node(description.name(), description.view_kind(), owner);

        // Reverse push so siblings are appended in document order
        let mut stack: Vec<(&ViewDescription, ViewId)> =
            description.views().iter().rev().map(|child| (child, top)).collect();

        while let Some((current, parent)) = stack.pop() {
            let idx = self.insert_node(current.name(), current.view_kind(), Some(parent));
            self.link_child(parent, idx)?;
            stack.extend(current.views().iter().rev().map(|child| (child, idx)));
        }

        Ok(top)
    }

    /// Add a whole described subtree as a new child of `parent`.
    pub fn add_description(&mut self, parent: ViewId, description: &ViewDescription) -> DomainResult<ViewId> {
        description.validate()?;
        self.nested(parent)?;
        if self.exists(parent, description.name()) {
            return Err(DomainError::DuplicateName(description.name().to_string()));
        }
        let top = self.materialize(description, Some(parent))?;
        self.nested_mut(parent)?.children.push(top);
        Ok(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
kind = "nested"
name = "nestedRoot"
default_view = "listViewlvl1"

[[views]]
kind = "list"
name = "listViewlvl1"
include_regex = "E.*"

[[views]]
kind = "nested"
name = "nestedViewlvl1"

[[views.views]]
kind = "all"
name = "everything"
"#;

    #[test]
    fn given_toml_document_when_parsing_then_builds_nested_description() {
        let description = ViewDescription::parse(DOC).unwrap();
        assert_eq!(description.name(), "nestedRoot");
        assert_eq!(description.views().len(), 2);
        assert_eq!(description.views()[1].views()[0], ViewDescription::all("everything"));
    }

    #[test]
    fn given_duplicate_siblings_when_validating_then_invalid_description() {
        let description = ViewDescription::nested(
            "top",
            vec![ViewDescription::all("x"), ViewDescription::list("x", None, &[])],
        );
        let err = description.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate view name \"x\""), "{err}");
    }

    #[test]
    fn given_bad_regex_deep_in_tree_when_validating_then_reports_path() {
        let description = ViewDescription::nested(
            "top",
            vec![ViewDescription::nested(
                "mid",
                vec![ViewDescription::list("bad", Some("("), &[])],
            )],
        );
        let err = description.validate().unwrap_err();
        assert!(err.to_string().contains("top/mid/bad"), "{err}");
    }

    #[test]
    fn given_unknown_kind_when_parsing_then_invalid_description() {
        let result = ViewDescription::parse("kind = \"pipeline\"\nname = \"p\"\n");
        assert!(matches!(result, Err(DomainError::InvalidDescription { .. })));
    }

    #[test]
    fn given_default_on_leaf_when_parsing_then_invalid_description() {
        let result = ViewDescription::parse("kind = \"list\"\nname = \"l\"\ndefault_view = \"x\"\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("default_view"), "{err}");
    }

    #[test]
    fn given_misspelled_views_table_when_parsing_then_invalid_description() {
        let document = "kind = \"nested\"\nname = \"A\"\n[[veiws]]\nkind = \"all\"\nname = \"B\"\n";
        let result = ViewDescription::parse(document);
        assert!(matches!(result, Err(DomainError::InvalidDescription { .. })), "{result:?}");
    }

    #[test]
    fn given_materialized_description_when_describing_then_round_trips() {
        let description = ViewDescription::parse(DOC).unwrap();
        let mut tree = ViewTree::new("root");
        let id = tree.add_description(tree.root(), &description).unwrap();

        assert_eq!(tree.describe(id).unwrap(), description);
        let reparsed = ViewDescription::parse(&description.to_document().unwrap()).unwrap();
        assert_eq!(reparsed, description);
    }
}
