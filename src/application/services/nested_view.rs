//! Navigation and configuration of nested views.

use tracing::debug;

use crate::application::context::ViewContext;
use crate::application::ApplicationResult;
use crate::domain::{
    DefaultOption, DomainError, FormValidation, ViewDescription, ViewId, ViewTemplate,
};

/// Read-only summary of one view, detached from the tree lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSummary {
    pub id: ViewId,
    pub name: String,
    pub type_name: &'static str,
    /// Slash-separated path from the root
    pub path: String,
    pub owner: Option<ViewId>,
    pub default_view: Option<String>,
}

/// Service for the host's navigation and configuration requests.
pub struct NestedViewService {
    ctx: ViewContext,
}

impl NestedViewService {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ViewContext {
        &self.ctx
    }

    pub fn root(&self) -> ApplicationResult<ViewId> {
        self.ctx.with_tree(|tree| tree.root())
    }

    pub fn resolve_path(&self, path: &str) -> ApplicationResult<ViewId> {
        Ok(self.ctx.with_tree(|tree| tree.resolve_path(path))??)
    }

    pub fn summary(&self, id: ViewId) -> ApplicationResult<ViewSummary> {
        let tree = self.ctx.read()?;
        let node = tree.node(id)?;
        Ok(ViewSummary {
            id,
            name: node.name().to_string(),
            type_name: node.type_name(),
            path: tree.path_of(id).unwrap_or_default(),
            owner: node.owner(),
            default_view: tree.default_view(id).map(str::to_string),
        })
    }

    pub fn get_child(&self, id: ViewId, name: &str) -> ApplicationResult<Option<ViewId>> {
        let tree = self.ctx.read()?;
        tree.node(id)?;
        Ok(tree.get_child(id, name))
    }

    /// Children in insertion order.
    pub fn list_children(&self, id: ViewId) -> ApplicationResult<Vec<ViewId>> {
        let tree = self.ctx.read()?;
        tree.node(id)?;
        Ok(tree.list_children(id))
    }

    pub fn resolve_default(&self, id: ViewId) -> ApplicationResult<Option<ViewId>> {
        let tree = self.ctx.read()?;
        tree.node(id)?;
        Ok(tree.resolve_default(id))
    }

    pub fn default_candidates(&self, id: ViewId) -> ApplicationResult<Vec<DefaultOption>> {
        Ok(self.ctx.read()?.default_candidates(id)?)
    }

    pub fn set_default_view(&self, id: ViewId, name: Option<&str>) -> ApplicationResult<()> {
        debug!("set_default_view: {:?} -> {:?}", id, name);
        Ok(self.ctx.write()?.set_default_view(id, name)?)
    }

    /// Validate a name typed into the "new view" or "rename" form.
    pub fn check_name_available(
        &self,
        id: ViewId,
        candidate: Option<&str>,
        excluding_self: Option<&str>,
    ) -> ApplicationResult<FormValidation> {
        let tree = self.ctx.read()?;
        tree.node(id)?;
        Ok(tree.check_name_available(id, candidate, excluding_self))
    }

    pub fn add_view(&self, parent: ViewId, name: &str, template: ViewTemplate) -> ApplicationResult<ViewId> {
        debug!("add_view: {} under {:?}", name, parent);
        Ok(self.ctx.write()?.add_view(parent, name, template)?)
    }

    /// Create a child from a document, like "copy existing view".
    pub fn add_description(&self, parent: ViewId, document: &str) -> ApplicationResult<ViewId> {
        let description = ViewDescription::parse(document)?;
        debug!("add_description: {} under {:?}", description.name(), parent);
        Ok(self.ctx.write()?.add_description(parent, &description)?)
    }

    pub fn remove_view(&self, parent: ViewId, name: &str) -> ApplicationResult<bool> {
        debug!("remove_view: {} under {:?}", name, parent);
        Ok(self.ctx.write()?.remove_view(parent, name)?)
    }

    pub fn rename_view(&self, parent: ViewId, old_name: &str, new_name: &str) -> ApplicationResult<()> {
        debug!("rename_view: {} -> {} under {:?}", old_name, new_name, parent);
        Ok(self.ctx.write()?.rename_view(parent, old_name, new_name)?)
    }

    pub fn move_view(&self, id: ViewId, new_parent: ViewId) -> ApplicationResult<()> {
        debug!("move_view: {:?} -> {:?}", id, new_parent);
        Ok(self.ctx.write()?.move_view(id, new_parent)?)
    }

    /// Current configuration of a view as a document.
    pub fn describe(&self, id: ViewId) -> ApplicationResult<String> {
        let description = self.ctx.read()?.describe(id)?;
        Ok(description.to_document()?)
    }

    /// Replace a view's whole configuration from a document.
    ///
    /// The document is parsed before the write lock is taken; its top-level
    /// name is replaced by the view's own name before validation. A rejected
    /// document leaves the tree untouched. Returns the handle of the
    /// replacement, the old handle is stale afterwards.
    pub fn replace_from_description(&self, id: ViewId, document: &str) -> ApplicationResult<ViewId> {
        let description = ViewDescription::from_toml(document)?;
        debug!(
            "replace_from_description: {:?} with {} ({} direct children)",
            id,
            description.name(),
            description.views().len()
        );
        let mut tree = self.ctx.write()?;
        if !tree.contains(id) {
            return Err(DomainError::StaleView.into());
        }
        Ok(tree.replace_subtree(id, &description)?)
    }
}
