//! Persistence of the whole view tree as one description document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, IoResultExt};
use crate::domain::{ViewDescription, ViewTree};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::FileSystem;

pub struct TreeStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    root_name: String,
}

impl TreeStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: &Path, root_name: &str) -> Self {
        Self {
            fs,
            path: path.to_path_buf(),
            root_name: root_name.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the tree; a missing document yields an empty root.
    pub fn load(&self) -> InfraResult<ViewTree> {
        if !self.fs.exists(&self.path) {
            debug!("load: {} missing, starting empty", self.path.display());
            return Ok(ViewTree::new(&self.root_name));
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read tree document", &self.path)?;
        let description = ViewDescription::parse(&content).map_err(ApplicationError::from)?;
        let tree = ViewTree::from_description(&description).map_err(ApplicationError::from)?;
        debug!("load: {} views from {}", tree.len(), self.path.display());
        Ok(tree)
    }

    pub fn save(&self, tree: &ViewTree) -> InfraResult<()> {
        let document = tree
            .describe(tree.root())
            .and_then(|description| description.to_document())
            .map_err(ApplicationError::from)?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create tree directory", &self.path)?;
        self.fs
            .write(&self.path, &document)
            .with_path_context("write tree document", &self.path)?;
        debug!("save: {} views to {}", tree.len(), self.path.display());
        Ok(())
    }
}
