//! Shared handle to the live view tree.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::ViewTree;

pub type SharedTree = Arc<RwLock<ViewTree>>;

/// The tree every service works on, passed explicitly instead of living in
/// a global. Cloning shares the same tree.
///
/// Reads (lookups, status leaf collection) take the read lock. Every
/// mutation, including a full subtree replacement, runs under one write
/// lock, so readers see either the old or the new subtree.
#[derive(Debug, Clone)]
pub struct ViewContext {
    tree: SharedTree,
}

impl ViewContext {
    pub fn new(tree: ViewTree) -> Self {
        Self {
            tree: Arc::new(RwLock::new(tree)),
        }
    }

    pub fn read(&self) -> ApplicationResult<RwLockReadGuard<'_, ViewTree>> {
        self.tree.read().map_err(|_| ApplicationError::LockPoisoned)
    }

    pub fn write(&self) -> ApplicationResult<RwLockWriteGuard<'_, ViewTree>> {
        self.tree.write().map_err(|_| ApplicationError::LockPoisoned)
    }

    /// Run `f` against a read-locked tree.
    pub fn with_tree<T>(&self, f: impl FnOnce(&ViewTree) -> T) -> ApplicationResult<T> {
        Ok(f(&*self.read()?))
    }
}
