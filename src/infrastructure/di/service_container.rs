//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{NestedViewService, StatusService};
use crate::application::ViewContext;
use crate::config::Settings;
use crate::domain::ViewTree;
use crate::infrastructure::catalog::JobCatalog;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::store::TreeStore;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, WorkItemSource};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// The live view tree shared by all services
    pub ctx: ViewContext,

    pub store: TreeStore,
    pub catalog: Arc<JobCatalog>,
    pub views: NestedViewService,
    pub status: StatusService,
}

impl ServiceContainer {
    /// Create a container backed by the files named in `settings`.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::load(settings, Arc::new(RealFileSystem))
    }

    /// Load the tree document and job catalog through `fs`.
    pub fn load(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let store = TreeStore::new(Arc::clone(&fs), &settings.tree_file, &settings.root_name);
        let tree = store.load()?;

        let catalog = if fs.exists(&settings.catalog_file) {
            let content = fs.read_to_string(&settings.catalog_file).map_err(|e| {
                InfraError::io(format!("read catalog {}", settings.catalog_file.display()), e)
            })?;
            JobCatalog::from_toml(&content).map_err(crate::application::ApplicationError::from)?
        } else {
            debug!("catalog {} missing, no jobs", settings.catalog_file.display());
            JobCatalog::new()
        };

        Ok(Self::with_deps(settings, fs, tree, Arc::new(catalog)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        tree: ViewTree,
        catalog: Arc<JobCatalog>,
    ) -> Self {
        let store = TreeStore::new(Arc::clone(&fs), &settings.tree_file, &settings.root_name);
        let ctx = ViewContext::new(tree);
        let source: Arc<dyn WorkItemSource> = catalog.clone();
        let views = NestedViewService::new(ctx.clone());
        let status = StatusService::with_mode(ctx.clone(), source, settings.aggregation_mode());

        Self {
            settings: Arc::new(settings),
            fs,
            ctx,
            store,
            catalog,
            views,
            status,
        }
    }

    /// Persist the current tree.
    pub fn save_tree(&self) -> InfraResult<()> {
        let tree = self.ctx.read()?;
        self.store.save(&tree)
    }

    /// Persist the job catalog.
    pub fn save_catalog(&self) -> InfraResult<()> {
        let content = self
            .catalog
            .to_toml()
            .map_err(crate::application::ApplicationError::from)?;
        self.fs
            .ensure_parent(&self.settings.catalog_file)
            .and_then(|_| self.fs.write(&self.settings.catalog_file, &content))
            .map_err(|e| {
                InfraError::io(format!("write catalog {}", self.settings.catalog_file.display()), e)
            })
    }
}
