//! In-memory job catalog used as the work-item source.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{LeafKind, Outcome, WorkItem};
use crate::infrastructure::traits::{SourceError, WorkItemSource};

/// On-disk catalog layout: a list of `[[jobs]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub jobs: Vec<WorkItem>,
}

/// Job list shared between the host (which records runs) and the views
/// (which read them). Job order is registration order.
#[derive(Debug, Default)]
pub struct JobCatalog {
    jobs: RwLock<Vec<WorkItem>>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<WorkItem>) -> Self {
        Self {
            jobs: RwLock::new(items),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, SourceError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| SourceError::new(format!("parse catalog: {e}")))?;
        Ok(Self::with_items(file.jobs))
    }

    pub fn to_toml(&self) -> Result<String, SourceError> {
        let file = CatalogFile {
            jobs: self.snapshot()?,
        };
        toml::to_string_pretty(&file).map_err(|e| SourceError::new(format!("serialize catalog: {e}")))
    }

    pub fn snapshot(&self) -> Result<Vec<WorkItem>, SourceError> {
        self.jobs
            .read()
            .map(|jobs| jobs.clone())
            .map_err(|_| SourceError::new("catalog lock poisoned"))
    }

    /// Register a job, replacing any job with the same name.
    pub fn upsert(&self, item: WorkItem) -> Result<(), SourceError> {
        let mut jobs = self
            .jobs
            .write()
            .map_err(|_| SourceError::new("catalog lock poisoned"))?;
        match jobs.iter_mut().find(|j| j.name == item.name) {
            Some(existing) => *existing = item,
            None => jobs.push(item),
        }
        Ok(())
    }

    /// Record a finished run.
    pub fn record_outcome(&self, name: &str, outcome: Outcome) -> Result<(), SourceError> {
        self.update(name, |job| job.last_outcome = Some(outcome))
    }

    pub fn set_disabled(&self, name: &str, disabled: bool) -> Result<(), SourceError> {
        self.update(name, |job| job.disabled = disabled)
    }

    fn update(&self, name: &str, apply: impl FnOnce(&mut WorkItem)) -> Result<(), SourceError> {
        let mut jobs = self
            .jobs
            .write()
            .map_err(|_| SourceError::new("catalog lock poisoned"))?;
        let job = jobs
            .iter_mut()
            .find(|j| j.name == name)
            .ok_or_else(|| SourceError::new(format!("unknown job: {name}")))?;
        apply(job);
        Ok(())
    }
}

impl WorkItemSource for JobCatalog {
    fn list_items(&self, leaf: &LeafKind) -> Result<Vec<WorkItem>, SourceError> {
        let jobs = self
            .jobs
            .read()
            .map_err(|_| SourceError::new("catalog lock poisoned"))?;

        let selected: Vec<WorkItem> = match leaf {
            LeafKind::All => jobs.clone(),
            LeafKind::List { jobs: names, .. } => {
                let pattern = leaf
                    .include_pattern()
                    .map_err(|e| SourceError::new(e.to_string()))?;
                jobs.iter()
                    .filter(|job| {
                        names.contains(&job.name)
                            || pattern.as_ref().is_some_and(|re| re.is_match(&job.name))
                    })
                    .cloned()
                    .collect()
            }
        };
        debug!("list_items: {} selected {} jobs", leaf.type_name(), selected.len());
        Ok(selected)
    }
}
