//! Aggregate status of nested views.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::application::context::ViewContext;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{worse_of, worst_of_items, LeafKind, Outcome, ViewId};
use crate::infrastructure::traits::WorkItemSource;

/// How source failures are handled during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregationMode {
    /// A failing leaf contributes nothing and is reported in the leaf status
    #[default]
    BestEffort,
    /// The first failing leaf fails the whole aggregation
    Strict,
}

/// Status of one leaf view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafStatus {
    pub id: ViewId,
    pub path: String,
    pub worst: Option<Outcome>,
    /// Source failure message, best-effort mode only
    pub error: Option<String>,
}

/// Aggregate plus the per-leaf breakdown it was folded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub worst: Option<Outcome>,
    pub leaves: Vec<LeafStatus>,
}

/// Leaf data copied out of the tree so the lock can be released before
/// the source is queried.
#[derive(Debug, Clone)]
struct LeafSnapshot {
    id: ViewId,
    path: String,
    kind: LeafKind,
}

/// Service computing worst outcomes over the leaves of a subtree.
pub struct StatusService {
    ctx: ViewContext,
    source: Arc<dyn WorkItemSource>,
    mode: AggregationMode,
}

impl StatusService {
    pub fn new(ctx: ViewContext, source: Arc<dyn WorkItemSource>) -> Self {
        Self::with_mode(ctx, source, AggregationMode::default())
    }

    pub fn with_mode(ctx: ViewContext, source: Arc<dyn WorkItemSource>, mode: AggregationMode) -> Self {
        Self { ctx, source, mode }
    }

    /// Worst outcome of all enabled, already-run jobs below `id`.
    ///
    /// None means no job contributed: an empty subtree, nested views
    /// holding only empty nested views, or jobs that never finished a run.
    pub fn worst_result(&self, id: ViewId) -> ApplicationResult<Option<Outcome>> {
        Ok(self.status_report(id)?.worst)
    }

    pub fn status_report(&self, id: ViewId) -> ApplicationResult<StatusReport> {
        let leaves = self.snapshot_leaves(id)?;
        debug!("status_report: {:?} has {} leaf views", id, leaves.len());

        let statuses: Vec<ApplicationResult<LeafStatus>> =
            leaves.par_iter().map(|leaf| self.leaf_status(leaf)).collect();

        // Collect statuses, propagate first error (strict mode only)
        let mut report_leaves = Vec::with_capacity(statuses.len());
        for status in statuses {
            report_leaves.push(status?);
        }

        let worst = report_leaves
            .par_iter()
            .map(|leaf| leaf.worst)
            .reduce(|| None, worse_of);

        debug!("status_report: {:?} -> {:?}", id, worst);
        Ok(StatusReport {
            worst,
            leaves: report_leaves,
        })
    }

    fn snapshot_leaves(&self, id: ViewId) -> ApplicationResult<Vec<LeafSnapshot>> {
        let tree = self.ctx.read()?;
        tree.node(id)?;
        Ok(tree
            .leaf_views(id)
            .into_iter()
            .filter_map(|leaf| {
                let kind = tree.get(leaf)?.leaf_kind()?.clone();
                Some(LeafSnapshot {
                    id: leaf,
                    path: tree.path_of(leaf).unwrap_or_default(),
                    kind,
                })
            })
            .collect())
    }

    fn leaf_status(&self, leaf: &LeafSnapshot) -> ApplicationResult<LeafStatus> {
        match self.source.list_items(&leaf.kind) {
            Ok(items) => Ok(LeafStatus {
                id: leaf.id,
                path: leaf.path.clone(),
                worst: worst_of_items(&items),
                error: None,
            }),
            Err(e) if self.mode == AggregationMode::Strict => Err(ApplicationError::Source(e)),
            Err(e) => {
                warn!("status of {} skipped: {}", leaf.path, e);
                Ok(LeafStatus {
                    id: leaf.id,
                    path: leaf.path.clone(),
                    worst: None,
                    error: Some(e.to_string()),
                })
            }
        }
    }
}
