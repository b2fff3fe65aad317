//! Work items and the worst-outcome fold over them.

use serde::{Deserialize, Serialize};

use crate::domain::outcome::{worse_of, Outcome};

/// Snapshot of one job as reported by a work-item source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
    /// Outcome of the last completed run; None if it never finished one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<Outcome>,
}

impl WorkItem {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            disabled: false,
            last_outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.last_outcome = Some(outcome);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// What this item adds to an aggregate: nothing when disabled or never run.
    pub fn contribution(&self) -> Option<Outcome> {
        if self.disabled {
            None
        } else {
            self.last_outcome
        }
    }
}

/// Worst outcome among eligible items, or None when no item is eligible.
pub fn worst_of_items<'a>(items: impl IntoIterator<Item = &'a WorkItem>) -> Option<Outcome> {
    items
        .into_iter()
        .map(WorkItem::contribution)
        .fold(None, worse_of)
}
