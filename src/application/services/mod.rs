//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (WorkItemSource, FileSystem)
//! but are themselves concrete structs, not traits.

mod nested_view;
mod status;

pub use nested_view::{NestedViewService, ViewSummary};
pub use status::{AggregationMode, LeafStatus, StatusReport, StatusService};
