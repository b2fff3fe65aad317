//! Domain layer: the view tree and its invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod default_view;
pub mod description;
pub mod display;
pub mod error;
pub mod outcome;
pub mod reconcile;
pub mod registry;
pub mod status;

pub use arena::{LeafKind, NestedView, ViewId, ViewKind, ViewNode, ViewTree};
pub use default_view::DefaultOption;
pub use description::ViewDescription;
pub use display::TreeNodeConvert;
pub use error::{DomainError, DomainResult};
pub use outcome::{worse_of, Outcome};
pub use registry::{validate_name, FormValidation, ValidationKind, ViewTemplate};
pub use status::{worst_of_items, WorkItem};
