//! Shared test setup: logging and small tree/source fixtures.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{LeafKind, Outcome, ViewTemplate, ViewTree, WorkItem};
use crate::infrastructure::catalog::JobCatalog;
use crate::infrastructure::traits::{SourceError, WorkItemSource};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let noisy_modules = ["rayon_core"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Tree used across tests:
///
/// ```text
/// root
/// ├── everything [all]
/// └── team [nested]
///     ├── builds [list: build-.*]
///     └── deploys [list: deploy-prod]
/// ```
pub fn sample_tree() -> ViewTree {
    let mut tree = ViewTree::new("root");
    let root = tree.root();
    tree.add_view(root, "everything", ViewTemplate::Leaf(LeafKind::All))
        .unwrap();
    let team = tree.add_view(root, "team", ViewTemplate::nested()).unwrap();
    tree.add_view(
        team,
        "builds",
        ViewTemplate::Leaf(LeafKind::list(Some("build-.*"), &[])),
    )
    .unwrap();
    tree.add_view(
        team,
        "deploys",
        ViewTemplate::Leaf(LeafKind::list(None, &["deploy-prod"])),
    )
    .unwrap();
    tree
}

/// Catalog matching [`sample_tree`].
pub fn sample_catalog() -> JobCatalog {
    JobCatalog::with_items(vec![
        WorkItem::new("build-app").with_outcome(Outcome::Success),
        WorkItem::new("build-lib").with_outcome(Outcome::Unstable),
        WorkItem::new("deploy-prod").with_outcome(Outcome::Failure),
        WorkItem::new("nightly").with_outcome(Outcome::Aborted).disabled(),
    ])
}

/// Catalog-backed source that fails for list views using `fail_pattern`.
pub struct FailingSource {
    pub inner: JobCatalog,
    pub fail_pattern: String,
}

impl FailingSource {
    pub fn new(inner: JobCatalog, fail_pattern: &str) -> Self {
        Self {
            inner,
            fail_pattern: fail_pattern.to_string(),
        }
    }
}

impl WorkItemSource for FailingSource {
    fn list_items(&self, leaf: &LeafKind) -> Result<Vec<WorkItem>, SourceError> {
        match leaf {
            LeafKind::List {
                include_regex: Some(pattern),
                ..
            } if *pattern == self.fail_pattern => {
                Err(SourceError::new(format!("backend down for {pattern}")))
            }
            _ => self.inner.list_items(leaf),
        }
    }
}
