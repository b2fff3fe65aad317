//! Nested views: a tree of named job views.
//!
//! Nested views own child views, resolve a default child, roll up the worst
//! outcome of the jobs below them and can be reconfigured wholesale from a
//! TOML document.
//!
//! Layers:
//! - [`domain`]: the arena-backed view tree and its invariants
//! - [`application`]: services over a shared, lock-protected tree
//! - [`infrastructure`]: persistence, the job catalog and wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
