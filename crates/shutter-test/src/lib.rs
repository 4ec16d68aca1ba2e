//! Snapshot testing for rendered images.
//!
//! Provides the reference store, the record/compare engine and assertion
//! helpers for test suites.

pub mod engine;
pub mod harness;
pub mod store;

pub use engine::SnapshotEngine;
pub use harness::{Render, SnapshotSuite};
pub use store::{FsReferenceStore, ReferenceStore};

use shutter_core::{SnapshotIdentity, Verdict};
use thiserror::Error;

/// A snapshot assertion that did not pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{identity}: {verdict}")]
pub struct SnapshotFailure {
    pub identity: SnapshotIdentity,
    pub verdict: Verdict,
}
