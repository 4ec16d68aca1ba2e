//! Core types for the Shutter snapshot testing engine.
//!
//! This crate provides the data model shared by the rest of the workspace:
//! - Raster images and their canonical encoding
//! - Snapshot identities and storage paths
//! - Record modes, configuration and scoped overrides
//! - Verdicts and error types

pub mod config;
pub mod error;
pub mod identity;
pub mod raster;
pub mod verdict;

pub use config::{ConfigScopes, Configuration, MissingBaseline, RecordMode, RecordTrigger};
pub use error::{RenderError, Result, SnapshotError};
pub use identity::SnapshotIdentity;
pub use raster::{RasterImage, SnapshotFormat};
pub use verdict::{CompositeOutcome, StorageFailure, Verdict};

/// Output of the render step handed to the engine.
pub type RenderResult = std::result::Result<RasterImage, RenderError>;

/// Workspace-wide constants
pub mod constants {
    /// Default name of the directory holding snapshot groups
    pub const DEFAULT_DIRECTORY_NAME: &str = "__Snapshots__";
    /// Appended to the snapshot name for mismatch composites
    pub const FAILED_SUFFIX: &str = "-FAILED";
    /// Group used when a test file has no usable stem
    pub const UNKNOWN_GROUP: &str = "unknown";
}
