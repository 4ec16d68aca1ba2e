//! Snapshot identities and their storage locations.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{FAILED_SUFFIX, UNKNOWN_GROUP};
use crate::error::{Result, SnapshotError};
use crate::raster::SnapshotFormat;

/// Names one snapshot assertion.
///
/// `group` usually identifies the test file or suite and `name` the assertion
/// within it. Both must be usable as a single path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotIdentity {
    group: String,
    name: String,
}

impl SnapshotIdentity {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let group = group.into();
        let name = name.into();
        validate_component("group", &group)?;
        validate_component("name", &name)?;
        Ok(Self { group, name })
    }

    /// Identity for a snapshot asserted from the test file at `test_file`.
    ///
    /// The group is the file name up to its first `.`, so `tests/view.rs`
    /// and `tests/view.snap.rs` both land in group `view`.
    pub fn for_test_file(test_file: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        Self::new(test_file_stem(test_file.as_ref()), name)
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding every snapshot of this identity's group.
    #[must_use]
    pub fn directory(&self, root: &Path, directory_name: &str) -> PathBuf {
        root.join(directory_name).join(&self.group)
    }

    /// Location of the accepted reference image.
    #[must_use]
    pub fn snapshot_path(&self, root: &Path, directory_name: &str, format: SnapshotFormat) -> PathBuf {
        self.directory(root, directory_name)
            .join(format!("{}.{}", self.name, format.extension()))
    }

    /// Location of the diagnostic composite written on mismatch.
    #[must_use]
    pub fn failed_path(&self, root: &Path, directory_name: &str, format: SnapshotFormat) -> PathBuf {
        self.directory(root, directory_name).join(format!(
            "{}{FAILED_SUFFIX}.{}",
            self.name,
            format.extension()
        ))
    }
}

impl fmt::Display for SnapshotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

fn validate_component(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SnapshotError::InvalidIdentity(format!("{what} is empty")));
    }
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(SnapshotError::InvalidIdentity(format!(
            "{what} '{value}' is not a single path component"
        )));
    }
    Ok(())
}

fn test_file_stem(test_file: &Path) -> String {
    test_file
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(UNKNOWN_GROUP)
        .to_string()
}
