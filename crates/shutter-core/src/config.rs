//! Snapshot configuration and scoped overrides.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DIRECTORY_NAME;
use crate::error::{Result, SnapshotError};
use crate::identity::SnapshotIdentity;
use crate::raster::SnapshotFormat;

/// Environment variable selecting the record mode.
pub const ENV_RECORD: &str = "SHUTTER_RECORD";
/// Environment variable forcing composites on mismatch.
pub const ENV_SAVE_FAILURE_COMPARISON: &str = "SHUTTER_SAVE_FAILURE_COMPARISON";
/// Environment variable selecting the snapshot format.
pub const ENV_FORMAT: &str = "SHUTTER_FORMAT";

/// Situation in which a new image may be written to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTrigger {
    /// No reference exists yet.
    OnMissing,
    /// The reference exists but does not match.
    OnFailure,
}

/// Set of [`RecordTrigger`]s.
///
/// The two triggers are independent; every combination has a name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordMode {
    on_missing: bool,
    on_failure: bool,
}

impl RecordMode {
    /// Record missing references and composites for failures.
    pub const ALL: Self = Self {
        on_missing: true,
        on_failure: true,
    };
    /// Never write anything. Missing or mismatched snapshots fail hard,
    /// which keeps CI re-runs from passing on freshly recorded images.
    pub const NEVER: Self = Self {
        on_missing: false,
        on_failure: false,
    };
    /// Record only for mismatched snapshots.
    pub const FAILED: Self = Self {
        on_missing: false,
        on_failure: true,
    };
    /// Record only snapshots missing from disk.
    pub const MISSING: Self = Self {
        on_missing: true,
        on_failure: false,
    };

    #[inline]
    #[must_use]
    pub const fn contains(self, trigger: RecordTrigger) -> bool {
        match trigger {
            RecordTrigger::OnMissing => self.on_missing,
            RecordTrigger::OnFailure => self.on_failure,
        }
    }

    #[must_use]
    pub const fn with(mut self, trigger: RecordTrigger) -> Self {
        match trigger {
            RecordTrigger::OnMissing => self.on_missing = true,
            RecordTrigger::OnFailure => self.on_failure = true,
        }
        self
    }

    #[must_use]
    pub const fn without(mut self, trigger: RecordTrigger) -> Self {
        match trigger {
            RecordTrigger::OnMissing => self.on_missing = false,
            RecordTrigger::OnFailure => self.on_failure = false,
        }
        self
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.on_missing && !self.on_failure
    }

    /// Triggers contained in this set.
    pub fn iter(self) -> impl Iterator<Item = RecordTrigger> {
        [RecordTrigger::OnMissing, RecordTrigger::OnFailure]
            .into_iter()
            .filter(move |trigger| self.contains(*trigger))
    }

    const fn name(self) -> &'static str {
        match (self.on_missing, self.on_failure) {
            (true, true) => "all",
            (false, false) => "never",
            (false, true) => "failed",
            (true, false) => "missing",
        }
    }
}

impl BitOr for RecordMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            on_missing: self.on_missing || rhs.on_missing,
            on_failure: self.on_failure || rhs.on_failure,
        }
    }
}

impl BitOr<RecordTrigger> for RecordMode {
    type Output = Self;

    fn bitor(self, rhs: RecordTrigger) -> Self {
        self.with(rhs)
    }
}

impl From<RecordTrigger> for RecordMode {
    fn from(trigger: RecordTrigger) -> Self {
        Self::NEVER.with(trigger)
    }
}

impl FromIterator<RecordTrigger> for RecordMode {
    fn from_iter<I: IntoIterator<Item = RecordTrigger>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NEVER, Self::with)
    }
}

impl fmt::Display for RecordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordMode {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::ALL),
            "never" => Ok(Self::NEVER),
            "failed" => Ok(Self::FAILED),
            "missing" => Ok(Self::MISSING),
            other => Err(SnapshotError::InvalidConfig(format!(
                "unknown record mode '{other}' (expected all, never, failed or missing)"
            ))),
        }
    }
}

impl TryFrom<String> for RecordMode {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RecordMode> for String {
    fn from(mode: RecordMode) -> Self {
        mode.name().to_string()
    }
}

/// What to do when no reference exists and recording missing snapshots is
/// not allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingBaseline {
    /// Fail without touching the store.
    #[default]
    Fail,
    /// Write the new image so it can be inspected, then fail anyway.
    WriteForInspection,
}

/// Configuration for one snapshot evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Recording strategy.
    pub record: RecordMode,
    /// Container format of stored snapshots.
    pub format: SnapshotFormat,
    /// Name of the directory holding snapshot groups.
    pub directory_name: String,
    /// Write a comparison composite on mismatch even when
    /// [`RecordTrigger::OnFailure`] is not set.
    pub save_failure_comparison: bool,
    /// Behavior for a missing reference without [`RecordTrigger::OnMissing`].
    pub missing_baseline: MissingBaseline,
    /// Replace a mismatched reference with the new image.
    pub overwrite_on_failure: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            record: RecordMode::ALL,
            format: SnapshotFormat::Png,
            directory_name: DEFAULT_DIRECTORY_NAME.to_string(),
            save_failure_comparison: false,
            missing_baseline: MissingBaseline::Fail,
            overwrite_on_failure: false,
        }
    }
}

impl Configuration {
    /// Create a default configuration with the given record mode.
    #[must_use]
    pub fn new(record: RecordMode) -> Self {
        Self {
            record,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_record(mut self, record: RecordMode) -> Self {
        self.record = record;
        self
    }

    #[must_use]
    pub const fn with_format(mut self, format: SnapshotFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_directory_name(mut self, name: impl Into<String>) -> Self {
        self.directory_name = name.into();
        self
    }

    #[must_use]
    pub const fn with_save_failure_comparison(mut self, save: bool) -> Self {
        self.save_failure_comparison = save;
        self
    }

    #[must_use]
    pub const fn with_missing_baseline(mut self, policy: MissingBaseline) -> Self {
        self.missing_baseline = policy;
        self
    }

    #[must_use]
    pub const fn with_overwrite_on_failure(mut self, overwrite: bool) -> Self {
        self.overwrite_on_failure = overwrite;
        self
    }

    /// Whether a mismatch should produce a comparison composite.
    #[must_use]
    pub const fn wants_failure_composite(&self) -> bool {
        self.record.contains(RecordTrigger::OnFailure) || self.save_failure_comparison
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(record) = lookup(ENV_RECORD) {
            self.record = record.parse()?;
        }
        if let Some(format) = lookup(ENV_FORMAT) {
            self.format = format.parse()?;
        }
        if let Some(save) = lookup(ENV_SAVE_FAILURE_COMPARISON) {
            let save = save.trim();
            self.save_failure_comparison = !save.is_empty() && save != "0";
        }
        Ok(self)
    }
}

/// Layered configuration lookup.
///
/// Resolution order is test, then group, then the global default; the
/// nearest scope wins. The table is immutable once built and safe to share
/// between test threads.
#[derive(Clone, Debug, Default)]
pub struct ConfigScopes {
    global: Configuration,
    groups: HashMap<String, Configuration>,
    tests: HashMap<SnapshotIdentity, Configuration>,
}

impl ConfigScopes {
    #[must_use]
    pub fn new(global: Configuration) -> Self {
        Self {
            global,
            groups: HashMap::new(),
            tests: HashMap::new(),
        }
    }

    /// Override the configuration of every snapshot in `group`.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>, config: Configuration) -> Self {
        self.groups.insert(group.into(), config);
        self
    }

    /// Override the configuration of a single snapshot.
    #[must_use]
    pub fn with_test(mut self, identity: SnapshotIdentity, config: Configuration) -> Self {
        self.tests.insert(identity, config);
        self
    }

    #[must_use]
    pub const fn global(&self) -> &Configuration {
        &self.global
    }

    /// Configuration applying to `identity`.
    #[must_use]
    pub fn resolve(&self, identity: &SnapshotIdentity) -> &Configuration {
        self.tests
            .get(identity)
            .or_else(|| self.groups.get(identity.group()))
            .unwrap_or(&self.global)
    }
}
