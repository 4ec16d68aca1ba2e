//! Outcome of a single snapshot evaluation.

use std::fmt;
use std::path::PathBuf;

/// Terminal outcome of one evaluation.
///
/// Every variant except [`Verdict::Passed`] is a test failure, including the
/// recording variants: a freshly written reference has to be reviewed before
/// the test is allowed to pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The new image matches the stored reference.
    Passed,
    /// No reference existed; the new image was recorded at `path`.
    RecordedMissing { path: PathBuf },
    /// The reference did not match and was replaced by the new image.
    RecordedFailure { path: PathBuf },
    /// The reference exists and differs from the new image.
    NotMatching { composite: CompositeOutcome },
    /// The render step did not produce an image.
    RenderFailed { reason: String },
    /// The store could not be read or written, or has no reference.
    StorageFailure(StorageFailure),
}

impl Verdict {
    #[inline]
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Passed)
    }

    /// Short user-facing description.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Passed => "Snapshot matches.",
            Self::RecordedMissing { .. } => "Record missing snapshot",
            Self::RecordedFailure { .. } => "Recorded new snapshot over mismatched reference.",
            Self::NotMatching { .. } => "Snapshots do not match.",
            Self::RenderFailed { .. } => "Failed to create a snapshot image.",
            Self::StorageFailure(failure) => failure.message(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        match self {
            Self::Passed => Ok(()),
            Self::RecordedMissing { path } | Self::RecordedFailure { path } => {
                write!(f, " ({})", path.display())
            }
            Self::NotMatching { composite } => match composite {
                CompositeOutcome::NotRequested => Ok(()),
                CompositeOutcome::Written(path) => {
                    write!(f, " Comparison saved to {}", path.display())
                }
                CompositeOutcome::Failed(reason) => {
                    write!(f, " Comparison image could not be saved: {reason}")
                }
            },
            Self::RenderFailed { reason } => write!(f, " {reason}"),
            Self::StorageFailure(failure) => write!(f, " {failure}"),
        }
    }
}

/// What happened to the diagnostic composite of a mismatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositeOutcome {
    /// Configuration did not ask for one.
    NotRequested,
    /// Written beside the reference.
    Written(PathBuf),
    /// Composing or writing failed. The mismatch still stands.
    Failed(String),
}

/// Storage-level failure detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageFailure {
    /// No reference exists and recording missing snapshots is off.
    MissingBaseline {
        path: PathBuf,
        /// The new image was written for inspection.
        baseline_written: bool,
    },
    /// Directory or file I/O failed.
    Io { path: PathBuf, message: String },
    /// The stored reference could not be decoded.
    Decode { path: PathBuf, message: String },
}

impl StorageFailure {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingBaseline { .. } => "Failed to find an existing snapshot.",
            Self::Io { .. } => "Failed to access the snapshot store.",
            Self::Decode { .. } => "Failed to read the saved snapshot.",
        }
    }
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBaseline {
                path,
                baseline_written,
            } => {
                write!(f, "{}", path.display())?;
                if *baseline_written {
                    write!(f, " (new image written for inspection)")?;
                }
                Ok(())
            }
            Self::Io { path, message } | Self::Decode { path, message } => {
                write!(f, "{}: {message}", path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_failures() -> Vec<Verdict> {
        let path = PathBuf::from("snaps/g/n.png");
        vec![
            Verdict::RecordedMissing { path: path.clone() },
            Verdict::RecordedFailure { path: path.clone() },
            Verdict::NotMatching {
                composite: CompositeOutcome::NotRequested,
            },
            Verdict::RenderFailed {
                reason: "no surface".into(),
            },
            Verdict::StorageFailure(StorageFailure::MissingBaseline {
                path: path.clone(),
                baseline_written: false,
            }),
            Verdict::StorageFailure(StorageFailure::Io {
                path: path.clone(),
                message: "denied".into(),
            }),
            Verdict::StorageFailure(StorageFailure::Decode {
                path,
                message: "bad header".into(),
            }),
        ]
    }

    #[test]
    fn only_passed_is_success() {
        assert!(!Verdict::Passed.is_failure());
        assert!(all_failures().iter().all(Verdict::is_failure));
    }

    #[test]
    fn failure_messages_are_distinct() {
        let messages: Vec<_> = all_failures().iter().map(Verdict::message).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn composite_failure_keeps_mismatch_message() {
        let verdict = Verdict::NotMatching {
            composite: CompositeOutcome::Failed("disk full".into()),
        };
        let text = verdict.to_string();
        assert!(text.starts_with("Snapshots do not match."));
        assert!(text.contains("disk full"));
    }
}
