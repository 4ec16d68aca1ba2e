//! Record / compare decision procedure.

use std::path::Path;

use shutter_core::{
    CompositeOutcome, Configuration, MissingBaseline, RasterImage, RecordTrigger, RenderResult,
    Result, SnapshotError, SnapshotIdentity, StorageFailure, Verdict,
};
use shutter_diff::{compose, images_equal};
use tracing::{debug, info, warn};

use crate::store::{FsReferenceStore, ReferenceStore};

/// Evaluates rendered images against stored references.
///
/// The engine holds no state between calls apart from its store. It never
/// retries; re-running after accepting a new reference is the caller's job.
#[derive(Clone, Debug)]
pub struct SnapshotEngine<S = FsReferenceStore> {
    store: S,
}

impl<S: ReferenceStore> SnapshotEngine<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Decide the verdict for one snapshot, writing to the store as the
    /// configuration allows.
    ///
    /// # Arguments
    /// * `render` - Output of the render step
    /// * `identity` - Which snapshot this is
    /// * `config` - Resolved configuration for this snapshot
    pub fn evaluate(
        &self,
        render: RenderResult,
        identity: &SnapshotIdentity,
        config: &Configuration,
    ) -> Verdict {
        let image = match render {
            Ok(image) => image,
            Err(err) => {
                warn!(snapshot = %identity, "{err}");
                return Verdict::RenderFailed { reason: err.0 };
            }
        };

        let path = identity.snapshot_path(self.store.root(), &config.directory_name, config.format);
        match self.compare_or_record(&image, identity, config, &path) {
            Ok(verdict) => {
                debug!(snapshot = %identity, "{}", verdict.message());
                verdict
            }
            Err(err) => {
                warn!(snapshot = %identity, "{err}");
                Verdict::StorageFailure(storage_failure(err, &path))
            }
        }
    }

    fn compare_or_record(
        &self,
        image: &RasterImage,
        identity: &SnapshotIdentity,
        config: &Configuration,
        path: &Path,
    ) -> Result<Verdict> {
        self.store
            .ensure_directory(&identity.directory(self.store.root(), &config.directory_name))?;

        if !self.store.exists(path) {
            return self.handle_missing(image, config, path);
        }

        let reference = self.store.read(path, config.format)?;
        if images_equal(&reference, image)? {
            return Ok(Verdict::Passed);
        }

        let composite = if config.wants_failure_composite() {
            self.write_composite(&reference, image, identity, config)
        } else {
            CompositeOutcome::NotRequested
        };

        if config.overwrite_on_failure {
            self.store.write(image, path, config.format)?;
            info!(snapshot = %identity, "Replaced mismatched snapshot");
            return Ok(Verdict::RecordedFailure {
                path: path.to_path_buf(),
            });
        }

        Ok(Verdict::NotMatching { composite })
    }

    fn handle_missing(
        &self,
        image: &RasterImage,
        config: &Configuration,
        path: &Path,
    ) -> Result<Verdict> {
        if config.record.contains(RecordTrigger::OnMissing) {
            self.store.write(image, path, config.format)?;
            return Ok(Verdict::RecordedMissing {
                path: path.to_path_buf(),
            });
        }

        let baseline_written = match config.missing_baseline {
            MissingBaseline::Fail => false,
            MissingBaseline::WriteForInspection => {
                match self.store.write(image, path, config.format) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("Could not write snapshot for inspection: {err}");
                        false
                    }
                }
            }
        };

        Ok(Verdict::StorageFailure(StorageFailure::MissingBaseline {
            path: path.to_path_buf(),
            baseline_written,
        }))
    }

    /// Compose and store the mismatch composite. Failures are reported in the
    /// outcome and never change the verdict.
    fn write_composite(
        &self,
        reference: &RasterImage,
        image: &RasterImage,
        identity: &SnapshotIdentity,
        config: &Configuration,
    ) -> CompositeOutcome {
        let path = identity.failed_path(self.store.root(), &config.directory_name, config.format);
        let written = compose(reference, image)
            .and_then(|composite| self.store.write(&composite, &path, config.format));

        match written {
            Ok(()) => CompositeOutcome::Written(path),
            Err(err) => {
                warn!(snapshot = %identity, "Failed to save comparison image: {err}");
                CompositeOutcome::Failed(err.to_string())
            }
        }
    }
}

fn storage_failure(err: SnapshotError, snapshot_path: &Path) -> StorageFailure {
    match err {
        SnapshotError::NotFound(path) => StorageFailure::MissingBaseline {
            path,
            baseline_written: false,
        },
        SnapshotError::Decode { path, source } => StorageFailure::Decode {
            path,
            message: source.to_string(),
        },
        SnapshotError::Io { path, source } => StorageFailure::Io {
            path,
            message: source.to_string(),
        },
        other => StorageFailure::Io {
            path: snapshot_path.to_path_buf(),
            message: other.to_string(),
        },
    }
}
