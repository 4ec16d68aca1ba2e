//! Assertion helpers for snapshot tests.
//!
//! A [`SnapshotSuite`] pairs an engine with a table of scoped configuration
//! overrides, so tests only name the snapshot and hand over an image.

use std::path::{Path, PathBuf};

use shutter_core::{ConfigScopes, Configuration, RasterImage, RenderResult, SnapshotIdentity, Verdict};

use crate::engine::SnapshotEngine;
use crate::store::{FsReferenceStore, ReferenceStore};
use crate::SnapshotFailure;

/// Something that produces the image under test.
pub trait Render {
    fn render(self) -> RenderResult;
}

impl<F> Render for F
where
    F: FnOnce() -> RenderResult,
{
    fn render(self) -> RenderResult {
        self()
    }
}

impl Render for RasterImage {
    fn render(self) -> RenderResult {
        Ok(self)
    }
}

/// Snapshot assertions sharing one store and one configuration table.
pub struct SnapshotSuite<S = FsReferenceStore> {
    engine: SnapshotEngine<S>,
    scopes: ConfigScopes,
}

impl SnapshotSuite<FsReferenceStore> {
    /// Suite storing snapshots under `root`, configured from the default
    /// configuration plus environment overrides.
    pub fn new(root: impl Into<PathBuf>) -> shutter_core::Result<Self> {
        let global = Configuration::default().with_env_overrides()?;
        Ok(Self::with_store(
            FsReferenceStore::new(root),
            ConfigScopes::new(global),
        ))
    }

    /// Suite storing snapshots next to `test_file`.
    pub fn for_test_file(test_file: impl AsRef<Path>) -> shutter_core::Result<Self> {
        let global = Configuration::default().with_env_overrides()?;
        Ok(Self::with_store(
            FsReferenceStore::for_test_file(test_file),
            ConfigScopes::new(global),
        ))
    }
}

impl<S: ReferenceStore> SnapshotSuite<S> {
    pub const fn with_store(store: S, scopes: ConfigScopes) -> Self {
        Self {
            engine: SnapshotEngine::new(store),
            scopes,
        }
    }

    /// Replace the configuration table.
    #[must_use]
    pub fn with_scopes(mut self, scopes: ConfigScopes) -> Self {
        self.scopes = scopes;
        self
    }

    pub const fn engine(&self) -> &SnapshotEngine<S> {
        &self.engine
    }

    pub const fn scopes(&self) -> &ConfigScopes {
        &self.scopes
    }

    /// Evaluate one snapshot with its resolved configuration.
    pub fn check(&self, identity: &SnapshotIdentity, render: impl Render) -> Verdict {
        let config = self.scopes.resolve(identity);
        self.engine.evaluate(render.render(), identity, config)
    }

    /// Like [`Self::check`], but any verdict other than `Passed` is an error.
    pub fn verify(
        &self,
        identity: &SnapshotIdentity,
        render: impl Render,
    ) -> Result<(), SnapshotFailure> {
        match self.check(identity, render) {
            Verdict::Passed => Ok(()),
            verdict => Err(SnapshotFailure {
                identity: identity.clone(),
                verdict,
            }),
        }
    }

    /// Panic with the verdict message unless the snapshot passes.
    #[track_caller]
    pub fn assert(&self, identity: &SnapshotIdentity, render: impl Render) {
        if let Err(failure) = self.verify(identity, render) {
            panic!("{failure}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shutter_core::{RecordMode, RenderError};

    fn image(shade: u8) -> RasterImage {
        RasterImage::from_rgba8(4, 4, [shade, shade, shade, 255].repeat(16)).unwrap()
    }

    fn suite(root: &Path) -> SnapshotSuite {
        SnapshotSuite::with_store(
            FsReferenceStore::new(root),
            ConfigScopes::new(Configuration::new(RecordMode::ALL)),
        )
    }

    #[test]
    fn first_run_fails_then_passes() {
        let dir = tempfile::tempdir().unwrap();
        let suite = suite(dir.path());
        let id = SnapshotIdentity::new("suite", "first").unwrap();

        let failure = suite.verify(&id, image(10)).unwrap_err();
        assert!(matches!(failure.verdict, Verdict::RecordedMissing { .. }));
        suite.assert(&id, image(10));
    }

    #[test]
    fn closures_render() {
        let dir = tempfile::tempdir().unwrap();
        let suite = suite(dir.path());
        let id = SnapshotIdentity::new("suite", "closure").unwrap();

        let verdict = suite.check(&id, || -> RenderResult { Err(RenderError::new("no view")) });
        assert!(matches!(verdict, Verdict::RenderFailed { .. }));

        let verdict = suite.check(&id, || -> RenderResult { Ok(image(20)) });
        assert!(matches!(verdict, Verdict::RecordedMissing { .. }));
    }

    #[test]
    fn scoped_configuration_applies() {
        let dir = tempfile::tempdir().unwrap();
        let strict = SnapshotIdentity::new("suite", "strict").unwrap();
        let relaxed = SnapshotIdentity::new("suite", "relaxed").unwrap();
        let suite = suite(dir.path()).with_scopes(
            ConfigScopes::new(Configuration::new(RecordMode::ALL))
                .with_test(strict.clone(), Configuration::new(RecordMode::NEVER)),
        );

        assert!(matches!(
            suite.check(&strict, image(30)),
            Verdict::StorageFailure(_)
        ));
        assert!(matches!(
            suite.check(&relaxed, image(30)),
            Verdict::RecordedMissing { .. }
        ));
    }

    #[test]
    #[should_panic(expected = "Snapshots do not match.")]
    fn assert_panics_on_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let suite = suite(dir.path());
        let id = SnapshotIdentity::new("suite", "changed").unwrap();

        let _ = suite.check(&id, image(40));
        suite.assert(&id, image(41));
    }
}
