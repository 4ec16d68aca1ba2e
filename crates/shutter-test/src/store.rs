//! Reference image storage.
//!
//! A store maps paths to raster files. It does no caching and no locking:
//! two evaluations of the same snapshot must not run at the same time.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shutter_core::{RasterImage, Result, SnapshotError, SnapshotFormat};
use tracing::{debug, info};

/// Storage backend for reference images.
pub trait ReferenceStore {
    /// Base directory snapshot paths are resolved against.
    fn root(&self) -> &Path;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read and decode the image at `path`.
    ///
    /// A missing file is [`SnapshotError::NotFound`]; a file that exists but
    /// cannot be decoded (including an empty one) is
    /// [`SnapshotError::Decode`].
    fn read(&self, path: &Path, format: SnapshotFormat) -> Result<RasterImage>;

    /// Encode `image` and write it to `path`, replacing any existing file.
    fn write(&self, image: &RasterImage, path: &Path, format: SnapshotFormat) -> Result<()>;

    /// Create `path` and its parents. Succeeds if it already exists.
    fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Delete the file at `path`. Succeeds if there is none.
    fn remove(&self, path: &Path) -> Result<()>;
}

/// Store backed by the local file system.
#[derive(Clone, Debug)]
pub struct FsReferenceStore {
    root: PathBuf,
}

impl FsReferenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted next to the given test source file.
    pub fn for_test_file(test_file: impl AsRef<Path>) -> Self {
        let root = test_file
            .as_ref()
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self { root }
    }
}

impl ReferenceStore for FsReferenceStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path, format: SnapshotFormat) -> Result<RasterImage> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SnapshotError::NotFound(path.to_path_buf()),
            _ => SnapshotError::io(path, e),
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        RasterImage::decode(&bytes, format).map_err(|source| SnapshotError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, image: &RasterImage, path: &Path, format: SnapshotFormat) -> Result<()> {
        let bytes = image.encode(format)?;
        fs::write(path, bytes).map_err(|e| SnapshotError::io(path, e))?;
        info!("Snapshot saved: {}", path.display());
        Ok(())
    }

    fn ensure_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| SnapshotError::io(path, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RasterImage {
        RasterImage::from_rgba8(2, 2, [0, 128, 255, 255].repeat(4)).unwrap()
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        let path = dir.path().join("a.png");

        assert!(!store.exists(&path));
        store.write(&image(), &path, SnapshotFormat::Png).unwrap();
        assert!(store.exists(&path));

        let read = store.read(&path, SnapshotFormat::Png).unwrap();
        assert_eq!(read.to_rgba8(), image().to_rgba8());
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        let err = store
            .read(&dir.path().join("none.png"), SnapshotFormat::Png)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
    }

    #[test]
    fn empty_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        let path = dir.path().join("empty.png");
        fs::write(&path, b"").unwrap();

        assert!(store.exists(&path));
        let err = store.read(&path, SnapshotFormat::Png).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode { .. }));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        let nested = dir.path().join("__Snapshots__").join("group");
        store.ensure_directory(&nested).unwrap();
        store.ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn remove_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        let path = dir.path().join("gone.png");
        store.remove(&path).unwrap();

        store.write(&image(), &path, SnapshotFormat::Png).unwrap();
        store.remove(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn directory_is_not_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReferenceStore::new(dir.path());
        assert!(!store.exists(dir.path()));
    }

    #[test]
    fn root_from_test_file() {
        let store = FsReferenceStore::for_test_file("/work/tests/view_tests.rs");
        assert_eq!(store.root(), Path::new("/work/tests"));
    }
}
