//! Local filesystem backend

use super::{Location, Storage};
use crate::error::{Result, TrainerError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem storage. Also serves FUSE-mounted buckets.
#[derive(Debug, Default, Clone)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn path<'a>(&self, location: &'a Location) -> Result<&'a Path> {
        match location {
            Location::Local(path) => Ok(path),
            Location::Object(url) => Err(TrainerError::ConfigError(format!(
                "local storage cannot serve {}",
                url
            ))),
        }
    }
}

/// Sibling temp path in the same directory, so the final rename stays on one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()))
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl Storage for LocalStorage {
    fn read(&self, location: &Location) -> Result<Vec<u8>> {
        let path = self.path(location)?;
        fs::read(path).map_err(|e| TrainerError::load(path.display().to_string(), e))
    }

    fn write(&self, location: &Location, bytes: &[u8]) -> Result<()> {
        let path = self.path(location)?;
        let tmp = temp_path(path);
        debug!(tmp = %tmp.display(), bytes = bytes.len(), "writing temp file");

        let result = write_and_sync(&tmp, bytes).and_then(|_| fs::rename(&tmp, path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(TrainerError::save(path.display().to_string(), e));
        }
        Ok(())
    }

    fn ensure_dir(&self, location: &Location) -> Result<()> {
        let path = self.path(location)?;
        fs::create_dir_all(path).map_err(|e| TrainerError::save(path.display().to_string(), e))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Location::Local(dir.path().join("blob.bin"));
        let storage = LocalStorage::new();

        storage.write(&loc, b"abc").unwrap();
        assert_eq!(storage.read(&loc).unwrap(), b"abc");

        storage.write(&loc, b"replaced").unwrap();
        assert_eq!(storage.read(&loc).unwrap(), b"replaced");
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Location::Local(dir.path().join("model.joblib"));
        LocalStorage::new().write(&loc, b"model").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["model.joblib"]);
    }

    #[test]
    fn test_write_into_missing_dir_fails_as_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Location::Local(dir.path().join("nope").join("model.joblib"));
        let err = LocalStorage::new().write(&loc, b"model").unwrap_err();
        assert!(matches!(err, TrainerError::SaveFailure { .. }));
    }

    #[test]
    fn test_read_missing_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Location::Local(dir.path().join("missing.csv"));
        let err = LocalStorage::new().read(&loc).unwrap_err();
        match err {
            TrainerError::LoadFailure { path, .. } => assert!(path.ends_with("missing.csv")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ensure_dir_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let storage = LocalStorage::new();
        storage.ensure_dir(&Location::Local(nested.clone())).unwrap();
        assert!(nested.is_dir());
        // idempotent
        storage.ensure_dir(&Location::Local(nested)).unwrap();
    }
}
