//! Storage access for input data and model artifacts
//!
//! A [`Location`] is parsed from a user-supplied path or URI. Plain paths and
//! `file://` URLs (including FUSE-mounted buckets such as `/gcs/<bucket>/...`)
//! go through [`LocalStorage`]; `gs://` and `s3://` URIs go
//! through [`ObjectStorage`].

mod local;
mod object;

pub use local::LocalStorage;
pub use object::ObjectStorage;

use crate::error::{Result, TrainerError};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// URL schemes served by [`ObjectStorage`]
const OBJECT_SCHEMES: [&str; 2] = ["gs", "s3"];

/// Where a file or directory lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Object(Url),
}

impl Location {
    /// Parse a path or URI.
    ///
    /// Only `gs://` and `s3://` URIs name object locations; anything else that
    /// is not a `file://` URL is a local path (`data:v2.csv`, `C:\data.csv`).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(TrainerError::ConfigError("empty path".to_string()));
        }

        match Url::parse(raw) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Location::Local)
                .map_err(|_| TrainerError::ConfigError(format!("invalid file URL: {}", raw))),
            Ok(url) if OBJECT_SCHEMES.contains(&url.scheme()) => Ok(Location::Object(url)),
            _ => Ok(Location::Local(PathBuf::from(raw))),
        }
    }

    /// Location of `name` inside this directory location
    pub fn join(&self, name: &str) -> Self {
        match self {
            Location::Local(path) => Location::Local(path.join(name)),
            Location::Object(url) => {
                let mut url = url.clone();
                let base = url.path().trim_end_matches('/').to_string();
                url.set_path(&format!("{}/{}", base, name));
                Location::Object(url)
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Object(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Object(url) => write!(f, "{}", url),
        }
    }
}

/// Byte-level access to a storage backend
pub trait Storage {
    /// Read the whole object or file
    fn read(&self, location: &Location) -> Result<Vec<u8>>;

    /// Write `bytes`, replacing any existing content at `location`
    fn write(&self, location: &Location, bytes: &[u8]) -> Result<()>;

    /// Make sure a directory (or prefix) exists
    fn ensure_dir(&self, location: &Location) -> Result<()>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Pick the backend that serves `location`.
pub fn for_location(location: &Location) -> Result<Box<dyn Storage>> {
    match location {
        Location::Local(_) => Ok(Box::new(LocalStorage::new())),
        Location::Object(url) => Ok(Box::new(ObjectStorage::from_url(url)?)),
    }
}
