//! Access to documents and images by location.
//!
//! The builder and the view never touch the file system directly. They ask a
//! [`ResourceOpener`] for the bytes behind a location string, which lets an
//! embedding application serve resources from an archive, a cache or memory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quire_common::data_url::{DataUrl, is_data_url};

/// Supplies the bytes of documents and images.
pub trait ResourceOpener {
    /// Read the whole resource at `location`. Locations are already
    /// resolved against the referring document and carry no `#fragment`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource does not exist or cannot be read.
    fn open(&self, location: &str) -> io::Result<Vec<u8>>;
}

/// Opens `data:` URLs inline and everything else from the file system,
/// relative locations against an optional root directory.
#[derive(Debug, Clone, Default)]
pub struct FileSystemOpener {
    root: Option<PathBuf>,
}

impl FileSystemOpener {
    /// An opener that resolves relative paths against the working directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// An opener that resolves relative paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceOpener for FileSystemOpener {
    fn open(&self, location: &str) -> io::Result<Vec<u8>> {
        if is_data_url(location) {
            return DataUrl::parse(location)
                .and_then(|url| url.decode())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        }
        fs::read(self.path_for(location))
    }
}

/// Serves resources from memory. Useful for embedding and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryOpener {
    /// An empty opener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes served for `location`.
    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let _ = self.resources.insert(location.into(), bytes.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }
}

impl ResourceOpener for MemoryOpener {
    fn open(&self, location: &str) -> io::Result<Vec<u8>> {
        self.resources.get(location).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no resource '{location}'"))
        })
    }
}
