//! Cache backends for reflection data.
//!
//! Entries are opaque byte blobs keyed by identifier. Reflection data is
//! encoded with `MessagePack` using named fields. A frozen backend rejects
//! writes until it is flushed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use flowmeta_foundation::{Error, ErrorKind, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

const FROZEN_MARKER: &str = ".frozen";

/// Encodes a value using `MessagePack` with named fields.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Decodes a `MessagePack` blob.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

fn validate_identifier(identifier: &str) -> Result<()> {
    let valid = !identifier.is_empty()
        && identifier.len() <= 250
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '%' | '-' | '&'));
    if valid {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::InvalidCacheIdentifier(
            identifier.to_string(),
        )))
    }
}

/// A key-value store for cache blobs.
pub trait CacheBackend: Send + Sync {
    /// Reads an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>>;

    /// Writes an entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is frozen or the storage cannot be written.
    fn set(&self, identifier: &str, data: Vec<u8>) -> Result<()>;

    /// Returns true if the entry exists.
    fn has(&self, identifier: &str) -> bool;

    /// Removes an entry; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is frozen or the storage cannot be written.
    fn remove(&self, identifier: &str) -> Result<bool>;

    /// Removes all entries and unfreezes the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn flush(&self) -> Result<()>;

    /// Freezes the backend; later writes fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn freeze(&self) -> Result<()>;

    /// Returns true once frozen.
    fn is_frozen(&self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, Vec<u8>>,
    frozen: bool,
}

/// An in-memory backend. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().entries.get(identifier).cloned())
    }

    fn set(&self, identifier: &str, data: Vec<u8>) -> Result<()> {
        validate_identifier(identifier)?;
        let mut state = self.lock();
        if state.frozen {
            return Err(Error::new(ErrorKind::CacheFrozen(identifier.to_string())));
        }
        state.entries.insert(identifier.to_string(), data);
        Ok(())
    }

    fn has(&self, identifier: &str) -> bool {
        self.lock().entries.contains_key(identifier)
    }

    fn remove(&self, identifier: &str) -> Result<bool> {
        let mut state = self.lock();
        if state.frozen {
            return Err(Error::new(ErrorKind::CacheFrozen(identifier.to_string())));
        }
        Ok(state.entries.remove(identifier).is_some())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.lock();
        state.entries.clear();
        state.frozen = false;
        Ok(())
    }

    fn freeze(&self) -> Result<()> {
        self.lock().frozen = true;
        Ok(())
    }

    fn is_frozen(&self) -> bool {
        self.lock().frozen
    }
}

/// A backend storing one file per entry in a directory.
#[derive(Clone, Debug)]
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    /// Uses (and creates) the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| io_error("create directory", &directory, &e))?;
        Ok(Self { directory })
    }

    /// The cache directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        self.directory.join(identifier)
    }

    fn ensure_writable(&self, identifier: &str) -> Result<()> {
        if self.is_frozen() {
            return Err(Error::new(ErrorKind::CacheFrozen(identifier.to_string())));
        }
        Ok(())
    }
}

pub(crate) fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::IoError(format!(
        "failed to {action} '{}': {e}",
        path.display()
    )))
}

impl CacheBackend for FileBackend {
    fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>> {
        validate_identifier(identifier)?;
        let path = self.entry_path(identifier);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, &e)),
        }
    }

    fn set(&self, identifier: &str, data: Vec<u8>) -> Result<()> {
        validate_identifier(identifier)?;
        self.ensure_writable(identifier)?;
        let path = self.entry_path(identifier);
        fs::write(&path, data).map_err(|e| io_error("write", &path, &e))
    }

    fn has(&self, identifier: &str) -> bool {
        validate_identifier(identifier).is_ok() && self.entry_path(identifier).is_file()
    }

    fn remove(&self, identifier: &str) -> Result<bool> {
        validate_identifier(identifier)?;
        self.ensure_writable(identifier)?;
        let path = self.entry_path(identifier);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("remove", &path, &e)),
        }
    }

    fn flush(&self) -> Result<()> {
        let entries =
            fs::read_dir(&self.directory).map_err(|e| io_error("list", &self.directory, &e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error("list", &self.directory, &e))?;
            let path = entry.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| io_error("remove", &path, &e))?;
            }
        }
        Ok(())
    }

    fn freeze(&self) -> Result<()> {
        let path = self.directory.join(FROZEN_MARKER);
        fs::write(&path, b"").map_err(|e| io_error("write", &path, &e))
    }

    fn is_frozen(&self) -> bool {
        self.directory.join(FROZEN_MARKER).is_file()
    }
}

/// The four caches reflection uses.
#[derive(Clone)]
pub struct ReflectionCaches {
    /// Marks which classes are unchanged since they were reflected.
    pub status: Arc<dyn CacheBackend>,
    /// Holds the whole reflection data as one blob between builds.
    pub compiletime: Arc<dyn CacheBackend>,
    /// Holds per-class records once frozen for production.
    pub runtime: Arc<dyn CacheBackend>,
    /// Holds per-class schemata once frozen for production.
    pub schemata: Arc<dyn CacheBackend>,
}

impl ReflectionCaches {
    /// Four independent in-memory caches.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            status: Arc::new(MemoryBackend::new()),
            compiletime: Arc::new(MemoryBackend::new()),
            runtime: Arc::new(MemoryBackend::new()),
            schemata: Arc::new(MemoryBackend::new()),
        }
    }

    /// Four file caches below a root directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub fn on_disk(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        Ok(Self {
            status: Arc::new(FileBackend::new(root.join("ReflectionStatus"))?),
            compiletime: Arc::new(FileBackend::new(root.join("ReflectionCompiletime"))?),
            runtime: Arc::new(FileBackend::new(root.join("ReflectionRuntime"))?),
            schemata: Arc::new(FileBackend::new(root.join("ClassSchemata"))?),
        })
    }
}

impl std::fmt::Debug for ReflectionCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionCaches")
            .field("runtime_frozen", &self.runtime.is_frozen())
            .field("schemata_frozen", &self.schemata.is_frozen())
            .finish_non_exhaustive()
    }
}
