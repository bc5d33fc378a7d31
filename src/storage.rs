// src/storage.rs

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::error::{PipelineError, Result};

/// Byte storage addressed by flat keys (archive and cache file names).
pub trait Storage {
    fn exists(&self, key: &str) -> bool;
    fn read(&self, key: &str) -> Result<Vec<u8>>;
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// Keys are file names inside a single local folder.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Use `root` as the data folder, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| PipelineError::FileSystem {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Storage for FsStorage {
    fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        fs::read(self.path(key)).map_err(|e| PipelineError::storage(key, e))
    }

    /// Written to a sibling temp file first and renamed into place, so a
    /// reader never sees a half-written file.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let dest = self.path(key);
        let tmp = self.path(&format!("{}.part", key));
        let write_tmp = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &dest)
        };
        write_tmp().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            PipelineError::storage(key, e)
        })
    }
}

/// In-process storage for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files().keys().cloned().collect();
        keys.sort();
        keys
    }

    // Every write is a single insert, so a poisoned map is still consistent.
    fn files(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, key: &str) -> bool {
        self.files().contains_key(key)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.files().get(key).cloned().ok_or_else(|| {
            PipelineError::storage(key, io::Error::new(io::ErrorKind::NotFound, "no such key"))
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.files().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn exists(&self, key: &str) -> bool {
        (**self).exists(key)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(key, bytes)
    }
}
