use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

/// Failure reported by an [`ObjectStore`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No object under the key.
    #[error("object not found: {0}")]
    NotFound(String),
    /// Local IO failed.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    /// The store refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),
}

/// Transient remote object storage with signed, time-limited links.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Mint a link granting read access to `key` for `ttl_secs` seconds.
    async fn sign(&self, key: &str, ttl_secs: u64) -> Result<String, StoreError>;

    /// Remove `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store with call counters and failure injection.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    signs: AtomicUsize,
    deletes: AtomicUsize,
    fail_next_put: AtomicBool,
    fail_next_sign: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryObjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `put` fail once.
    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::SeqCst);
    }

    /// Make the next `sign` fail once.
    pub fn fail_next_sign(&self) {
        self.fail_next_sign.store(true, Ordering::SeqCst);
    }

    /// Make every `delete` fail (after counting it) until switched off.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of `put` calls seen.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `sign` calls seen.
    pub fn sign_count(&self) -> usize {
        self.signs.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls seen.
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Whether `key` currently holds an object.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_put.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("put '{key}' refused")));
        }
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn sign(&self, key: &str, ttl_secs: u64) -> Result<String, StoreError> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_sign.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("sign '{key}' refused")));
        }
        if !self.contains(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(format!("memory://{key}?expires_in={ttl_secs}"))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("delete '{key}' refused")));
        }
        self.lock().remove(key);
        Ok(())
    }
}

/// Store keeping one file per key under a directory.
#[derive(Clone, Debug)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Store rooted at `root`; the directory is created on first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::Rejected(format!("invalid key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn sign(&self, key: &str, ttl_secs: u64) -> Result<String, StoreError> {
        let path = self.path_for(key)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let abs = std::path::absolute(&path)?;
        Ok(format!("file://{}?expires_in={ttl_secs}", abs.display()))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/publish/store.rs"]
mod tests;
