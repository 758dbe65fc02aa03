//! Key-value persistence with transparent chunking.
//!
//! Backends implement [`KeyValueStore`] (string keys, string values, like the
//! browser's `localStorage`). [`ChunkedStorage`] namespaces keys under a
//! prefix and splits values longer than `chunk_size` characters across
//! `"{prefix}:{key}:chunk:{i}"` entries plus a `"{prefix}:{key}:chunks"` count
//! header.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const DEFAULT_PREFIX: &str = "voice-games";
pub const DEFAULT_CHUNK_SIZE: usize = 500_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("quota exceeded writing {key} ({len} chars)")]
    QuotaExceeded { key: String, len: usize },
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("storage serialisation error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// In-process map. An optional per-value quota (in characters) lets tests
/// exercise write failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let len = value.chars().count();
        if self.quota.is_some_and(|q| len > q) {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                len,
            });
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// A JSON object file holding every key. The whole map is rewritten on each
/// change, which is fine for a handful of small records.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: HashMap<String, String>,
}

impl FileStorage {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = items.len(), "file storage opened");
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.items.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep memory in step with what is on disk.
            match previous {
                Some(v) => self.items.insert(key.to_string(), v),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Backend("localStorage unavailable".to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}

/// Namespaced, chunk-splitting view over a [`KeyValueStore`].
#[derive(Debug)]
pub struct ChunkedStorage<S> {
    store: S,
    prefix: String,
    chunk_size: usize,
}

impl<S: KeyValueStore> ChunkedStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_layout(store, DEFAULT_PREFIX, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_layout(store: S, prefix: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn plain_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    fn header_key(&self, key: &str) -> String {
        format!("{}:{}:chunks", self.prefix, key)
    }

    fn chunk_key(&self, key: &str, i: usize) -> String {
        format!("{}:{}:chunk:{}", self.prefix, key, i)
    }

    /// Write `value`, chunked if it is longer than the chunk size. On failure
    /// every key written for `key` is removed before the error is returned.
    pub fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Drop any previous layout so a stale header can't shadow the value.
        self.clear(key);
        let result = self.write(key, value);
        if let Err(e) = &result {
            error!(key, "error saving to storage: {}", e);
            self.clear(key);
        }
        result
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.chars().count() <= self.chunk_size {
            let plain = self.plain_key(key);
            return self.store.set_item(&plain, value);
        }

        let chunks = split_chunks(value, self.chunk_size);
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_key = self.chunk_key(key, i);
            self.store.set_item(&chunk_key, chunk)?;
        }
        let header = self.header_key(key);
        self.store.set_item(&header, &chunks.len().to_string())?;
        debug!(key, chunks = chunks.len(), "value stored in chunks");
        Ok(())
    }

    /// Read `key` back. Any failure reads as absent.
    pub fn load(&self, key: &str) -> Option<String> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, "error loading from storage: {}", e);
                None
            }
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(header) = self.store.get_item(&self.header_key(key))? else {
            return self.store.get_item(&self.plain_key(key));
        };
        let count: usize = header
            .trim()
            .parse()
            .map_err(|_| StorageError::Backend(format!("bad chunk header {header:?}")))?;

        let mut value = String::new();
        for i in 0..count {
            // A missing chunk contributes nothing.
            if let Some(chunk) = self.store.get_item(&self.chunk_key(key, i))? {
                value.push_str(&chunk);
            }
        }
        Ok(Some(value))
    }

    /// Remove `key` in both layouts. Failures are logged, not returned.
    pub fn clear(&mut self, key: &str) {
        if let Err(e) = self.try_clear(key) {
            warn!(key, "error clearing storage: {}", e);
        }
    }

    fn try_clear(&mut self, key: &str) -> Result<(), StorageError> {
        let header_key = self.header_key(key);
        if let Some(header) = self.store.get_item(&header_key)? {
            let count = header.trim().parse::<usize>().unwrap_or(0);
            for i in 0..count {
                let chunk_key = self.chunk_key(key, i);
                self.store.remove_item(&chunk_key)?;
            }
            self.store.remove_item(&header_key)?;
        }
        let plain = self.plain_key(key);
        self.store.remove_item(&plain)
    }
}

/// Split on character boundaries into pieces of at most `size` chars.
fn split_chunks(value: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (i, _) in value.char_indices() {
        if count == size {
            chunks.push(&value[start..i]);
            start = i;
            count = 0;
        }
        count += 1;
    }
    if start < value.len() {
        chunks.push(&value[start..]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_char_boundaries() {
        assert_eq!(split_chunks("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(split_chunks("ééé", 2), vec!["éé", "é"]);
        assert!(split_chunks("", 4).is_empty());
    }

    #[test]
    fn short_values_use_the_plain_key() {
        let mut s = ChunkedStorage::new(MemoryStorage::new());
        s.save("game-storage", "{}").unwrap();
        assert_eq!(
            s.store().get_item("voice-games:game-storage").unwrap(),
            Some("{}".to_string())
        );
        assert_eq!(s.load("game-storage"), Some("{}".to_string()));
    }

    #[test]
    fn long_values_round_trip_through_chunks() {
        let mut s = ChunkedStorage::with_layout(MemoryStorage::new(), "p", 4);
        s.save("k", "0123456789").unwrap();

        let store = s.store();
        assert_eq!(store.get_item("p:k:chunks").unwrap(), Some("3".to_string()));
        assert_eq!(store.get_item("p:k:chunk:0").unwrap(), Some("0123".to_string()));
        assert_eq!(store.get_item("p:k:chunk:2").unwrap(), Some("89".to_string()));
        assert_eq!(store.get_item("p:k").unwrap(), None);
        assert_eq!(s.load("k"), Some("0123456789".to_string()));
    }

    #[test]
    fn clear_removes_every_chunk() {
        let mut s = ChunkedStorage::with_layout(MemoryStorage::new(), "p", 2);
        s.save("k", "abcdef").unwrap();
        s.clear("k");
        assert!(s.store().is_empty());
        assert_eq!(s.load("k"), None);
    }

    #[test]
    fn shrinking_value_drops_old_chunks() {
        let mut s = ChunkedStorage::with_layout(MemoryStorage::new(), "p", 2);
        s.save("k", "abcdef").unwrap();
        s.save("k", "ab").unwrap();
        assert_eq!(s.load("k"), Some("ab".to_string()));
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn failed_write_leaves_no_keys() {
        let mut s = ChunkedStorage::with_layout(MemoryStorage::with_quota(3), "p", 5);
        let err = s.save("k", "abcdefgh").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(s.store().is_empty());
    }

    #[test]
    fn bad_header_reads_as_absent() {
        let mut store = MemoryStorage::new();
        store.set_item("p:k:chunks", "lots").unwrap();
        let s = ChunkedStorage::with_layout(store, "p", 5);
        assert_eq!(s.load("k"), None);
    }

    #[test]
    fn file_storage_persists_across_opens() {
        let dir = std::env::temp_dir().join(format!("voxarcade-storage-{}", std::process::id()));
        let path = dir.join("storage.json");
        let _ = fs::remove_file(&path);

        {
            let mut fs_store = FileStorage::open(&path).unwrap();
            fs_store.set_item("a", "1").unwrap();
            fs_store.set_item("b", "2").unwrap();
            fs_store.remove_item("b").unwrap();
        }
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(reopened.get_item("b").unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }
}
