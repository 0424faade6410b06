//! Key -> blob stores backing the card and image caches
//!
//! Entries are written once per key and never invalidated. Writing the same key
//! twice is harmless because a key's value depends only on the key.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// What a blob holds. Tells the caller how to decode it; stores keep all kinds alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Scryfall JSON response
    Json,
    Jpeg,
    Png,
}

/// Persistent key -> bytes store
pub trait CacheStore: Send + Sync {
    /// Get a blob, `None` if the key was never stored
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Store a blob, replacing any previous value
    fn put(&self, key: &str, bytes: &[u8], kind: BlobKind) -> io::Result<()>;

    /// Check if a key is stored
    fn exists(&self, key: &str) -> io::Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process store, lost when the program exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (BlobKind, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind recorded for a key
    pub fn kind(&self, key: &str) -> Option<BlobKind> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).map(|(kind, _)| *kind))
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).map(|(_, bytes)| bytes.clone()))
    }

    fn put(&self, key: &str, bytes: &[u8], kind: BlobKind) -> io::Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), (kind, bytes.to_vec()));
        Ok(())
    }

    fn exists(&self, key: &str) -> io::Result<bool> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.contains_key(key))
    }
}

/// Store keeping one file per key in a directory
#[derive(Debug)]
pub struct DirStore {
    cache_dir: PathBuf,
    write_seq: AtomicU64,
}

impl DirStore {
    /// Open a store in `cache_dir`, creating the directory if needed
    pub fn open(cache_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        log::info!("Cache directory: {:?}", cache_dir);
        Ok(Self {
            cache_dir,
            write_seq: AtomicU64::new(0),
        })
    }

    /// Default location: ~/.cache/mtg_proxy
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mtg_proxy")
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// SHA-256 of the key, so file names have a fixed length whatever the URL
    fn filename(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(Self::filename(key))
    }
}

impl CacheStore for DirStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(&self, key: &str, bytes: &[u8], kind: BlobKind) -> io::Result<()> {
        let path = self.path(key);
        // Concurrent writers of one key each write their own temp file; the rename is atomic
        let tmp = self.cache_dir.join(format!(
            ".{}.{}.tmp",
            std::process::id(),
            self.write_seq.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp, bytes)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        log::debug!("Cached {:?} blob for {}", kind, key);
        Ok(())
    }

    fn exists(&self, key: &str) -> io::Result<bool> {
        Ok(self.path(key).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (DirStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DirStore::open(temp_dir.path().join("cache")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
        assert!(!store.exists("nope").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_put_and_get() {
        let store = MemoryStore::new();
        store.put("a", &[1, 2, 3], BlobKind::Jpeg).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(vec![1, 2, 3]));
        assert!(store.exists("a").unwrap());
        assert_eq!(store.kind("a"), Some(BlobKind::Jpeg));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_concurrent_writes_same_key() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.put("k", b"same", BlobKind::Json).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get("k").unwrap(), Some(b"same".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_dir_store_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("cache");
        let store = DirStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.cache_dir(), dir.as_path());
    }

    #[test]
    fn test_dir_store_get_nonexistent_returns_none() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.get("https://example.com/missing.jpg").unwrap().is_none());
        assert!(!store.exists("https://example.com/missing.jpg").unwrap());
    }

    #[test]
    fn test_dir_store_url_keys() {
        let (store, _temp_dir) = create_test_store();
        let key = "https://api.scryfall.com/cards/named?fuzzy=Nicol%20Bolas%2C%20the%20Ravager";
        let data = br#"{"name":"Nicol Bolas, the Ravager"}"#;

        store.put(key, data, BlobKind::Json).unwrap();

        assert!(store.exists(key).unwrap());
        assert_eq!(store.get(key).unwrap(), Some(data.to_vec()));
        // One flat file, no temp files left behind
        let files: Vec<_> = std::fs::read_dir(store.cache_dir()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_dir_store_distinct_keys() {
        let (store, _temp_dir) = create_test_store();

        store.put("https://x/lea/1", &[1, 1, 1], BlobKind::Jpeg).unwrap();
        store.put("https://x/lea/2", &[2, 2, 2], BlobKind::Jpeg).unwrap();
        store.put("https://x/lea/1?fmt=png", &[3, 3, 3], BlobKind::Png).unwrap();

        assert_eq!(store.get("https://x/lea/1").unwrap().unwrap(), vec![1, 1, 1]);
        assert_eq!(store.get("https://x/lea/2").unwrap().unwrap(), vec![2, 2, 2]);
        assert_eq!(
            store.get("https://x/lea/1?fmt=png").unwrap().unwrap(),
            vec![3, 3, 3]
        );
    }

    #[test]
    fn test_dir_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        {
            let store = DirStore::open(&dir).unwrap();
            store.put("key", &[10, 20, 30], BlobKind::Jpeg).unwrap();
        }

        {
            let store = DirStore::open(&dir).unwrap();
            assert_eq!(store.get("key").unwrap(), Some(vec![10, 20, 30]));
        }
    }

    #[test]
    fn test_dir_store_long_keys() {
        let (store, _temp_dir) = create_test_store();
        let name = "Our Market Research Shows That Players Like Really Long Card Names So We \
                    Made This Card to Have the Absolute Longest Card Name Ever Elemental";
        let key = format!(
            "https://api.scryfall.com/cards/named?fuzzy={}",
            urlencoding::encode(&name.repeat(3))
        );
        assert!(key.len() > 300);

        store.put(&key, b"{}", BlobKind::Json).unwrap();

        assert!(store.exists(&key).unwrap());
        assert_eq!(store.get(&key).unwrap(), Some(b"{}".to_vec()));
        let names: Vec<String> = std::fs::read_dir(store.cache_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![DirStore::filename(&key)]);
        assert_eq!(names[0].len(), 64);
    }

    #[test]
    fn test_dir_store_empty_blob() {
        let (store, _temp_dir) = create_test_store();
        store.put("empty", &[], BlobKind::Jpeg).unwrap();
        assert_eq!(store.get("empty").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_dir_store_overwrite() {
        let (store, _temp_dir) = create_test_store();
        store.put("k", &[1, 2, 3], BlobKind::Jpeg).unwrap();
        store.put("k", &[4, 5, 6, 7], BlobKind::Jpeg).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), vec![4, 5, 6, 7]);
    }
}
