use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::foundation::error::{SnapfadeError, SnapfadeResult};

/// A stored image: content type plus payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredImage {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Raw encoded bytes.
    pub bytes: Vec<u8>,
}

/// One entry of [`BlobStore::list`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BlobEntry {
    /// Stored name.
    pub name: String,
    /// Payload size in bytes.
    pub size: u64,
}

/// Byte storage keyed by exact (case-sensitive) name.
///
/// `put` replaces type and payload together: a concurrent `get` observes either the old pair
/// or the new one. Concurrent `put`s to one name are last-write-wins.
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Create or overwrite `name`.
    fn put(&self, name: &str, mime: &str, bytes: &[u8]) -> SnapfadeResult<()>;
    /// Fetch `name`, or `None` when absent.
    fn get(&self, name: &str) -> SnapfadeResult<Option<StoredImage>>;
    /// Remove `name`; returns whether it existed.
    fn delete(&self, name: &str) -> SnapfadeResult<bool>;
    /// All entries sorted by name.
    fn list(&self) -> SnapfadeResult<Vec<BlobEntry>>;
}

/// Process-local [`BlobStore`].
///
/// Entries are swapped as whole `Arc`s under the write lock, so readers never see a torn entry.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Arc<StoredImage>>>,
}

impl MemoryBlobStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, name: &str, mime: &str, bytes: &[u8]) -> SnapfadeResult<()> {
        let entry = Arc::new(StoredImage {
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
        self.entries
            .write()
            .map_err(|_| SnapfadeError::store_write("blob store lock poisoned"))?
            .insert(name.to_string(), entry);
        Ok(())
    }

    fn get(&self, name: &str) -> SnapfadeResult<Option<StoredImage>> {
        let entry = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("blob store lock poisoned"))?
            .get(name)
            .cloned();
        Ok(entry.map(|e| StoredImage::clone(&e)))
    }

    fn delete(&self, name: &str) -> SnapfadeResult<bool> {
        Ok(self
            .entries
            .write()
            .map_err(|_| SnapfadeError::store_write("blob store lock poisoned"))?
            .remove(name)
            .is_some())
    }

    fn list(&self) -> SnapfadeResult<Vec<BlobEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("blob store lock poisoned"))?;
        let mut out: Vec<BlobEntry> = entries
            .iter()
            .map(|(name, e)| BlobEntry {
                name: name.clone(),
                size: e.bytes.len() as u64,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/blob.rs"]
mod tests;
