use std::sync::Arc;

use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::resolve::route::Route;
use crate::store::blob::{BlobEntry, BlobStore, MemoryBlobStore, StoredImage};

/// Longest accepted image name or alias slug, in bytes.
pub const MAX_NAME_LEN: usize = 200;
/// Longest accepted MIME type, in bytes.
pub const MAX_MIME_LEN: usize = 127;

/// Upsert-by-name image storage over an injected [`BlobStore`].
///
/// Adds name and MIME validation, `NotFound` errors for missing names, and logging. Cloning is
/// cheap and clones share the same backing store.
#[derive(Clone, Debug)]
pub struct ContentStore {
    blobs: Arc<dyn BlobStore>,
}

impl ContentStore {
    /// Wrap an existing blob store.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Content store over a fresh [`MemoryBlobStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBlobStore::new()))
    }

    /// Create or fully replace `name`.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn put(&self, name: &str, mime: &str, bytes: &[u8]) -> SnapfadeResult<()> {
        validate_name(name)?;
        if Route::from_name(name).is_some() {
            return Err(SnapfadeError::validation(format!(
                "'{name}' is a reserved name and could never be served"
            )));
        }
        validate_mime(mime)?;
        self.blobs.put(name, mime, bytes)?;
        tracing::debug!("stored image");
        Ok(())
    }

    /// Fetch `name`; a missing entry is [`SnapfadeError::NotFound`].
    pub fn get(&self, name: &str) -> SnapfadeResult<StoredImage> {
        self.try_get(name)?
            .ok_or_else(|| SnapfadeError::not_found(format!("image '{name}'")))
    }

    /// Fetch `name`, or `None` when absent.
    pub fn try_get(&self, name: &str) -> SnapfadeResult<Option<StoredImage>> {
        validate_name(name)?;
        self.blobs.get(name)
    }

    /// Remove `name`; returns whether it existed.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, name: &str) -> SnapfadeResult<bool> {
        validate_name(name)?;
        let existed = self.blobs.delete(name)?;
        tracing::debug!(existed, "deleted image");
        Ok(existed)
    }

    /// All stored names with their sizes, sorted by name.
    pub fn list(&self) -> SnapfadeResult<Vec<BlobEntry>> {
        self.blobs.list()
    }
}

/// Validate an image name or alias slug.
///
/// Names are a single path segment: non-empty, at most [`MAX_NAME_LEN`] bytes, no `/` or `\`,
/// no control characters, not `..`, and not starting with `.`.
pub fn validate_name(name: &str) -> SnapfadeResult<()> {
    if name.is_empty() {
        return Err(SnapfadeError::validation("name must be non-empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(SnapfadeError::validation(format!(
            "name must be at most {MAX_NAME_LEN} bytes"
        )));
    }
    if name.starts_with('.') {
        return Err(SnapfadeError::validation(format!(
            "name '{name}' must not start with '.'"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(SnapfadeError::validation(format!(
            "name '{name}' must not contain path separators"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(SnapfadeError::validation(
            "name must not contain control characters",
        ));
    }
    Ok(())
}

fn validate_mime(mime: &str) -> SnapfadeResult<()> {
    let ok = !mime.is_empty()
        && mime.len() <= MAX_MIME_LEN
        && mime.contains('/')
        && mime.chars().all(|c| c.is_ascii_graphic());
    if ok {
        Ok(())
    } else {
        Err(SnapfadeError::validation(format!(
            "invalid MIME type '{mime}'"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/content.rs"]
mod tests;
