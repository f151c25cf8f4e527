use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::resolve::route::Route;
use crate::store::content::validate_name;

/// A stable slug pointing at a (possibly missing) stored image name.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Alias {
    /// Unique slug, disjoint from reserved route names.
    pub slug: String,
    /// Target image name; `None` means the alias currently resolves to nothing.
    pub target: Option<String>,
}

/// Storage for alias records.
pub trait AliasStore: Send + Sync + std::fmt::Debug {
    /// Insert a new alias; an existing slug is a validation error.
    fn insert(&self, alias: Alias) -> SnapfadeResult<()>;
    /// Look up a slug.
    fn get(&self, slug: &str) -> SnapfadeResult<Option<Alias>>;
    /// Repoint an existing alias; a missing slug is `NotFound`.
    fn set_target(&self, slug: &str, target: Option<&str>) -> SnapfadeResult<()>;
    /// Remove a slug; returns whether it existed.
    fn remove(&self, slug: &str) -> SnapfadeResult<bool>;
    /// All aliases sorted by slug.
    fn list(&self) -> SnapfadeResult<Vec<Alias>>;
}

/// Process-local [`AliasStore`].
#[derive(Debug, Default)]
pub struct MemoryAliasStore {
    entries: RwLock<BTreeMap<String, Option<String>>>,
}

impl MemoryAliasStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AliasStore for MemoryAliasStore {
    fn insert(&self, alias: Alias) -> SnapfadeResult<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| SnapfadeError::store_write("alias store lock poisoned"))?;
        if map.contains_key(&alias.slug) {
            return Err(SnapfadeError::validation(format!(
                "alias '{}' already exists",
                alias.slug
            )));
        }
        map.insert(alias.slug, alias.target);
        Ok(())
    }

    fn get(&self, slug: &str) -> SnapfadeResult<Option<Alias>> {
        let map = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("alias store lock poisoned"))?;
        Ok(map.get(slug).map(|target| Alias {
            slug: slug.to_string(),
            target: target.clone(),
        }))
    }

    fn set_target(&self, slug: &str, target: Option<&str>) -> SnapfadeResult<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| SnapfadeError::store_write("alias store lock poisoned"))?;
        match map.get_mut(slug) {
            Some(t) => {
                *t = target.map(str::to_string);
                Ok(())
            }
            None => Err(SnapfadeError::not_found(format!("alias '{slug}'"))),
        }
    }

    fn remove(&self, slug: &str) -> SnapfadeResult<bool> {
        Ok(self
            .entries
            .write()
            .map_err(|_| SnapfadeError::store_write("alias store lock poisoned"))?
            .remove(slug)
            .is_some())
    }

    fn list(&self) -> SnapfadeResult<Vec<Alias>> {
        let map = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("alias store lock poisoned"))?;
        Ok(map
            .iter()
            .map(|(slug, target)| Alias {
                slug: slug.clone(),
                target: target.clone(),
            })
            .collect())
    }
}

/// Validating front for an injected [`AliasStore`].
///
/// Slugs follow the image name rules and may not shadow a reserved route. Targets are stored
/// as given; nothing checks that they exist, now or later.
#[derive(Clone, Debug)]
pub struct AliasTable {
    store: Arc<dyn AliasStore>,
}

impl AliasTable {
    /// Wrap an existing alias store.
    pub fn new(store: Arc<dyn AliasStore>) -> Self {
        Self { store }
    }

    /// Alias table over a fresh [`MemoryAliasStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryAliasStore::new()))
    }

    /// Create `slug`, optionally pointing at `target`.
    #[tracing::instrument(skip(self))]
    pub fn create(&self, slug: &str, target: Option<&str>) -> SnapfadeResult<Alias> {
        validate_slug(slug)?;
        if let Some(t) = target {
            validate_name(t)?;
        }
        let alias = Alias {
            slug: slug.to_string(),
            target: target.map(str::to_string),
        };
        self.store.insert(alias.clone())?;
        tracing::debug!("created alias");
        Ok(alias)
    }

    /// Look up `slug`.
    pub fn get(&self, slug: &str) -> SnapfadeResult<Option<Alias>> {
        if validate_name(slug).is_err() {
            return Ok(None);
        }
        self.store.get(slug)
    }

    /// Point `slug` at `target` (or at nothing).
    #[tracing::instrument(skip(self))]
    pub fn retarget(&self, slug: &str, target: Option<&str>) -> SnapfadeResult<()> {
        validate_name(slug)?;
        if let Some(t) = target {
            validate_name(t)?;
        }
        self.store.set_target(slug, target)?;
        tracing::debug!("retargeted alias");
        Ok(())
    }

    /// Delete `slug`; returns whether it existed.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, slug: &str) -> SnapfadeResult<bool> {
        validate_name(slug)?;
        self.store.remove(slug)
    }

    /// All aliases sorted by slug.
    pub fn list(&self) -> SnapfadeResult<Vec<Alias>> {
        self.store.list()
    }
}

fn validate_slug(slug: &str) -> SnapfadeResult<()> {
    validate_name(slug)?;
    if Route::from_name(slug).is_some() {
        return Err(SnapfadeError::validation(format!(
            "'{slug}' is a reserved name"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/store/alias.rs"]
mod tests;
