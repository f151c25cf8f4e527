use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use crate::foundation::error::{SnapfadeError, SnapfadeResult};
use crate::store::alias::{Alias, AliasStore, AliasTable};
use crate::store::blob::{BlobEntry, BlobStore, StoredImage};
use crate::store::content::{ContentStore, validate_name};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `bytes` to `path` through a sibling temp file and a rename.
///
/// Readers see either the previous file or the complete new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> SnapfadeResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SnapfadeError::store_write(format!("bad target path '{}'", path.display())))?;
    let tmp = dir.join(format!(
        ".tmp-{}-{}-{}",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        file_name
    ));

    let write = || -> std::io::Result<()> {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    };
    write().map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SnapfadeError::store_write(format!("write '{}': {e}", path.display()))
    })
}

/// [`BlobStore`] keeping one file per name under a root directory.
///
/// Each file holds the MIME type on its first line followed by the payload, so both are
/// replaced by the same atomic rename.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> SnapfadeResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create blob store dir '{}'", root.display()))?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> SnapfadeResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, name: &str, mime: &str, bytes: &[u8]) -> SnapfadeResult<()> {
        let path = self.path_for(name)?;
        let mut buf = Vec::with_capacity(mime.len() + 1 + bytes.len());
        buf.extend_from_slice(mime.as_bytes());
        buf.push(b'\n');
        buf.extend_from_slice(bytes);
        write_atomic(&path, &buf)
    }

    fn get(&self, name: &str) -> SnapfadeResult<Option<StoredImage>> {
        let path = self.path_for(name)?;
        let f = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("open blob '{}'", path.display()))
                    .into());
            }
        };
        let mut r = BufReader::new(f);
        let mime = read_header(&mut r).with_context(|| format!("read blob '{}'", path.display()))?;
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)
            .with_context(|| format!("read blob '{}'", path.display()))?;
        Ok(Some(StoredImage { mime, bytes }))
    }

    fn delete(&self, name: &str) -> SnapfadeResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SnapfadeError::store_write(format!(
                "delete '{}': {e}",
                path.display()
            ))),
        }
    }

    fn list(&self) -> SnapfadeResult<Vec<BlobEntry>> {
        let rd = fs::read_dir(&self.root)
            .with_context(|| format!("list blob store dir '{}'", self.root.display()))?;
        let mut out = Vec::new();
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            let Ok(f) = File::open(&path) else {
                continue;
            };
            let total = f.metadata().map(|m| m.len()).unwrap_or(0);
            let mut r = BufReader::new(f);
            let Ok(mime) = read_header(&mut r) else {
                continue;
            };
            out.push(BlobEntry {
                name: name.to_string(),
                size: total.saturating_sub(mime.len() as u64 + 1),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

fn read_header<R: BufRead>(r: &mut R) -> anyhow::Result<String> {
    let mut line = Vec::new();
    r.read_until(b'\n', &mut line)?;
    if line.pop() != Some(b'\n') {
        anyhow::bail!("missing MIME header line");
    }
    Ok(String::from_utf8(line)?)
}

/// [`AliasStore`] persisted as one JSON object (`slug -> target | null`) in a single file.
///
/// Every mutation rewrites the file atomically; a mutex serializes read-modify-write cycles
/// within the process.
#[derive(Debug)]
pub struct FsAliasStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FsAliasStore {
    /// Open a store backed by `path`; the file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> SnapfadeResult<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create alias dir '{}'", dir.display()))?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    fn load(&self) -> SnapfadeResult<BTreeMap<String, Option<String>>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read alias file '{}'", self.path.display()))
                    .into());
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            SnapfadeError::validation(format!(
                "parse alias file '{}': {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, map: &BTreeMap<String, Option<String>>) -> SnapfadeResult<()> {
        let json = serde_json::to_vec_pretty(map)
            .map_err(|e| SnapfadeError::store_write(format!("serialize aliases: {e}")))?;
        write_atomic(&self.path, &json)
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, Option<String>>) -> SnapfadeResult<T>,
    ) -> SnapfadeResult<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SnapfadeError::store_write("alias store lock poisoned"))?;
        let mut map = self.load()?;
        let out = f(&mut map)?;
        self.save(&map)?;
        Ok(out)
    }
}

impl AliasStore for FsAliasStore {
    fn insert(&self, alias: Alias) -> SnapfadeResult<()> {
        self.modify(|map| {
            if map.contains_key(&alias.slug) {
                return Err(SnapfadeError::validation(format!(
                    "alias '{}' already exists",
                    alias.slug
                )));
            }
            map.insert(alias.slug, alias.target);
            Ok(())
        })
    }

    fn get(&self, slug: &str) -> SnapfadeResult<Option<Alias>> {
        Ok(self.load()?.remove_entry(slug).map(|(slug, target)| Alias { slug, target }))
    }

    fn set_target(&self, slug: &str, target: Option<&str>) -> SnapfadeResult<()> {
        self.modify(|map| match map.get_mut(slug) {
            Some(t) => {
                *t = target.map(str::to_string);
                Ok(())
            }
            None => Err(SnapfadeError::not_found(format!("alias '{slug}'"))),
        })
    }

    fn remove(&self, slug: &str) -> SnapfadeResult<bool> {
        self.modify(|map| Ok(map.remove(slug).is_some()))
    }

    fn list(&self) -> SnapfadeResult<Vec<Alias>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(slug, target)| Alias { slug, target })
            .collect())
    }
}

/// Image store under `<root>/images` and alias table in `<root>/aliases.json`.
pub fn open_fs_stores(root: impl AsRef<Path>) -> SnapfadeResult<(ContentStore, AliasTable)> {
    let root = root.as_ref();
    let blobs = FsBlobStore::open(root.join("images"))?;
    let aliases = FsAliasStore::open(root.join("aliases.json"))?;
    Ok((
        ContentStore::new(Arc::new(blobs)),
        AliasTable::new(Arc::new(aliases)),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/store/fs.rs"]
mod tests;
