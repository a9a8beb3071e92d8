//! Cache transfer backends
//!
//! A backend stores a set of filesystem paths under a string key and restores
//! them later, either by exact key or by the newest entry whose key starts
//! with one of the given restore-key prefixes.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Maximum cache key length accepted by hosted cache services
const MAX_KEY_LENGTH: usize = 512;

const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Environment variable selecting the directory cache root
pub const CACHE_DIR_ENV: &str = "TESTPLANE_CI_CACHE_DIR";

/// Remote or local storage for cached paths
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Whether the cache service can be used at all
    fn is_available(&self) -> bool;

    /// Restore `paths`, returning the key that matched (if any)
    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>>;

    /// Save `paths` under `key`
    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<()>;
}

#[async_trait]
impl<T: CacheBackend + ?Sized> CacheBackend for Box<T> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>> {
        (**self).restore(paths, primary_key, restore_keys).await
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<()> {
        (**self).save(paths, key).await
    }
}

/// Backend used when no cache service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CacheBackend for DisabledCache {
    fn is_available(&self) -> bool {
        false
    }

    async fn restore(&self, _paths: &[PathBuf], _primary_key: &str, _restore_keys: &[String]) -> Result<Option<String>> {
        Ok(None)
    }

    async fn save(&self, _paths: &[PathBuf], _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Cache stored as gzip tarballs in a local (or mounted) directory
#[derive(Debug, Clone)]
pub struct DirectoryCache {
    root: PathBuf,
}

impl DirectoryCache {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Build from `TESTPLANE_CI_CACHE_DIR`, if set
    pub fn from_env() -> Option<Self> {
        std::env::var_os(CACHE_DIR_ENV)
            .filter(|root| !root.is_empty())
            .map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the archive for a key
    pub fn archive_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}{ARCHIVE_EXTENSION}"))
    }

    fn find_key(&self, primary_key: &str, restore_keys: &[String]) -> Result<Option<String>> {
        if self.archive_path(primary_key).is_file() {
            return Ok(Some(primary_key.to_string()));
        }

        if restore_keys.is_empty() || !self.root.is_dir() {
            return Ok(None);
        }

        let mut archived: Vec<(String, SystemTime)> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            if let Some(key) = name.strip_suffix(ARCHIVE_EXTENSION) {
                let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                archived.push((key.to_string(), modified));
            }
        }

        // Restore keys are tried in order; within one prefix the newest entry wins
        for prefix in restore_keys {
            let newest = archived
                .iter()
                .filter(|(key, _)| key.starts_with(prefix.as_str()))
                .max_by_key(|(_, modified)| *modified);

            if let Some((key, _)) = newest {
                return Ok(Some(key.clone()));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl CacheBackend for DirectoryCache {
    fn is_available(&self) -> bool {
        match fs::create_dir_all(&self.root) {
            Ok(()) => true,
            Err(e) => {
                debug!("Cache directory {} is not usable: {}", self.root.display(), e);
                false
            }
        }
    }

    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>> {
        validate_key(primary_key)?;
        for key in restore_keys {
            validate_key(key)?;
        }

        let cache = self.clone();
        let paths = paths.to_vec();
        let primary_key = primary_key.to_string();
        let restore_keys = restore_keys.to_vec();

        tokio::task::spawn_blocking(move || -> Result<Option<String>> {
            let Some(key) = cache.find_key(&primary_key, &restore_keys)? else {
                let tried: Vec<&str> = std::iter::once(primary_key.as_str())
                    .chain(restore_keys.iter().map(String::as_str))
                    .collect();
                info!("Cache not found for keys: {}", tried.join(", "));
                return Ok(None);
            };

            let archive = cache.archive_path(&key);
            unpack_archive(&archive, &paths)?;

            info!("Cache restored from key: {}", key);
            Ok(Some(key))
        })
        .await
        .map_err(|e| Error::Cache(format!("restore task failed: {}", e)))?
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<()> {
        validate_key(key)?;

        let archive = self.archive_path(key);
        let root = self.root.clone();
        let paths = paths.to_vec();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> Result<()> {
            fs::create_dir_all(&root)?;

            // Write next to the final location, then rename so readers never see a partial archive
            let partial = root.join(format!("{}{}.partial-{}", key, ARCHIVE_EXTENSION, uuid::Uuid::new_v4()));
            if let Err(e) = pack_archive(&partial, &paths) {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
            fs::rename(&partial, &archive)?;

            info!("Cache saved with key: {}", key);
            Ok(())
        })
        .await
        .map_err(|e| Error::Cache(format!("save task failed: {}", e)))?
    }
}

/// Reject keys that cannot be used as archive file names
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidCacheKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(invalid("key is longer than 512 characters"));
    }
    if key.contains(',') {
        return Err(invalid("key cannot contain commas"));
    }
    if key.contains('/') || key.contains('\\') || key == "." || key == ".." {
        return Err(invalid("key cannot contain path separators"));
    }

    Ok(())
}

/// Pack each path under an index-named top-level entry (`0/...`, `1/...`)
fn pack_archive(archive: &Path, paths: &[PathBuf]) -> Result<()> {
    let file = File::create(archive)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for (index, path) in paths.iter().enumerate() {
        let prefix = PathBuf::from(index.to_string());

        if !path.exists() {
            warn!("Path does not exist, not caching: {}", path.display());
            continue;
        }

        if !path.is_dir() {
            builder.append_path_with_name(path, &prefix)?;
            continue;
        }

        for entry in walkdir::WalkDir::new(path).min_depth(1) {
            let entry = entry.map_err(|e| Error::Cache(format!("walk {}: {}", path.display(), e)))?;
            let relative = entry
                .path()
                .strip_prefix(path)
                .map_err(|e| Error::Cache(e.to_string()))?;
            let name = prefix.join(relative);

            if entry.file_type().is_dir() {
                builder.append_dir(&name, entry.path())?;
            } else {
                builder.append_path_with_name(entry.path(), &name)?;
            }
        }
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

fn unpack_archive(archive: &Path, paths: &[PathBuf]) -> Result<()> {
    let file = File::open(archive)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.to_path_buf();

        let mut components = entry_path.components();
        let index = match components.next() {
            Some(Component::Normal(index)) => index.to_string_lossy().parse::<usize>().ok(),
            _ => None,
        };
        let Some(target_root) = index.and_then(|i| paths.get(i)) else {
            debug!("Skipping unexpected cache entry: {}", entry_path.display());
            continue;
        };

        let relative = components.as_path();
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::PathTraversal(entry_path.display().to_string()));
        }

        let dest = if relative.as_os_str().is_empty() {
            target_root.clone()
        } else {
            target_root.join(relative)
        };
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest)?;
    }

    Ok(())
}
