//! Browser binaries cache
//!
//! The key hashes only the `testplane list-browsers` output, so config changes
//! unrelated to the browser set keep hitting the same entry.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use testplane_ci_common::workflow::Platform;
use testplane_ci_common::cache::CACHE_DIR_ENV;
use testplane_ci_common::{calc_sha256, expand_home, CacheBackend, DirectoryCache, DisabledCache};

use crate::constants::{CACHE_KEY_INFIX, TESTPLANE_BROWSERS_DEFAULT_PATH, TESTPLANE_BROWSERS_PATH_ENV};
use crate::error::ActionResult;
use crate::testplane::facade::BrowserInventory;

/// Whether browsers should be cached, decided once per process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    Unknown,
    NotApplicable,
    Applicable {
        primary_key: String,
        restore_key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Caching does not apply; the backend was not contacted
    Skipped,
    ExactHit(String),
    /// Restored an older entry through the restore key
    FallbackHit(String),
    Miss,
}

impl RestoreOutcome {
    pub fn is_primary_hit(&self) -> bool {
        matches!(self, RestoreOutcome::ExactHit(_))
    }
}

pub fn cache_restore_key(platform: &Platform) -> String {
    format!("{}-{}-{}-", platform.platform, platform.arch, CACHE_KEY_INFIX)
}

pub fn cache_primary_key(platform: &Platform, browsers: &str) -> String {
    format!("{}{}", cache_restore_key(platform), calc_sha256(browsers))
}

/// `$TESTPLANE_BROWSERS_PATH`, or `~/.testplane`
pub fn browsers_cache_path() -> PathBuf {
    let path = std::env::var(TESTPLANE_BROWSERS_PATH_ENV)
        .ok()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| TESTPLANE_BROWSERS_DEFAULT_PATH.to_string());

    expand_home(&path)
}

/// Directory cache when configured, otherwise a backend that never caches
pub fn cache_backend(directory: Option<DirectoryCache>) -> Box<dyn CacheBackend> {
    match directory {
        Some(cache) => Box::new(cache),
        None => {
            info!("Browser caching is disabled: {} is not set", CACHE_DIR_ENV);
            Box::new(DisabledCache)
        }
    }
}

pub struct TestplaneCache<'a, I: BrowserInventory, C: CacheBackend> {
    testplane: &'a I,
    backend: C,
    platform: Platform,
    cache_path: PathBuf,
    decision: CacheDecision,
    restored_key: Option<String>,
}

impl<'a, I: BrowserInventory, C: CacheBackend> TestplaneCache<'a, I, C> {
    pub fn new(testplane: &'a I, backend: C) -> Self {
        Self {
            testplane,
            backend,
            platform: Platform::current(),
            cache_path: browsers_cache_path(),
            decision: CacheDecision::Unknown,
            restored_key: None,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    pub fn decision(&self) -> &CacheDecision {
        &self.decision
    }

    pub fn restored_key(&self) -> Option<&str> {
        self.restored_key.as_deref()
    }

    /// Decide whether caching applies. Only the first call does any work.
    pub async fn init(&mut self) -> ActionResult<()> {
        if self.decision != CacheDecision::Unknown {
            return Ok(());
        }

        let config = self.testplane.config().await?;

        if !config.is_using_local_browsers() {
            debug!("Skip Testplane browsers caching as gridUrl is not matching");
            self.decision = CacheDecision::NotApplicable;
            return Ok(());
        }

        if !self.backend.is_available() {
            debug!("Skip Testplane browsers caching as cache service is not available");
            self.decision = CacheDecision::NotApplicable;
            return Ok(());
        }

        let browsers = self.testplane.list_browsers().await?;

        debug!("Described Testplane browsers: \"{}\"", browsers);

        let restore_key = cache_restore_key(&self.platform);
        let primary_key = cache_primary_key(&self.platform, browsers);

        debug!("Testplane browsers cache primary key: \"{}\"", primary_key);

        self.decision = CacheDecision::Applicable {
            primary_key,
            restore_key,
        };

        Ok(())
    }

    pub async fn restore(&mut self) -> ActionResult<RestoreOutcome> {
        self.init().await?;

        let CacheDecision::Applicable {
            primary_key,
            restore_key,
        } = &self.decision
        else {
            return Ok(RestoreOutcome::Skipped);
        };

        debug!("Restore Testplane browsers cache");

        let paths = [self.cache_path.clone()];
        let restored = match self
            .backend
            .restore(&paths, primary_key, &[restore_key.clone()])
            .await
        {
            Ok(restored) => restored,
            Err(e) => {
                warn!("Failed to restore Testplane browsers cache: {}", e);
                None
            }
        };

        let outcome = match &restored {
            Some(key) if key == primary_key => RestoreOutcome::ExactHit(key.clone()),
            Some(key) => RestoreOutcome::FallbackHit(key.clone()),
            None => RestoreOutcome::Miss,
        };

        self.restored_key = restored;

        Ok(outcome)
    }

    /// `true` only when the primary key matched exactly
    pub async fn restore_cache(&mut self) -> ActionResult<bool> {
        Ok(self.restore().await?.is_primary_hit())
    }

    pub async fn save_cache(&mut self) -> ActionResult<()> {
        self.init().await?;

        let CacheDecision::Applicable { primary_key, .. } = &self.decision else {
            return Ok(());
        };

        if self.restored_key.as_deref() == Some(primary_key.as_str()) {
            return Ok(());
        }

        debug!("Save Testplane browsers cache");

        if let Err(e) = self.backend.save(&[self.cache_path.clone()], primary_key).await {
            warn!("Failed to save Testplane browsers cache: {}", e);
        }

        Ok(())
    }
}
