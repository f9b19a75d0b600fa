//! Artifact Resolver - guarantees a local copy of a template bundle.
//!
//! The first request for a (name, version) pulls the bundle from the
//! registry and installs it into the cache; every later request, in this
//! run or a later one, is served from the cache without network access.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{ArtifactRegistry, BundleCache},
    },
    domain::BundleKey,
    error::KilnResult,
};

/// Resolves bundles to cache directories, fetching at most once per key.
///
/// Callers asking for the same key are serialized on a per-key lock, so
/// the second caller observes the first one's result. Distinct keys never
/// wait on each other.
pub struct ArtifactResolver {
    registry: Arc<dyn ArtifactRegistry>,
    cache: Arc<dyn BundleCache>,
    locks: Mutex<HashMap<BundleKey, Arc<Mutex<()>>>>,
}

impl ArtifactResolver {
    pub fn new(registry: Arc<dyn ArtifactRegistry>, cache: Arc<dyn BundleCache>) -> Self {
        Self {
            registry,
            cache,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ensure `name@version` is cached and return its directory.
    pub fn ensure(&self, name: &str, version: &str) -> KilnResult<PathBuf> {
        let key = BundleKey::new(name, version)?;
        self.ensure_key(&key)
    }

    #[instrument(skip_all, fields(bundle = %key))]
    pub fn ensure_key(&self, key: &BundleKey) -> KilnResult<PathBuf> {
        if self.cache.is_populated(key) {
            debug!("Bundle already cached");
            return Ok(self.cache.slot(key));
        }

        let slot_lock = self.lock_for(key)?;
        let result = self.fetch_locked(key, &slot_lock);
        self.release(key, slot_lock);
        result
    }

    fn fetch_locked(&self, key: &BundleKey, slot_lock: &Mutex<()>) -> KilnResult<PathBuf> {
        let _guard = slot_lock
            .lock()
            .map_err(|_| ApplicationError::StoreLockError {
                resource: "bundle slot",
            })?;

        // Another caller may have finished the fetch while we waited.
        if self.cache.is_populated(key) {
            debug!("Bundle cached by a concurrent request");
            return Ok(self.cache.slot(key));
        }

        info!("Pulling template bundle");
        let artifact = self.registry.pull(key)?;
        let size = artifact.bytes.len();
        let dir = self.cache.install(key, artifact)?;
        info!(bytes = size, path = %dir.display(), "Template bundle cached");

        Ok(dir)
    }

    fn lock_for(&self, key: &BundleKey) -> KilnResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| ApplicationError::StoreLockError {
                resource: "bundle lock table",
            })?;
        Ok(Arc::clone(locks.entry(key.clone()).or_default()))
    }

    /// Drop the table entry once no other caller holds or waits on it.
    fn release(&self, key: &BundleKey, slot_lock: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        // Clones are only taken under the table lock, so the count is exact:
        // one for the table, one for `slot_lock`.
        if Arc::strong_count(&slot_lock) == 2 {
            locks.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::Path, sync::Mutex, thread, time::Duration};

    use super::*;
    use crate::{
        application::ports::{MockArtifactRegistry, MockBundleCache},
        domain::{Artifact, DomainError},
        error::KilnError,
    };

    /// Cache that records installed bytes in memory.
    #[derive(Default)]
    struct FakeCache {
        installed: Mutex<HashMap<BundleKey, Vec<u8>>>,
    }

    impl FakeCache {
        fn content(&self, key: &BundleKey) -> Option<Vec<u8>> {
            self.installed.lock().unwrap().get(key).cloned()
        }
    }

    impl BundleCache for FakeCache {
        fn slot(&self, key: &BundleKey) -> PathBuf {
            Path::new("/cache").join(key.name()).join(key.version())
        }

        fn is_populated(&self, key: &BundleKey) -> bool {
            self.installed.lock().unwrap().contains_key(key)
        }

        fn install(&self, key: &BundleKey, artifact: Artifact) -> KilnResult<PathBuf> {
            self.installed
                .lock()
                .unwrap()
                .insert(key.clone(), artifact.bytes);
            Ok(self.slot(key))
        }
    }

    fn key(name: &str, version: &str) -> BundleKey {
        BundleKey::new(name, version).unwrap()
    }

    #[test]
    fn second_ensure_does_not_fetch() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_pull()
            .times(1)
            .returning(|_| Ok(Artifact::new(b"bundle-v1".to_vec())));
        let cache = Arc::new(FakeCache::default());
        let resolver = ArtifactResolver::new(Arc::new(registry), cache.clone());

        let first = resolver.ensure("go", "1.2.0").unwrap();
        let bytes_after_first = cache.content(&key("go", "1.2.0"));
        let second = resolver.ensure("go", "1.2.0").unwrap();

        assert_eq!(first, second);
        assert_eq!(first, PathBuf::from("/cache/go/1.2.0"));
        assert_eq!(cache.content(&key("go", "1.2.0")), bytes_after_first);
    }

    #[test]
    fn versions_are_resolved_independently() {
        let mut registry = MockArtifactRegistry::new();
        registry
            .expect_pull()
            .times(2)
            .returning(|k| Ok(Artifact::new(k.version().as_bytes().to_vec())));
        let cache = Arc::new(FakeCache::default());
        let resolver = ArtifactResolver::new(Arc::new(registry), cache.clone());

        let old = resolver.ensure("go", "1.2.0").unwrap();
        let new = resolver.ensure("go", "1.3.0").unwrap();

        assert_ne!(old, new);
        assert_eq!(cache.content(&key("go", "1.3.0")), Some(b"1.3.0".to_vec()));
    }

    #[test]
    fn populated_cache_never_touches_registry() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_pull().never();
        let mut cache = MockBundleCache::new();
        cache.expect_is_populated().return_const(true);
        cache
            .expect_slot()
            .returning(|k| PathBuf::from("/warm").join(k.name()).join(k.version()));
        cache.expect_install().never();

        let resolver = ArtifactResolver::new(Arc::new(registry), Arc::new(cache));

        assert_eq!(
            resolver.ensure("common", "2.0.0").unwrap(),
            PathBuf::from("/warm/common/2.0.0")
        );
    }

    #[test]
    fn not_found_is_surfaced_and_nothing_is_cached() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_pull().times(1).returning(|k| {
            Err(ApplicationError::ArtifactNotFound {
                name: k.name().into(),
                version: k.version().into(),
            }
            .into())
        });
        let cache = Arc::new(FakeCache::default());
        let resolver = ArtifactResolver::new(Arc::new(registry), cache.clone());

        let err = resolver.ensure("rust", "9.9.9").unwrap_err();

        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::ArtifactNotFound { .. })
        ));
        assert!(!cache.is_populated(&key("rust", "9.9.9")));
    }

    #[test]
    fn invalid_key_is_rejected_before_fetch() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_pull().never();
        let resolver = ArtifactResolver::new(Arc::new(registry), Arc::new(FakeCache::default()));

        let err = resolver.ensure("../etc", "1.0.0").unwrap_err();
        assert!(matches!(
            err,
            KilnError::Domain(DomainError::InvalidBundleKey { .. })
        ));
    }

    #[test]
    fn concurrent_requests_share_one_fetch() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_pull().times(1).returning(|_| {
            thread::sleep(Duration::from_millis(50));
            Ok(Artifact::new(b"slow".to_vec()))
        });
        let resolver = ArtifactResolver::new(Arc::new(registry), Arc::new(FakeCache::default()));

        let dirs: Vec<PathBuf> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| resolver.ensure("java", "1.0.0").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(dirs.iter().all(|d| d == Path::new("/cache/java/1.0.0")));
        assert!(resolver.locks.lock().unwrap().is_empty());
    }

    #[test]
    fn lock_table_is_emptied_after_each_resolution() {
        let mut registry = MockArtifactRegistry::new();
        registry.expect_pull().returning(|k| {
            if k.version() == "9.9.9" {
                Err(ApplicationError::ArtifactNotFound {
                    name: k.name().into(),
                    version: k.version().into(),
                }
                .into())
            } else {
                Ok(Artifact::new(b"bundle".to_vec()))
            }
        });
        let resolver = ArtifactResolver::new(Arc::new(registry), Arc::new(FakeCache::default()));

        for version in ["1.0.0", "1.1.0", "1.2.0"] {
            resolver.ensure("go", version).unwrap();
        }
        assert!(resolver.ensure("go", "9.9.9").is_err());

        assert!(resolver.locks.lock().unwrap().is_empty());
    }
}
