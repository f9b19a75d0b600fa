//! In-memory registry for tests.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Mutex, RwLock},
};

use kiln_core::{
    application::{ApplicationError, ports::ArtifactRegistry},
    domain::{Artifact, BUNDLE_TEMPLATE_DIR, BundleKey},
    error::KilnResult,
};

use super::{fetch_error, not_found};
use crate::archive;

/// Registry holding artifacts in memory and counting every pull.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    artifacts: RwLock<HashMap<BundleKey, Artifact>>,
    fetches: Mutex<HashMap<BundleKey, usize>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: BundleKey, artifact: Artifact) -> KilnResult<()> {
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| ApplicationError::StoreLockError {
                resource: "registry artifacts",
            })?;
        artifacts.insert(key, artifact);
        Ok(())
    }

    /// Publish a bundle built from template files, paths relative to the
    /// bundle's `templates/` directory. The artifact carries its digest.
    pub fn publish(&self, name: &str, version: &str, files: &[(&str, &str)]) -> KilnResult<()> {
        let key = BundleKey::new(name, version)?;
        let entries: Vec<_> = files
            .iter()
            .map(|(path, content)| (Path::new(BUNDLE_TEMPLATE_DIR).join(path), *content))
            .collect();
        let bytes = archive::pack_files(&entries).map_err(|e| fetch_error(&key, e))?;
        let digest = archive::sha256_digest(&bytes);

        self.insert(key, Artifact::new(bytes).with_digest(digest))
    }

    /// Pulls of `name@version` so far, successful or not.
    pub fn fetch_count(&self, name: &str, version: &str) -> usize {
        let Ok(key) = BundleKey::new(name, version) else {
            return 0;
        };
        self.fetches
            .lock()
            .map(|f| f.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().map(|f| f.values().sum()).unwrap_or(0)
    }
}

impl ArtifactRegistry for InMemoryRegistry {
    fn pull(&self, key: &BundleKey) -> KilnResult<Artifact> {
        {
            let mut fetches = self
                .fetches
                .lock()
                .map_err(|_| ApplicationError::StoreLockError {
                    resource: "registry fetch counter",
                })?;
            *fetches.entry(key.clone()).or_default() += 1;
        }

        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| ApplicationError::StoreLockError {
                resource: "registry artifacts",
            })?;
        artifacts
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(key).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_pull_counts_fetches() {
        let registry = InMemoryRegistry::new();
        registry
            .publish("common", "1.0.0", &[("README.md", "# {{PROJECT_NAME}}")])
            .unwrap();
        let key = BundleKey::common("1.0.0").unwrap();

        let artifact = registry.pull(&key).unwrap();
        registry.pull(&key).unwrap();

        assert!(artifact.digest.is_some());
        assert_eq!(registry.fetch_count("common", "1.0.0"), 2);
        assert_eq!(registry.total_fetches(), 2);
    }

    #[test]
    fn unknown_key_is_not_found_and_still_counted() {
        let registry = InMemoryRegistry::new();
        let key = BundleKey::new("go", "1.0.0").unwrap();

        assert!(registry.pull(&key).is_err());
        assert_eq!(registry.fetch_count("go", "1.0.0"), 1);
    }
}
