//! On-disk bundle cache.
//!
//! Layout: `<root>/<name>/<version>/templates/...`. A slot directory only
//! ever appears through a rename of a fully unpacked staging directory, so
//! an existing slot is always complete.

use std::{
    fs,
    path::{Path, PathBuf},
};

use kiln_core::{
    application::{ApplicationError, ports::BundleCache},
    domain::{Artifact, BundleKey},
    error::KilnResult,
};
use tracing::{debug, instrument, warn};

use crate::archive::{self, ArchiveError};

#[derive(Debug, Clone)]
pub struct LocalBundleCache {
    root: PathBuf,
}

impl LocalBundleCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BundleCache for LocalBundleCache {
    fn slot(&self, key: &BundleKey) -> PathBuf {
        self.root.join(key.name()).join(key.version())
    }

    fn is_populated(&self, key: &BundleKey) -> bool {
        self.slot(key).is_dir()
    }

    #[instrument(skip_all, fields(bundle = %key))]
    fn install(&self, key: &BundleKey, artifact: Artifact) -> KilnResult<PathBuf> {
        let fetch_error = |reason: String| ApplicationError::ArtifactFetch {
            name: key.name().to_string(),
            version: key.version().to_string(),
            reason,
        };

        if let Some(expected) = &artifact.digest {
            archive::verify_digest(&artifact.bytes, expected)
                .map_err(|e| fetch_error(e.to_string()))?;
            debug!("Digest verified");
        }

        let slot = self.slot(key);
        let parent = self.root.join(key.name());
        fs::create_dir_all(&parent)
            .map_err(|e| fetch_error(format!("cannot create cache directory: {e}")))?;

        // Staging lives next to the slot so the final rename stays on one filesystem.
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .map_err(|e| fetch_error(format!("cannot create staging directory: {e}")))?;

        let files = archive::unpack(&artifact.bytes, staging.path())
            .map_err(|e| fetch_error(e.to_string()))?;
        if files == 0 {
            return Err(fetch_error(ArchiveError::Empty.to_string()).into());
        }

        match fs::rename(staging.path(), &slot) {
            Ok(()) => {
                // The staging path is gone; nothing left for the guard to clean.
                let _ = staging.keep();
                debug!(files, path = %slot.display(), "Bundle installed");
                Ok(slot)
            }
            Err(_) if slot.is_dir() => {
                warn!("Bundle installed concurrently by another process; keeping existing copy");
                Ok(slot)
            }
            Err(e) => Err(fetch_error(format!("cannot move bundle into cache: {e}")).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::error::KilnError;
    use tempfile::TempDir;

    fn key(name: &str, version: &str) -> BundleKey {
        BundleKey::new(name, version).unwrap()
    }

    fn bundle(readme: &str) -> Vec<u8> {
        archive::pack_files(&[("templates/README.md", readme)]).unwrap()
    }

    fn is_fetch_error(err: &KilnError) -> bool {
        matches!(
            err,
            KilnError::Application(ApplicationError::ArtifactFetch { .. })
        )
    }

    #[test]
    fn install_populates_the_slot() {
        let root = TempDir::new().unwrap();
        let cache = LocalBundleCache::new(root.path());
        let key = key("go", "1.0.0");
        assert!(!cache.is_populated(&key));

        let dir = cache.install(&key, Artifact::new(bundle("hi"))).unwrap();

        assert_eq!(dir, root.path().join("go").join("1.0.0"));
        assert!(cache.is_populated(&key));
        assert_eq!(
            fs::read_to_string(dir.join("templates/README.md")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn matching_digest_installs() {
        let root = TempDir::new().unwrap();
        let cache = LocalBundleCache::new(root.path());
        let bytes = bundle("hi");
        let digest = archive::sha256_digest(&bytes);

        cache
            .install(&key("java", "1.0.0"), Artifact::new(bytes).with_digest(digest))
            .unwrap();
    }

    #[test]
    fn digest_mismatch_leaves_slot_empty() {
        let root = TempDir::new().unwrap();
        let cache = LocalBundleCache::new(root.path());
        let key = key("java", "1.0.0");
        let artifact = Artifact::new(bundle("hi")).with_digest(archive::sha256_digest(b"other"));

        let err = cache.install(&key, artifact).unwrap_err();

        assert!(is_fetch_error(&err));
        assert!(!cache.is_populated(&key));
    }

    #[test]
    fn empty_archive_is_a_fetch_error() {
        let root = TempDir::new().unwrap();
        let cache = LocalBundleCache::new(root.path());
        let key = key("python", "1.0.0");
        let empty = archive::pack_files::<&str, &str>(&[]).unwrap();

        let err = cache.install(&key, Artifact::new(empty)).unwrap_err();

        assert!(is_fetch_error(&err));
        assert!(!cache.is_populated(&key));
        // No stray staging directories are left behind.
        assert_eq!(fs::read_dir(root.path().join("python")).unwrap().count(), 0);
    }

    #[test]
    fn losing_the_rename_race_keeps_the_winner() {
        let root = TempDir::new().unwrap();
        let cache = LocalBundleCache::new(root.path());
        let key = key("go", "2.0.0");

        cache.install(&key, Artifact::new(bundle("winner"))).unwrap();
        let dir = cache.install(&key, Artifact::new(bundle("loser"))).unwrap();

        assert_eq!(
            fs::read_to_string(dir.join("templates/README.md")).unwrap(),
            "winner"
        );
        assert_eq!(fs::read_dir(root.path().join("go")).unwrap().count(), 1);
    }
}
