//! Registry backed by a directory of bundle archives.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use kiln_core::{
    application::ports::ArtifactRegistry,
    domain::{Artifact, BundleKey},
    error::KilnResult,
};
use tracing::{debug, instrument};

use super::{fetch_error, not_found};
use crate::archive;

/// Serves `<root>/<name>/<version>.tar.gz`, with an optional
/// `<version>.tar.gz.sha256` sidecar holding the digest.
#[derive(Debug, Clone)]
pub struct DirectoryRegistry {
    root: PathBuf,
}

impl DirectoryRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn archive_path(&self, key: &BundleKey) -> PathBuf {
        self.root
            .join(key.name())
            .join(format!("{}.tar.gz", key.version()))
    }
}

impl ArtifactRegistry for DirectoryRegistry {
    #[instrument(skip_all, fields(bundle = %key))]
    fn pull(&self, key: &BundleKey) -> KilnResult<Artifact> {
        let path = self.archive_path(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found(key).into()),
            Err(e) => {
                return Err(fetch_error(key, format!("cannot read {}: {e}", path.display())).into());
            }
        };

        let mut sidecar = path.into_os_string();
        sidecar.push(".sha256");
        let digest = archive::read_sidecar(Path::new(&sidecar)).map_err(|e| fetch_error(key, e))?;
        debug!(bytes = bytes.len(), has_digest = digest.is_some(), "Bundle read");

        let artifact = Artifact::new(bytes);
        Ok(match digest {
            Some(digest) => artifact.with_digest(digest),
            None => artifact,
        })
    }
}
