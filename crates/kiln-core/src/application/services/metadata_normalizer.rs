//! Metadata Normalizer - resolves license metadata before generation.
//!
//! Rendering may run under a different working directory than the caller,
//! so every license path is made absolute up front. Malformed license
//! metadata is an error, never silently dropped.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::{
    domain::{DomainError, Metadata, Project, clean_path},
    error::KilnResult,
};

/// Normalizes the `license` entry of project and node metadata in place.
#[derive(Debug, Clone)]
pub struct MetadataNormalizer {
    base_dir: PathBuf,
}

impl MetadataNormalizer {
    /// Resolve relative license paths against `base_dir`, which must be
    /// absolute.
    pub fn new(base_dir: impl Into<PathBuf>) -> KilnResult<Self> {
        let base_dir = base_dir.into();
        if !base_dir.is_absolute() {
            return Err(DomainError::PathResolution {
                path: base_dir.display().to_string(),
                reason: "base directory must be absolute".into(),
            }
            .into());
        }
        Ok(Self { base_dir })
    }

    /// Resolve against the process working directory.
    pub fn from_current_dir() -> KilnResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| DomainError::PathResolution {
            path: ".".into(),
            reason: format!("cannot read working directory: {e}"),
        })?;
        Self::new(cwd)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Normalize the project's metadata, then every node's.
    ///
    /// A project without a license only logs a warning; nodes without one
    /// are skipped silently.
    #[instrument(skip_all, fields(project = %project.name))]
    pub fn normalize_project(&self, project: &mut Project) -> KilnResult<()> {
        if !self.normalize(&mut project.metadata, "project")? {
            warn!("License data not found in project metadata");
        }

        for node in &mut project.nodes {
            let scope = format!("node '{}'", node.name);
            if self.normalize(&mut node.metadata, &scope)? {
                debug!(node = %node.name, "Node license normalized");
            }
        }

        Ok(())
    }

    /// Normalize one metadata map. Returns whether a license was present.
    pub fn normalize(&self, metadata: &mut Metadata, scope: &str) -> Result<bool, DomainError> {
        let Some(license) = metadata.license(scope)? else {
            return Ok(false);
        };

        if license.has_path() {
            let path = self.absolutize(&license.path)?;
            metadata.set_license_path(path, scope)?;
        }

        Ok(true)
    }

    fn absolutize(&self, raw: &str) -> Result<String, DomainError> {
        if raw.contains('\0') {
            return Err(DomainError::PathResolution {
                path: raw.escape_default().to_string(),
                reason: "path contains a NUL byte".into(),
            });
        }

        let path = Path::new(raw);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };

        clean_path(&joined)
            .into_os_string()
            .into_string()
            .map_err(|_| DomainError::PathResolution {
                path: raw.to_string(),
                reason: "resolved path is not valid UTF-8".into(),
            })
    }
}
