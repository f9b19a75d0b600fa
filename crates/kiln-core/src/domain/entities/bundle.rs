use std::fmt;

use crate::domain::{entities::common::is_safe_segment, error::DomainError};

/// Name of the bundle applied as the base layer of every node.
pub const COMMON_BUNDLE: &str = "common";

/// Directory inside an unpacked bundle that holds its template files.
pub const BUNDLE_TEMPLATE_DIR: &str = "templates";

/// Identity of a template bundle in the artifact registry and the cache.
///
/// Invariant: both parts are single, safe path segments. They address a
/// cache slot on disk, so they can never climb out of the cache root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleKey {
    name: String,
    version: String,
}

impl BundleKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let version = version.into();

        for (part, value) in [("name", &name), ("version", &version)] {
            if !is_safe_segment(value) {
                return Err(DomainError::InvalidBundleKey {
                    name: name.clone(),
                    version: version.clone(),
                    reason: format!("{part} must be a single non-empty path segment"),
                });
            }
        }

        Ok(Self { name, version })
    }

    pub fn common(version: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(COMMON_BUNDLE, version)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Raw bundle as served by an artifact registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Gzip-compressed tar archive.
    pub bytes: Vec<u8>,
    /// Expected content digest, `sha256:<hex>`, when the registry has one.
    pub digest: Option<String>,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            digest: None,
        }
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}
