//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{Artifact, BundleKey, ProjectStructure, RenderContext};
use crate::error::KilnResult;

/// Port for filesystem operations on generated output.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Write content to a file, replacing any existing file.
    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> KilnResult<Vec<u8>>;

    /// Mark a file executable.
    fn set_permissions(&self, path: &Path, executable: bool) -> KilnResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for the remote artifact registry holding template bundles.
///
/// Implemented by:
/// - `kiln_adapters::registry::HttpRegistry` (network)
/// - `kiln_adapters::registry::DirectoryRegistry` (mirrors on disk)
/// - `kiln_adapters::registry::InMemoryRegistry` (testing)
///
/// Implementations map "no such bundle" to
/// `ApplicationError::ArtifactNotFound` and every other failure to
/// `ApplicationError::ArtifactFetch`. Timeouts and retries belong here, not
/// in the core.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactRegistry: Send + Sync {
    /// Download the bundle archive for `key`.
    fn pull(&self, key: &BundleKey) -> KilnResult<Artifact>;
}

/// Port for the local, version-pinned bundle cache.
///
/// Implemented by `kiln_adapters::cache::LocalBundleCache`.
#[cfg_attr(test, mockall::automock)]
pub trait BundleCache: Send + Sync {
    /// Deterministic directory for `key`; may not exist yet.
    fn slot(&self, key: &BundleKey) -> PathBuf;

    /// Whether the slot for exactly this key holds a complete bundle.
    fn is_populated(&self, key: &BundleKey) -> bool;

    /// Verify and unpack `artifact` into the slot for `key`.
    ///
    /// The slot must appear atomically: readers never observe a partially
    /// unpacked bundle. If another process populated the slot first, the
    /// existing slot is kept.
    fn install(&self, key: &BundleKey, artifact: Artifact) -> KilnResult<PathBuf>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `kiln_adapters::renderer::SimpleRenderer` (variable substitution)
pub trait TemplateRenderer: Send + Sync {
    /// Render every file under `template_root` into a structure rooted at
    /// `output_root`.
    fn render(
        &self,
        template_root: &Path,
        context: &RenderContext,
        output_root: &Path,
    ) -> KilnResult<ProjectStructure>;
}
