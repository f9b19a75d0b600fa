//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod archive;
pub mod cache;
pub mod filesystem;
pub mod registry;
pub mod renderer;

// Re-export commonly used adapters
pub use cache::LocalBundleCache;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use registry::{DirectoryRegistry, HttpRegistry, InMemoryRegistry};
pub use renderer::SimpleRenderer;
