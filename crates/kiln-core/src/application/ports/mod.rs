//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: Generated output
//!   - `ArtifactRegistry`: Remote template bundles
//!   - `BundleCache`: Local, version-pinned bundle copies
//!   - `TemplateRenderer`: Template rendering

pub mod output;

pub use output::{ArtifactRegistry, BundleCache, Filesystem, TemplateRenderer};

#[cfg(test)]
pub use output::{MockArtifactRegistry, MockBundleCache};
