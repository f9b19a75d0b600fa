//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerationService, ArtifactResolver,
//!   ProjectConverter, MetadataNormalizer)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain` and `crate::languages`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ArtifactResolver, ExternalProject, GenerateRequest, GenerationService, MetadataNormalizer,
    NodeSpec, ProjectConverter, ProjectSpec,
};

// Re-export port traits (for adapter implementation)
pub use ports::{ArtifactRegistry, BundleCache, Filesystem, TemplateRenderer};

pub use error::ApplicationError;
