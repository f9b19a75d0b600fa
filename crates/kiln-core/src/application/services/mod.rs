//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a project" or "resolve a bundle".

pub mod artifact_resolver;
pub mod generation_service;
pub mod metadata_normalizer;
pub mod project_converter;

pub use artifact_resolver::ArtifactResolver;
pub use generation_service::{GenerationService, LICENSE_FILE};
pub use metadata_normalizer::MetadataNormalizer;
pub use project_converter::{ExternalProject, GenerateRequest, NodeSpec, ProjectConverter, ProjectSpec};
