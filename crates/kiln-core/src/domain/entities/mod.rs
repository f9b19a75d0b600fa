pub mod bundle;
pub mod common;
pub mod metadata;
pub mod project;
pub mod project_structure;
pub mod render_context;

pub use crate::domain::DomainError;
pub use bundle::{Artifact, BundleKey};
pub use metadata::{License, Metadata};
pub use project::{ModificationDetails, Node, Project};
pub use project_structure::ProjectStructure;
pub use render_context::RenderContext;
