// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! Pure data and rules: projects, nodes, metadata, bundle identity and
//! rendered structures. No filesystem or network access happens here; all
//! I/O goes through the ports in `crate::application::ports`.

pub mod entities;
pub mod error;

mod validation;

pub use entities::{
    bundle::{Artifact, BUNDLE_TEMPLATE_DIR, BundleKey, COMMON_BUNDLE},
    metadata::{LICENSE_KEY, License, Metadata},
    project::{ModificationDetails, Node, Project},
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    render_context::RenderContext,
};

pub use error::{DomainError, ErrorCategory};

pub use entities::common::{Permissions, RelativePath, clean_path, is_safe_segment};
pub use validation::DomainValidator;
