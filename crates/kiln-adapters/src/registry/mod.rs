//! Artifact registry adapters.
//!
//! - [`HttpRegistry`]: remote registry over HTTP
//! - [`DirectoryRegistry`]: bundle mirror on a local or mounted disk
//! - [`InMemoryRegistry`]: test double that counts fetches

mod directory;
mod http;
mod memory;

pub use directory::DirectoryRegistry;
pub use http::{DIGEST_HEADER, HttpRegistry};
pub use memory::InMemoryRegistry;

use kiln_core::{application::ApplicationError, domain::BundleKey};

fn fetch_error(key: &BundleKey, reason: impl ToString) -> ApplicationError {
    ApplicationError::ArtifactFetch {
        name: key.name().to_string(),
        version: key.version().to_string(),
        reason: reason.to_string(),
    }
}

fn not_found(key: &BundleKey) -> ApplicationError {
    ApplicationError::ArtifactNotFound {
        name: key.name().to_string(),
        version: key.version().to_string(),
    }
}
