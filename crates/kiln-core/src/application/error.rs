//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in the
//! project model. Model errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The registry has no artifact for this (name, version).
    #[error("Template bundle '{name}@{version}' not found in the registry")]
    ArtifactNotFound { name: String, version: String },

    /// Transport, verification, unpack or cache-storage failure.
    #[error("Failed to fetch template bundle '{name}@{version}': {reason}")]
    ArtifactFetch {
        name: String,
        version: String,
        reason: String,
    },

    /// Rendering or writing a node failed.
    #[error("Generation failed for node '{node}': {reason}")]
    NodeGeneration { node: String, reason: String },

    /// Template rendering failed.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Shared state lock was poisoned.
    #[error("Internal lock poisoned: {resource}")]
    StoreLockError { resource: &'static str },
}

impl ApplicationError {
    pub(crate) fn node(node: impl Into<String>, reason: impl ToString) -> Self {
        Self::NodeGeneration {
            node: node.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ArtifactNotFound { name, version } => vec![
                format!("No bundle '{}' is published for version {}", name, version),
                "Check the project's core version".into(),
                "Check that the registry URL in your config is correct".into(),
            ],
            Self::ArtifactFetch { .. } => vec![
                "Check your network connection and registry credentials".into(),
                "Run the command again; the bundle cache is left untouched on failure".into(),
            ],
            Self::NodeGeneration { node, .. } => vec![
                format!("Output for node '{}' may be incomplete", node),
                "Output from earlier nodes is left on disk for inspection".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError { .. } => vec![
                "A previous operation panicked while holding a lock".into(),
                "Restart the command".into(),
            ],
            Self::RenderingFailed { .. } => vec!["Check the template bundle contents".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArtifactNotFound { .. } => ErrorCategory::NotFound,
            Self::ArtifactFetch { .. } => ErrorCategory::Network,
            Self::NodeGeneration { .. }
            | Self::RenderingFailed { .. }
            | Self::FilesystemError { .. }
            | Self::StoreLockError { .. } => ErrorCategory::Internal,
        }
    }
}
