// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so a failed run can be reported more than once)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Input Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid project specification: {reason}")]
    Conversion { reason: String },

    #[error("Malformed license metadata at {scope}: {reason}")]
    MetadataDecode { scope: String, reason: String },

    #[error("Cannot resolve path '{path}': {reason}")]
    PathResolution { path: String, reason: String },

    #[error("Invalid bundle key '{name}@{version}': {reason}")]
    InvalidBundleKey {
        name: String,
        version: String,
        reason: String,
    },

    #[error("Duplicate path in rendered output: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    #[error("Node '{node}' uses unsupported language '{language}'")]
    UnsupportedLanguage { node: String, language: String },

    #[error("Cannot compute default '{field}' for node '{node}': {reason}")]
    MissingDefault {
        node: String,
        field: &'static str,
        reason: String,
    },
}

impl DomainError {
    pub(crate) fn conversion(reason: impl Into<String>) -> Self {
        Self::Conversion {
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Conversion { reason } => vec![
                "Check the project specification".into(),
                format!("Details: {}", reason),
                "Every project needs a name, a core version and at least one node".into(),
            ],
            Self::MetadataDecode { scope, .. } => vec![
                format!("The 'license' entry at {} could not be read", scope),
                "Expected an object such as {\"path\": \"LICENSE\"}".into(),
            ],
            Self::PathResolution { path, .. } => vec![
                format!("Check that '{}' is a valid path", path),
                "Relative license paths are resolved against the working directory".into(),
            ],
            Self::UnsupportedLanguage { language, .. } => vec![
                format!("No language plugin is registered for '{}'", language),
                "Supported languages: go, java, python".into(),
            ],
            Self::MissingDefault { field, .. } => vec![
                format!("Set '{}' explicitly in the node metadata", field),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Conversion { .. }
            | Self::MetadataDecode { .. }
            | Self::PathResolution { .. }
            | Self::InvalidBundleKey { .. }
            | Self::MissingDefault { .. } => ErrorCategory::Validation,
            Self::UnsupportedLanguage { .. } => ErrorCategory::Compatibility,
            Self::DuplicatePath { .. } | Self::AbsolutePathNotAllowed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    Internal,
}
