use std::collections::HashSet;

use crate::domain::{
    entities::{ProjectStructure, common::is_safe_segment, project::Project},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// Check the identity and node invariants of a converted project.
    pub fn validate_project(project: &Project) -> Result<(), DomainError> {
        if project.name.trim().is_empty() {
            return Err(DomainError::conversion("project name is required"));
        }
        if !is_safe_segment(&project.name) {
            return Err(DomainError::conversion(format!(
                "project name '{}' must be usable as a directory name",
                project.name
            )));
        }
        if project.core_version.trim().is_empty() {
            return Err(DomainError::conversion("core version is required"));
        }
        if project.nodes.is_empty() {
            return Err(DomainError::conversion("at least one node is required"));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for node in &project.nodes {
            if node.id.trim().is_empty() {
                return Err(DomainError::conversion("node id is required"));
            }
            if node.language.trim().is_empty() {
                return Err(DomainError::conversion(format!(
                    "node '{}' has no language",
                    node.id
                )));
            }
            if !is_safe_segment(&node.name) {
                return Err(DomainError::conversion(format!(
                    "node '{}' has an invalid name '{}'",
                    node.id, node.name
                )));
            }
            if !ids.insert(node.id.as_str()) {
                return Err(DomainError::conversion(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            if !names.insert(node.name.as_str()) {
                return Err(DomainError::conversion(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        Ok(())
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }
}
