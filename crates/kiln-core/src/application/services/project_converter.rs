//! Project Converter - external representations to the canonical model.
//!
//! Two shapes reach the core: a deserialized specification file and an
//! RPC-style request whose nodes and metadata travel as JSON text. Both are
//! reduced to the same [`Project`] and validated once. No filesystem or
//! network access happens here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    domain::{DomainError, DomainValidator as validator, Metadata, ModificationDetails, Node, Project},
    error::KilnResult,
};

/// Everything the converter accepts.
#[derive(Debug, Clone)]
pub enum ExternalProject {
    Spec(ProjectSpec),
    Request(GenerateRequest),
}

/// A project specification as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default, alias = "compageCoreVersion")]
    pub core_version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// One node of a [`ProjectSpec`]. `name` defaults to `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// An RPC-style generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_name: String,
    pub repository_name: String,
    pub user_name: String,
    pub core_version: String,
    /// JSON array of nodes, same shape as [`NodeSpec`].
    pub nodes_json: String,
    /// JSON object; empty means no metadata.
    #[serde(default)]
    pub metadata_json: String,
}

pub struct ProjectConverter;

impl ProjectConverter {
    /// Convert using the current time for the audit fields.
    pub fn convert(external: ExternalProject) -> KilnResult<Project> {
        Self::convert_at(external, Utc::now())
    }

    #[instrument(skip_all)]
    pub fn convert_at(external: ExternalProject, now: DateTime<Utc>) -> KilnResult<Project> {
        let spec = match external {
            ExternalProject::Spec(spec) => spec,
            ExternalProject::Request(request) => Self::request_to_spec(request)?,
        };

        let nodes = spec
            .nodes
            .into_iter()
            .map(|n| Node {
                name: n.name.unwrap_or_else(|| n.id.clone()),
                id: n.id,
                language: n.language,
                metadata: n.metadata,
            })
            .collect();

        let project = Project {
            modification_details: ModificationDetails::new(&spec.user_name, now),
            name: spec.name,
            repository_name: spec.repository_name,
            user_name: spec.user_name,
            core_version: spec.core_version,
            metadata: spec.metadata,
            nodes,
        };

        validator::validate_project(&project)?;
        debug!(
            project = %project.name,
            nodes = project.nodes.len(),
            "Project converted"
        );

        Ok(project)
    }

    fn request_to_spec(request: GenerateRequest) -> Result<ProjectSpec, DomainError> {
        let nodes: Vec<NodeSpec> = serde_json::from_str(&request.nodes_json)
            .map_err(|e| DomainError::conversion(format!("invalid nodes payload: {e}")))?;

        let metadata = if request.metadata_json.trim().is_empty() {
            Metadata::new()
        } else {
            let value: Value = serde_json::from_str(&request.metadata_json)
                .map_err(|e| DomainError::conversion(format!("invalid metadata payload: {e}")))?;
            if !value.is_object() {
                return Err(DomainError::conversion("metadata payload must be a JSON object"));
            }
            serde_json::from_value(value)
                .map_err(|e| DomainError::conversion(format!("invalid metadata payload: {e}")))?
        };

        Ok(ProjectSpec {
            name: request.project_name,
            repository_name: request.repository_name,
            user_name: request.user_name,
            core_version: request.core_version,
            metadata,
            nodes,
        })
    }
}
