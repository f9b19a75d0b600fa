use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::metadata::Metadata;

/// Top-level generation unit.
///
/// Built once by the project converter, mutated in place by the metadata
/// normalizer, then handed to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Non-empty; names the output directory.
    pub name: String,
    pub repository_name: String,
    pub user_name: String,
    /// Version used for every template bundle resolved in a run.
    pub core_version: String,
    pub metadata: Metadata,
    pub nodes: Vec<Node>,
    pub modification_details: ModificationDetails,
}

impl Project {
    /// Distinct node languages, in first-seen order.
    pub fn languages(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if !seen.contains(&node.language.as_str()) {
                seen.push(&node.language);
            }
        }
        seen
    }
}

/// One generation unit inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Unique within the project; names the node's output subdirectory.
    pub name: String,
    /// Selects both the language plugin and the template bundle.
    pub language: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Audit fields recorded at conversion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationDetails {
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ModificationDetails {
    pub fn new(user: impl Into<String>, at: DateTime<Utc>) -> Self {
        let user = user.into();
        Self {
            created_by: user.clone(),
            updated_by: user,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn updated_by(&self) -> &str {
        &self.updated_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
