//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Kiln
//! multi-node project generator, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │       (converts, normalizes, runs)      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │ (GenerationService, ArtifactResolver)   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Registry, Cache, Filesystem, Render)   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (HttpRegistry, LocalBundleCache, ...)   │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │   Domain Layer + Language Plugins       │
//! │ (Project, Node, Metadata, GoPlugin...)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kiln_core::prelude::*;
//!
//! let project = ProjectConverter::convert(ExternalProject::Spec(spec))?;
//! let mut project = project;
//! MetadataNormalizer::from_current_dir()?.normalize_project(&mut project)?;
//!
//! let resolver = Arc::new(ArtifactResolver::new(registry, cache));
//! let service = GenerationService::new(resolver, PluginRegistry::with_builtin(), renderer, fs);
//! service.generate(project, "./out".as_ref())?;
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod languages;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactResolver, ExternalProject, GenerateRequest, GenerationService,
        MetadataNormalizer, NodeSpec, ProjectConverter, ProjectSpec,
        ports::{ArtifactRegistry, BundleCache, Filesystem, TemplateRenderer},
    };
    pub use crate::domain::{
        Artifact, BundleKey, License, Metadata, Node, Project, ProjectStructure, RenderContext,
    };
    pub use crate::error::{KilnError, KilnResult};
    pub use crate::languages::{LanguagePlugin, PluginRegistry};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
