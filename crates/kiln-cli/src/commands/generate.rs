//! Implementation of the `kiln generate` command.
//!
//! Responsibility: read the specification, wire adapters from flags and
//! config, call the core generation service, and display results. No
//! business logic lives here.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use kiln_adapters::{DirectoryRegistry, HttpRegistry, LocalBundleCache, LocalFilesystem, SimpleRenderer};
use kiln_core::{
    application::{
        ArtifactResolver, ExternalProject, GenerateRequest, GenerationService, MetadataNormalizer,
        ProjectConverter, ProjectSpec, ports::ArtifactRegistry,
    },
    languages::PluginRegistry,
};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::{
    cli::{GenerateArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `kiln generate` command.
///
/// 1. Read and convert the specification (file or request shape)
/// 2. Resolve license paths against the working directory
/// 3. Build registry, cache, renderer and filesystem adapters
/// 4. Generate and report
#[instrument(skip_all, fields(spec = %args.spec.display()))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let external = read_spec(&args.spec)?;
    let mut project = ProjectConverter::convert(external)?;
    MetadataNormalizer::from_current_dir()?.normalize_project(&mut project)?;

    let registry = build_registry(args.registry.as_deref(), &config)?;
    let cache_dir = args.cache_dir.unwrap_or_else(|| config.cache_dir());
    debug!(cache = %cache_dir.display(), "Using bundle cache");

    let resolver = ArtifactResolver::new(registry, Arc::new(LocalBundleCache::new(cache_dir)));
    let service = GenerationService::new(
        Arc::new(resolver),
        PluginRegistry::with_builtin(),
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );

    let target = args.output.unwrap_or_else(|| config.output.dir.clone());
    let nodes: Vec<(String, String)> = project
        .nodes
        .iter()
        .map(|n| (n.name.clone(), n.language.clone()))
        .collect();
    let project_name = project.name.clone();

    let project_dir = service.generate(project, &target)?;
    info!(path = %project_dir.display(), "Generation finished");

    report(&output, &project_name, &project_dir, &nodes)?;
    Ok(())
}

/// Read a specification file.
///
/// A JSON object carrying `nodesJson` is taken as a generation request;
/// anything else as a project specification.
fn read_spec(path: &Path) -> CliResult<ExternalProject> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CliError::SpecNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(CliError::IoError {
                message: format!("Failed to read '{}'", path.display()),
                source: e,
            });
        }
    };

    let invalid = |e: serde_json::Error| CliError::InvalidInput {
        message: format!("'{}' is not a valid project specification", path.display()),
        source: Some(Box::new(e)),
    };

    let value: Value = serde_json::from_str(&text).map_err(invalid)?;
    if value.get("nodesJson").is_some() {
        let request: GenerateRequest = serde_json::from_value(value).map_err(invalid)?;
        Ok(ExternalProject::Request(request))
    } else {
        let spec: ProjectSpec = serde_json::from_value(value).map_err(invalid)?;
        Ok(ExternalProject::Spec(spec))
    }
}

/// `http(s)://` selects the HTTP registry; anything else is a mirror directory.
fn build_registry(flag: Option<&str>, config: &AppConfig) -> CliResult<Arc<dyn ArtifactRegistry>> {
    let location = flag
        .map(str::to_string)
        .or_else(|| config.registry.url.clone())
        .ok_or_else(|| CliError::ConfigError {
            message: "no artifact registry configured".into(),
            source: None,
        })?;

    if location.starts_with("http://") || location.starts_with("https://") {
        let timeout = Duration::from_secs(config.registry.timeout_secs);
        let mut registry = HttpRegistry::new(location, timeout)?;
        if let Some(token) = &config.registry.token {
            registry = registry.with_token(token);
        }
        debug!(url = registry.base_url(), "Using HTTP registry");
        Ok(Arc::new(registry))
    } else {
        let registry = DirectoryRegistry::new(PathBuf::from(location));
        debug!(root = %registry.root().display(), "Using directory registry");
        Ok(Arc::new(registry))
    }
}

fn report(
    output: &OutputManager,
    project: &str,
    project_dir: &Path,
    nodes: &[(String, String)],
) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        output.json(&json!({
            "project": project,
            "path": project_dir,
            "nodes": nodes
                .iter()
                .map(|(name, language)| json!({
                    "name": name,
                    "language": language,
                    "path": project_dir.join(name),
                }))
                .collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Project '{}' generated at {}",
        project,
        project_dir.display()
    ))?;
    output.header("Nodes:")?;
    for (name, language) in nodes {
        output.print(&format!("  {name:<24} {language}"))?;
    }
    Ok(())
}
