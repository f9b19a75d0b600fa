//! Generation Service - main application orchestrator.
//!
//! This service drives a whole run:
//! 1. Resolve the `common` bundle for the project's core version
//! 2. For each node, in order: look up its language plugin, resolve the
//!    language bundle, fill defaults, render common + language layers,
//!    inject the license file, write to `<target>/<project>/<node>`
//! 3. Stop at the first failure; output already written stays on disk

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
        services::ArtifactResolver,
    },
    domain::{
        BUNDLE_TEMPLATE_DIR, BundleKey, DomainValidator as validator, FsEntry, License, Node,
        Permissions, Project, ProjectStructure, RenderContext,
    },
    error::KilnResult,
    languages::PluginRegistry,
};

/// File name the resolved license is written to in every node's output.
pub const LICENSE_FILE: &str = "LICENSE";

/// Main generation service.
pub struct GenerationService {
    resolver: Arc<ArtifactResolver>,
    plugins: PluginRegistry,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerationService {
    /// Create a generation service from its collaborators.
    ///
    /// The resolver is shared so several services (or threads) can reuse
    /// one bundle cache without double fetching.
    pub fn new(
        resolver: Arc<ArtifactResolver>,
        plugins: PluginRegistry,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            resolver,
            plugins,
            renderer,
            filesystem,
        }
    }

    /// Generate `project` under `target_dir` and return the project directory.
    ///
    /// The project should already be normalized. Nodes are processed in
    /// specification order and the first failing node aborts the run.
    #[instrument(
        skip_all,
        fields(
            run_id = %Uuid::new_v4(),
            project = %project.name,
            version = %project.core_version,
            target = %target_dir.display()
        )
    )]
    pub fn generate(&self, mut project: Project, target_dir: &Path) -> KilnResult<PathBuf> {
        info!(
            nodes = project.nodes.len(),
            languages = ?project.languages(),
            "Generating project"
        );

        let common_key = BundleKey::common(&project.core_version)?;
        let common_dir = self.resolver.ensure_key(&common_key)?;
        let common_root = common_dir.join(BUNDLE_TEMPLATE_DIR);

        let project_license = project.metadata.license("project")?;
        let project_dir = target_dir.join(&project.name);

        let mut nodes = std::mem::take(&mut project.nodes);
        for node in &mut nodes {
            self.generate_node(
                &project,
                node,
                &common_root,
                project_license.as_ref(),
                &project_dir,
            )?;
        }

        info!(path = %project_dir.display(), "Project generated successfully");
        Ok(project_dir)
    }

    #[instrument(skip_all, fields(node = %node.name, language = %node.language))]
    fn generate_node(
        &self,
        project: &Project,
        node: &mut Node,
        common_root: &Path,
        project_license: Option<&License>,
        project_dir: &Path,
    ) -> KilnResult<()> {
        // Checked before the pull so an unsupported language costs no fetch.
        let factory = self.plugins.factory_for(node)?;

        let bundle_dir = self.resolver.ensure(&node.language, &project.core_version)?;
        debug!("Template bundle ready");

        let plugin = factory(&bundle_dir);
        plugin.fill_defaults(node)?;

        let output_root = project_dir.join(&node.name);
        let context = RenderContext::for_node(project, node);

        let base = self
            .renderer
            .render(common_root, &context, &output_root)
            .map_err(|e| ApplicationError::node(&node.name, e))?;
        let layer = self
            .renderer
            .render(plugin.template_root(), &context, &output_root)
            .map_err(|e| ApplicationError::node(&node.name, e))?;
        let mut structure = base.overlay(layer);

        let scope = format!("node '{}'", node.name);
        let license = node
            .metadata
            .license(&scope)?
            .or_else(|| project_license.cloned());
        if let Some(license) = license.filter(License::has_path) {
            let text = self
                .filesystem
                .read_file(Path::new(&license.path))
                .map_err(|e| {
                    ApplicationError::node(&node.name, format!("cannot read license file: {e}"))
                })?;
            structure.put_file(LICENSE_FILE, text, Permissions::read_write());
        }

        validator::validate_project_structure(&structure)?;
        self.write_structure(&structure)
            .map_err(|e| ApplicationError::node(&node.name, e))?;

        info!(
            files = structure.files().count(),
            path = %output_root.display(),
            "Node generated"
        );
        Ok(())
    }

    /// Write all entries in the structure. No rollback on failure.
    fn write_structure(&self, structure: &ProjectStructure) -> KilnResult<()> {
        self.filesystem.create_dir_all(structure.root())?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    let path = structure.root().join(&dir.path);
                    self.filesystem.create_dir_all(&path)?;
                }
                FsEntry::File(file) => {
                    let path = structure.root().join(&file.path);

                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }

                    self.filesystem.write_file(&path, &file.content)?;

                    if file.permissions.executable_flag() {
                        self.filesystem.set_permissions(&path, true)?;
                    }
                }
            }
        }

        Ok(())
    }
}
