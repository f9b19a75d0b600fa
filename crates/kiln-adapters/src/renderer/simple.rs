//! Simple variable substitution renderer.
//!
//! Walks a template directory and substitutes `{{VARIABLE}}` placeholders in
//! UTF-8 file contents and in relative paths. Non-UTF-8 files are copied
//! verbatim.

use std::{fs, path::Path};

use kiln_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{DomainValidator as validator, Permissions, ProjectStructure, RelativePath, RenderContext},
    error::KilnResult,
};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Simple renderer using basic variable substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(templates = %template_root.display()))]
    fn render(
        &self,
        template_root: &Path,
        context: &RenderContext,
        output_root: &Path,
    ) -> KilnResult<ProjectStructure> {
        if !template_root.is_dir() {
            return Err(failed(format!(
                "template directory '{}' does not exist",
                template_root.display()
            )));
        }

        let mut structure = ProjectStructure::new(output_root);

        for walk_entry in WalkDir::new(template_root).min_depth(1).sort_by_file_name() {
            let walk_entry = walk_entry.map_err(|e| failed(format!("directory walk error: {e}")))?;
            let abs_path = walk_entry.path();
            let rel_raw = abs_path.strip_prefix(template_root).map_err(|_| {
                failed(format!(
                    "failed to relativise '{}' against '{}'",
                    abs_path.display(),
                    template_root.display()
                ))
            })?;

            let rendered = context.render(&rel_raw.to_string_lossy());
            let rel = RelativePath::try_new(rendered)?;

            if walk_entry.file_type().is_dir() {
                structure.add_directory(rel.into_path_buf());
                continue;
            }

            if !walk_entry.file_type().is_file() {
                continue; // Skip symlinks and other special types.
            }

            let raw = fs::read(abs_path)
                .map_err(|e| failed(format!("failed to read '{}': {e}", abs_path.display())))?;
            let content = match String::from_utf8(raw) {
                Ok(text) => context.render(&text).into_bytes(),
                Err(binary) => binary.into_bytes(),
            };

            structure.add_file(rel.into_path_buf(), content, permissions_of(abs_path)?);
        }

        validator::validate_project_structure(&structure)?;
        debug!(entries = structure.entry_count(), "Template layer rendered");

        Ok(structure)
    }
}

fn failed(reason: String) -> kiln_core::error::KilnError {
    ApplicationError::RenderingFailed { reason }.into()
}

#[cfg(unix)]
fn permissions_of(path: &Path) -> KilnResult<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)
        .map_err(|e| failed(format!("failed to stat '{}': {e}", path.display())))?
        .permissions()
        .mode();
    Ok(if mode & 0o111 != 0 {
        Permissions::executable()
    } else {
        Permissions::read_write()
    })
}

#[cfg(not(unix))]
fn permissions_of(_path: &Path) -> KilnResult<Permissions> {
    Ok(Permissions::read_write())
}
