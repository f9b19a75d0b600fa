//! Python language plugin.

use std::path::{Path, PathBuf};

use crate::domain::{BUNDLE_TEMPLATE_DIR, DomainError, Node, entities::render_context};

use super::LanguagePlugin;

pub const LANGUAGE: &str = "python";

pub const PACKAGE_KEY: &str = "packageName";

#[derive(Debug, Clone)]
pub struct PythonPlugin {
    templates_root: PathBuf,
}

impl PythonPlugin {
    pub fn new(bundle_dir: &Path) -> Self {
        Self {
            templates_root: bundle_dir.join(BUNDLE_TEMPLATE_DIR),
        }
    }
}

impl LanguagePlugin for PythonPlugin {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn fill_defaults(&self, node: &mut Node) -> Result<(), DomainError> {
        if node.metadata.contains_key(PACKAGE_KEY) {
            return Ok(());
        }

        let package = render_context::to_snake_case(&node.name);
        // package names cannot start with a digit
        if package.is_empty() || package.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(DomainError::MissingDefault {
                node: node.name.clone(),
                field: PACKAGE_KEY,
                reason: format!("'{}' is not a valid package name", package),
            });
        }
        node.metadata.insert(PACKAGE_KEY, package);
        Ok(())
    }

    fn template_root(&self) -> &Path {
        &self.templates_root
    }
}
