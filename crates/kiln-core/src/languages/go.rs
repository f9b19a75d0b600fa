//! Go language plugin.

use std::path::{Path, PathBuf};

use crate::domain::{BUNDLE_TEMPLATE_DIR, DomainError, Node, entities::render_context};

use super::LanguagePlugin;

pub const LANGUAGE: &str = "go";

/// Metadata key holding the Go module path.
pub const MODULE_KEY: &str = "goModule";

#[derive(Debug, Clone)]
pub struct GoPlugin {
    templates_root: PathBuf,
}

impl GoPlugin {
    pub fn new(bundle_dir: &Path) -> Self {
        Self {
            templates_root: bundle_dir.join(BUNDLE_TEMPLATE_DIR),
        }
    }
}

impl LanguagePlugin for GoPlugin {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn fill_defaults(&self, node: &mut Node) -> Result<(), DomainError> {
        if node.metadata.contains_key(MODULE_KEY) {
            return Ok(());
        }

        let module = render_context::to_kebab_case(&node.name);
        if module.is_empty() {
            return Err(DomainError::MissingDefault {
                node: node.name.clone(),
                field: MODULE_KEY,
                reason: "node name contains no usable characters".into(),
            });
        }
        node.metadata.insert(MODULE_KEY, module);
        Ok(())
    }

    fn template_root(&self) -> &Path {
        &self.templates_root
    }
}
