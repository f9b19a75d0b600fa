//! Java language plugin.

use std::path::{Path, PathBuf};

use crate::domain::{BUNDLE_TEMPLATE_DIR, DomainError, Node, entities::render_context};

use super::LanguagePlugin;

pub const LANGUAGE: &str = "java";

pub const GROUP_ID_KEY: &str = "groupId";
pub const ARTIFACT_ID_KEY: &str = "artifactId";
const DEFAULT_GROUP_ID: &str = "com.example";

#[derive(Debug, Clone)]
pub struct JavaPlugin {
    templates_root: PathBuf,
}

impl JavaPlugin {
    pub fn new(bundle_dir: &Path) -> Self {
        Self {
            templates_root: bundle_dir.join(BUNDLE_TEMPLATE_DIR),
        }
    }
}

impl LanguagePlugin for JavaPlugin {
    fn language(&self) -> &str {
        LANGUAGE
    }

    fn fill_defaults(&self, node: &mut Node) -> Result<(), DomainError> {
        node.metadata.insert_default(GROUP_ID_KEY, DEFAULT_GROUP_ID);
        let artifact = render_context::to_kebab_case(&node.name);
        if !artifact.is_empty() {
            node.metadata.insert_default(ARTIFACT_ID_KEY, artifact);
        }
        Ok(())
    }

    fn template_root(&self) -> &Path {
        &self.templates_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_maven_coordinates() {
        let plugin = JavaPlugin::new(Path::new("/cache/java/2.0.0"));
        let mut node = Node::new("n2", "BillingService", "java");
        node.metadata.insert(GROUP_ID_KEY, "io.acme");

        plugin.fill_defaults(&mut node).unwrap();

        assert_eq!(node.metadata.get_str(GROUP_ID_KEY), Some("io.acme"));
        assert_eq!(
            node.metadata.get_str(ARTIFACT_ID_KEY),
            Some("billing-service")
        );
    }
}
