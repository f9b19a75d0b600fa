//! Language plugins.
//!
//! A plugin supplies per-language behavior for the generation service:
//! filling node defaults and locating the language's template root inside
//! its cached bundle. Plugins are looked up by the node's language key in a
//! [`PluginRegistry`].
//!
//! # Adding a language
//!
//! 1. Implement [`LanguagePlugin`] in a new module here
//! 2. Register its constructor in [`PluginRegistry::with_builtin`]
//! 3. Publish a bundle with the same name to the artifact registry
//!
//! Nothing in the generation service changes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::domain::{DomainError, Node};

pub mod go;
pub mod java;
pub mod python;

pub use go::GoPlugin;
pub use java::JavaPlugin;
pub use python::PythonPlugin;

/// Per-language behavior.
pub trait LanguagePlugin: Send + Sync {
    /// Key this plugin is registered under.
    fn language(&self) -> &str;

    /// Fill in defaults the language's templates rely on.
    ///
    /// Mutates only `node`, performs no I/O, and never overwrites values
    /// already present in the node's metadata.
    fn fill_defaults(&self, node: &mut Node) -> Result<(), DomainError>;

    /// Root of this language's template files; fixed at construction.
    fn template_root(&self) -> &Path;
}

/// Builds a plugin rooted in an unpacked bundle directory.
pub type PluginFactory = Box<dyn Fn(&Path) -> Box<dyn LanguagePlugin> + Send + Sync>;

/// Language key → plugin constructor.
#[derive(Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every plugin shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(go::LANGUAGE, |dir| Box::new(GoPlugin::new(dir)));
        registry.register(java::LANGUAGE, |dir| Box::new(JavaPlugin::new(dir)));
        registry.register(python::LANGUAGE, |dir| Box::new(PythonPlugin::new(dir)));
        registry
    }

    /// Register (or replace) the plugin for `language`.
    pub fn register<F>(&mut self, language: impl Into<String>, factory: F)
    where
        F: Fn(&Path) -> Box<dyn LanguagePlugin> + Send + Sync + 'static,
    {
        self.factories.insert(language.into(), Box::new(factory));
    }

    /// Registered language keys, sorted.
    pub fn languages(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// The constructor for `node`'s language, or `UnsupportedLanguage`.
    pub fn factory_for(&self, node: &Node) -> Result<&PluginFactory, DomainError> {
        self.factories
            .get(&node.language)
            .ok_or_else(|| DomainError::UnsupportedLanguage {
                node: node.name.clone(),
                language: node.language.clone(),
            })
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
