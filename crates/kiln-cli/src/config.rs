//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `KILN_*` environment variables, e.g. `KILN_REGISTRY__URL`
//! 3. Config file (`--config`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "KILN";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where template bundles come from.
    pub registry: RegistryConfig,
    /// Local bundle cache.
    pub cache: CacheConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// `http(s)://` registry base URL or a bundle mirror directory.
    pub url: Option<String>,
    /// Bearer token for HTTP registries.
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Defaults to the platform cache directory.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub no_color: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout_secs: 60,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// An explicit `config_file` must exist when `require_file` is set; the
    /// default location is always optional.
    pub fn load(config_file: Option<&Path>, require_file: bool) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;

        let file = match config_file {
            Some(path) => File::new(&path.to_string_lossy(), FileFormat::Toml).required(require_file),
            None => {
                File::new(&Self::config_path().to_string_lossy(), FileFormat::Toml).required(false)
            }
        };

        let config = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration values")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// Configured cache directory, else the platform cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("dev", "kiln", "kiln")
                .map(|d| d.cache_dir().join("bundles"))
                .unwrap_or_else(|| PathBuf::from(".kiln/cache"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_no_registry() {
        let cfg = AppConfig::default();
        assert!(cfg.registry.url.is_none());
        assert_eq!(cfg.registry.timeout_secs, 60);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kiln.toml");
        std::fs::write(
            &path,
            "[registry]\nurl = \"https://bundles.example.com\"\ntimeout_secs = 5\n\n[cache]\ndir = \"/var/cache/kiln\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path), true).unwrap();

        assert_eq!(cfg.registry.url.as_deref(), Some("https://bundles.example.com"));
        assert_eq!(cfg.registry.timeout_secs, 5);
        assert_eq!(cfg.cache_dir(), PathBuf::from("/var/cache/kiln"));
        assert_eq!(cfg.output.dir, PathBuf::from("."));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&absent), true).is_err());
        assert!(AppConfig::load(Some(&absent), false).is_ok());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.registry.timeout_secs, 60);
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
