//! Configuration for schema registration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (register.toml)
//! - Environment variables (SCHEMA_REGISTER__*)
//!
//! ## Example config file (register.toml):
//! ```toml
//! [registry]
//! path = "./registry"
//!
//! [register]
//! root_dir = "."
//! output_dir = "build/schema-registry"
//! fail_fast = false
//! quiet = false
//!
//! [[subjects]]
//! subject = "address"
//! file = "schemas/address.avsc"
//! type = "AVRO"
//!
//! [[subjects]]
//! subject = "user"
//! file = "schemas/user.avsc"
//! type = "AVRO"
//! normalize = true
//! references = [{ name = "com.acme.Address", subject = "address", version = -1 }]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::subject::Subject;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Registration run settings
    #[serde(default)]
    pub register: RunConfig,

    /// Subjects to register, in order
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the local registry directory
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,
}

/// Registration run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory subject files are relative to
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Directory for registered.csv, relative to root_dir (no report when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Stop at the first failing subject
    #[serde(default)]
    pub fail_fast: bool,

    /// Skip per-subject info logs
    #[serde(default)]
    pub quiet: bool,
}

// Default value functions
fn default_registry_path() -> PathBuf {
    PathBuf::from("registry")
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            output_dir: None,
            fail_fast: false,
            quiet: false,
        }
    }
}

impl RegisterConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["register.toml", ".register.toml", "config/register.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "familiar", "schema-register")
        {
            let xdg_config = config_dir.config_dir().join("register.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_REGISTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the root directory, resolving a relative path against the
    /// working directory
    pub fn root_dir(&self) -> std::io::Result<PathBuf> {
        absolute(&self.register.root_dir)
    }

    /// Get the registry path
    pub fn registry_path(&self) -> std::io::Result<PathBuf> {
        absolute(&self.registry.path)
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
