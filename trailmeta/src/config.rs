use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_ACCESSOR_PREFIXES, DEFAULT_ID_ANNOTATIONS, ENV_META_CONFIG_PATH},
    error::{MetaError, MetaResult},
};

fn default_accessor_prefixes() -> Vec<String> {
    DEFAULT_ACCESSOR_PREFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_id_annotations() -> Vec<String> {
    DEFAULT_ID_ANNOTATIONS.iter().map(|s| s.to_string()).collect()
}

/// Conventions used by property discovery.
///
/// Every field is optional in the TOML form; missing fields take their default.
///
/// ```toml
/// accessor_prefixes = ["get", "is"]
/// id_annotations = ["Id"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Name prefixes an accessor must start with.
    #[serde(default = "default_accessor_prefixes")]
    pub accessor_prefixes: Vec<String>,

    /// Annotations marking an accessor as part of its class's identity.
    #[serde(default = "default_id_annotations")]
    pub id_annotations: Vec<String>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            accessor_prefixes: default_accessor_prefixes(),
            id_annotations: default_id_annotations(),
        }
    }
}

impl MetaConfig {
    /// Get the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_META_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push("trail");
        path.push("meta.toml");
        path
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> MetaResult<Self> {
        toml::from_str(toml_str).map_err(|e| MetaError::ConfigParse {
            source: e,
            file: "<inline>".to_string(),
        })
    }

    /// Load a configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> MetaResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;

        toml::from_str(&toml_str).map_err(|e| MetaError::ConfigParse {
            source: e,
            file: path.display().to_string(),
        })
    }

    /// Load the configuration found at [`Self::default_path`], falling back to
    /// the defaults when no file exists there.
    pub fn load_or_default() -> MetaResult<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load_from_toml(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the prefix `name` starts with, if it is a recognised accessor name.
    pub fn accessor_prefix<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.accessor_prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| name.starts_with(prefix))
    }

    /// Returns `true` if `annotation` marks an identity accessor.
    pub fn is_id_annotation(&self, annotation: &str) -> bool {
        self.id_annotations.iter().any(|a| a == annotation)
    }
}
