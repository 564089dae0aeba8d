//! Deployment settings, loaded from TOML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analyzer::FieldDescriptions;
use crate::assembler::CustomFieldPolicy;
use crate::errors::CatalogError;

/// Environment variable naming a settings file.
pub const CONFIG_ENV_VAR: &str = "PRODCAT_CONFIG";

/// Settings file looked up from the working directory upwards.
pub const CONFIG_FILE_NAME: &str = "prodcat.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub analyzer: AnalyzerSettings,
    #[serde(default)]
    pub assembler: AssemblerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Start from the built-in dictionary of well-known product fields.
    #[serde(default = "default_true")]
    pub builtin_descriptions: bool,
    /// Deployment-specific descriptions; these override built-in entries.
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            builtin_descriptions: default_true(),
            descriptions: BTreeMap::new(),
        }
    }
}

impl AnalyzerSettings {
    pub fn field_descriptions(&self) -> FieldDescriptions {
        let mut descriptions = if self.builtin_descriptions {
            FieldDescriptions::default()
        } else {
            FieldDescriptions::empty()
        };
        for (key, description) in &self.descriptions {
            descriptions.insert(key.clone(), description.clone());
        }
        descriptions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblerSettings {
    #[serde(default)]
    pub custom_fields: CustomFieldPolicy,
    #[serde(default)]
    pub enforce_constraints: bool,
}

fn default_true() -> bool {
    true
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        toml::from_str(content).map_err(|err| CatalogError::Config {
            message: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|err| CatalogError::Config {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// The settings file named by [`CONFIG_ENV_VAR`]; unset and empty both
    /// mean none.
    pub fn env_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    pub fn to_toml_string(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(self).map_err(|err| CatalogError::Config {
            message: err.to_string(),
        })
    }
}
