use anyhow::{Context, Result};
use prodcat::Settings;
use prodcat::config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Where the active settings came from
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsSource {
    Flag(PathBuf),
    Env(PathBuf),
    Discovered(PathBuf),
    Defaults,
}

/// Settings plus their origin, shared by every command
pub struct CliContext {
    pub settings: Settings,
    pub source: SettingsSource,
}

impl CliContext {
    /// Resolve settings: `--config`, then the env var, then `prodcat.toml`
    /// in the current directory or an ancestor, then defaults.
    pub fn load(config_flag: Option<&Path>) -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_from(config_flag, &current_dir)
    }

    pub fn load_from(config_flag: Option<&Path>, start: &Path) -> Result<Self> {
        if let Some(path) = config_flag {
            return Self::from_file(path, SettingsSource::Flag(path.to_path_buf()));
        }

        if let Some(path) = Settings::env_path() {
            return Self::from_file(&path, SettingsSource::Env(path.clone()));
        }

        if let Some(path) = find_config_file(start) {
            return Self::from_file(&path, SettingsSource::Discovered(path.clone()));
        }

        Ok(Self {
            settings: Settings::default(),
            source: SettingsSource::Defaults,
        })
    }

    fn from_file(path: &Path, source: SettingsSource) -> Result<Self> {
        let settings =
            Settings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))?;
        Ok(Self { settings, source })
    }

    pub fn describe_source(&self) -> String {
        match &self.source {
            SettingsSource::Flag(path) => format!("{} (--config)", path.display()),
            SettingsSource::Env(path) => format!("{} (${CONFIG_ENV_VAR})", path.display()),
            SettingsSource::Discovered(path) => path.display().to_string(),
            SettingsSource::Defaults => "built-in defaults".to_string(),
        }
    }
}

/// Walk up from `start` looking for the settings file
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Read and deserialize a JSON document
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a value as pretty JSON
pub async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
