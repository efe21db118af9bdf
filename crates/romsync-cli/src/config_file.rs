//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use romsync_core::config::{DeviceLayout, HostConfig, PlatformMapping, SyncSettings};
use romsync_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";

pub const ROM_DIRECTORY_ENV: &str = "ROMSYNC_ROM_DIRECTORY";
pub const SAVE_DIRECTORY_ENV: &str = "ROMSYNC_SAVE_DIRECTORY";
pub const PASSWORD_ENV: &str = "ROMSYNC_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub host: Option<HostConfig>,
    #[serde(default)]
    pub layout: DeviceLayout,
    #[serde(default)]
    pub settings: SyncSettings,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("romsync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve config directory".to_string())
}

/// `--config` when given, else the per-user default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, String> {
    explicit.map_or_else(default_config_path, |path| Ok(path.to_path_buf()))
}

impl AppConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Apply `ROMSYNC_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rom_root) = normalize_text_option(lookup(ROM_DIRECTORY_ENV)) {
            self.layout.rom_root = PathBuf::from(rom_root);
        }
        if let Some(save_root) = normalize_text_option(lookup(SAVE_DIRECTORY_ENV)) {
            self.layout.save_root = PathBuf::from(save_root);
        }
        if let Some(password) = lookup(PASSWORD_ENV).filter(|value| !value.is_empty()) {
            if let Some(host) = self.host.as_mut() {
                host.password = password;
            }
        }
    }

    /// Copy safe to print: the password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(host) = copy.host.as_mut() {
            host.password = "*".repeat(host.password.len());
        }
        copy
    }

    pub fn set_platform(&mut self, slug: &str, mapping: PlatformMapping) {
        self.layout.platforms.insert(slug.trim().to_string(), mapping);
    }

    fn normalize(&mut self) {
        if let Some(host) = self.host.as_mut() {
            host.display_name = normalize_text_option(host.display_name.take());
            host.root_uri = host.root_uri.trim().trim_end_matches('/').to_string();
            host.username = host.username.trim().to_string();
        }
        for mapping in self.layout.platforms.values_mut() {
            mapping.rom_directory = normalize_text_option(mapping.rom_directory.take());
            mapping.save_directories = std::mem::take(&mut mapping.save_directories)
                .into_iter()
                .filter_map(|name| normalize_text_option(Some(name)))
                .collect();
        }
    }
}
