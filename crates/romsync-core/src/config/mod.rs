//! Device and remote host configuration.
//!
//! Everything the scanners, matcher and executor need to know about the
//! device layout is carried in a [`DeviceLayout`] resolved once at startup and
//! passed explicitly; nothing here is looked up through global state.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const DEFAULT_API_TIMEOUT_SECS: u64 = 30 * 60;
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60 * 60;
const DEFAULT_INDICATOR_DELAY_MS: u64 = 400;

/// Custom firmware family running on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Firmware {
    #[default]
    #[serde(rename = "muos")]
    MuOs,
    #[serde(rename = "nextui")]
    NextUi,
}

impl Firmware {
    /// Whether a platform may keep saves in several emulator-specific folders.
    pub const fn supports_multiple_emulators(self) -> bool {
        matches!(self, Self::MuOs)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MuOs => "muos",
            Self::NextUi => "nextui",
        }
    }
}

impl std::str::FromStr for Firmware {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "muos" => Ok(Self::MuOs),
            "nextui" => Ok(Self::NextUi),
            other => Err(Error::Config(format!("unsupported firmware: {other}"))),
        }
    }
}

/// Directory names used for one remote platform slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMapping {
    /// ROM sub-directory under the ROM root; the lower-cased slug when absent.
    #[serde(default)]
    pub rom_directory: Option<String>,
    /// Save sub-directories under the save root, default emulator first.
    #[serde(default)]
    pub save_directories: Vec<String>,
}

/// Resolved on-device directory layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLayout {
    #[serde(default)]
    pub firmware: Firmware,
    pub rom_root: PathBuf,
    pub save_root: PathBuf,
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformMapping>,
}

impl DeviceLayout {
    pub fn new(firmware: Firmware, rom_root: impl Into<PathBuf>, save_root: impl Into<PathBuf>) -> Self {
        Self {
            firmware,
            rom_root: rom_root.into(),
            save_root: save_root.into(),
            platforms: BTreeMap::new(),
        }
    }

    /// Builder-style helper used when assembling layouts in code.
    #[must_use]
    pub fn with_platform(mut self, slug: impl Into<String>, mapping: PlatformMapping) -> Self {
        self.platforms.insert(slug.into(), mapping);
        self
    }

    /// Known platform slugs, in stable order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    /// ROM sub-directory name for a slug.
    pub fn rom_directory_name(&self, slug: &str) -> String {
        self.platforms
            .get(slug)
            .and_then(|mapping| normalize_text_option(mapping.rom_directory.clone()))
            .unwrap_or_else(|| slug.to_lowercase())
    }

    /// Absolute ROM directory for a slug.
    pub fn rom_directory(&self, slug: &str) -> PathBuf {
        self.rom_root.join(self.rom_directory_name(slug))
    }

    /// Save sub-directory names for a slug; empty when unmapped.
    ///
    /// Firmware that keeps a single save folder per platform only ever
    /// reports the first mapping.
    pub fn save_directory_names(&self, slug: &str) -> Vec<String> {
        let Some(mapping) = self.platforms.get(slug) else {
            return Vec::new();
        };
        let names = mapping
            .save_directories
            .iter()
            .filter_map(|name| normalize_text_option(Some(name.clone())));
        if self.firmware.supports_multiple_emulators() {
            names.collect()
        } else {
            names.take(1).collect()
        }
    }

    /// Absolute save directories for a slug.
    pub fn save_directories(&self, slug: &str) -> Vec<PathBuf> {
        self.save_directory_names(slug)
            .into_iter()
            .map(|name| self.save_root.join(name))
            .collect()
    }

    /// Whether `emulator` is one of the save folders mapped for `slug`.
    pub fn is_save_directory(&self, slug: &str, emulator: &str) -> bool {
        self.save_directory_names(slug)
            .iter()
            .any(|name| name == emulator)
    }

    /// Absolute save directory for an emulator folder mapped to `slug`.
    ///
    /// Names outside the mapping are rejected so a typo or a relative path
    /// can never place a save where the scanners will not find it.
    pub fn emulator_save_directory(&self, slug: &str, emulator: &str) -> Result<PathBuf> {
        if !self.is_save_directory(slug, emulator) {
            return Err(Error::InvalidInput(format!(
                "{emulator} is not a save folder for {slug}"
            )));
        }
        Ok(self.save_root.join(emulator))
    }

    /// True when a download for this slug could land in more than one
    /// emulator folder and a person has to pick one.
    pub fn requires_emulator_choice(&self, slug: &str) -> bool {
        self.firmware.supports_multiple_emulators() && self.save_directory_names(slug).len() > 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.rom_root.as_os_str().is_empty() {
            return Err(Error::Config("rom_root must not be empty".to_string()));
        }
        if self.save_root.as_os_str().is_empty() {
            return Err(Error::Config("save_root must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Connection details for one RomM server.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    pub root_uri: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for HostConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HostConfig")
            .field("display_name", &self.display_name)
            .field("root_uri", &self.root_uri)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"*".repeat(self.password.len()))
            .finish()
    }
}

impl HostConfig {
    /// Base URL including the port when one is configured.
    pub fn url(&self) -> String {
        let root = self.root_uri.trim().trim_end_matches('/');
        if self.port == 0 {
            root.to_string()
        } else {
            format!("{root}:{}", self.port)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let root = self.root_uri.trim();
        if root.is_empty() {
            return Err(Error::Config("root_uri must not be empty".to_string()));
        }
        if !is_http_url(root) {
            return Err(Error::Config(
                "root_uri must include http:// or https://".to_string(),
            ));
        }
        Ok(())
    }
}

/// Timeouts and pacing for a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    /// How long each transfer state is held on the status indicator.
    #[serde(default = "default_indicator_delay_ms")]
    pub indicator_delay_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            indicator_delay_ms: DEFAULT_INDICATOR_DELAY_MS,
        }
    }
}

impl SyncSettings {
    pub const fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub const fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub const fn indicator_delay(&self) -> Duration {
        Duration::from_millis(self.indicator_delay_ms)
    }

    /// Settings without indicator pauses, for tests and one-shot runs.
    #[must_use]
    pub const fn without_indicator_delay(mut self) -> Self {
        self.indicator_delay_ms = 0;
        self
    }
}

const fn default_api_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

const fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

const fn default_indicator_delay_ms() -> u64 {
    DEFAULT_INDICATOR_DELAY_MS
}

/// Directory for staging renamed uploads.
pub fn upload_staging_dir() -> PathBuf {
    std::env::temp_dir().join("romsync").join("uploads")
}
