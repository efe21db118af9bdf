//! Sync decisions and unresolved issues

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LocalSave, RemoteSave};

/// What to do with one ROM's save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAction {
    Upload,
    Download,
    Skip,
}

impl SyncAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "UPLOAD",
            Self::Download => "DOWNLOAD",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One decided, not yet executed, sync action for a single ROM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItem {
    /// Remote ROM id
    pub rom_id: i64,
    /// Remote ROM display name
    #[serde(default)]
    pub rom_name: String,
    pub slug: String,
    /// ROM file name without extension
    pub game_base: String,
    pub local: Option<LocalSave>,
    /// Most recent remote save
    pub remote: Option<RemoteSave>,
    pub action: SyncAction,
    /// Emulator save folder picked by a person for an ambiguous download
    #[serde(default)]
    pub selected_emulator: Option<String>,
}

impl SyncItem {
    /// Label for lists: remote name when known, else the file base name.
    pub fn display_name(&self) -> &str {
        if self.rom_name.trim().is_empty() {
            &self.game_base
        } else {
            &self.rom_name
        }
    }

    pub fn set_selected_emulator(&mut self, emulator: impl Into<String>) {
        self.selected_emulator = Some(emulator.into());
    }
}

/// A sync item that needs a person, either to pick an emulator folder or
/// because executing it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIssue {
    pub item: SyncItem,
    pub needs_emulator: bool,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl SyncIssue {
    pub const fn needs_emulator(item: SyncItem) -> Self {
        Self {
            item,
            needs_emulator: true,
            error_message: None,
        }
    }

    pub fn failed(item: SyncItem, error_message: impl Into<String>) -> Self {
        Self {
            item,
            needs_emulator: false,
            error_message: Some(error_message.into()),
        }
    }

    /// Issues have no durable id; they are identified by game and platform.
    pub fn same_target(&self, other: &Self) -> bool {
        self.item.game_base == other.item.game_base && self.item.slug == other.item.slug
    }

    /// Short status suffix for list rendering.
    pub const fn status_label(&self) -> &'static str {
        if self.needs_emulator {
            "Select emulator"
        } else {
            "Failed"
        }
    }
}
