//! Coarse sync status shared with status indicators.

use serde::{Deserialize, Serialize};

/// Status icon state for the background sync.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Scanning,
    Uploading,
    Downloading,
    /// Last cycle finished with nothing left to resolve
    Clean,
    /// Unresolved issues are waiting for a person
    Issues,
}

impl SyncStatus {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Scanning => 1,
            Self::Uploading => 2,
            Self::Downloading => 3,
            Self::Clean => 4,
            Self::Issues => 5,
        }
    }

    /// Unknown values read as [`SyncStatus::Idle`].
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Scanning,
            2 => Self::Uploading,
            3 => Self::Downloading,
            4 => Self::Clean,
            5 => Self::Issues,
            _ => Self::Idle,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Uploading => "uploading",
            Self::Downloading => "downloading",
            Self::Clean => "clean",
            Self::Issues => "issues",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}
