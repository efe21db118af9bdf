//! Local ROM model

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LocalSave, RemoteRomRef, RemoteSave, SyncAction};
use crate::sync::decision::{decide, latest_remote_save};
use crate::util::file_stem;

/// A ROM file found on the device.
///
/// The content hash is the only identity shared with the catalog server;
/// file names are display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRom {
    /// Remote platform slug
    pub slug: String,
    /// Absolute path of the ROM file
    pub path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// Lower-case hex SHA-1 of the file, empty when hashing failed
    pub hash: String,
    pub last_modified: DateTime<Utc>,
    /// Catalog identity, filled in by the matcher
    #[serde(default)]
    pub remote: Option<RemoteRomRef>,
    /// Remote save history for the matched ROM
    #[serde(default)]
    pub remote_saves: Vec<RemoteSave>,
    /// Local save paired by file stem
    #[serde(default)]
    pub save: Option<LocalSave>,
}

impl LocalRom {
    /// File name without extension; transferred saves are named after it.
    pub fn base_name(&self) -> String {
        file_stem(&self.file_name)
    }

    pub const fn is_matched(&self) -> bool {
        self.remote.is_some()
    }

    /// Most recent remote save by authoritative time.
    pub fn latest_remote_save(&self) -> Option<&RemoteSave> {
        latest_remote_save(&self.remote_saves)
    }

    pub fn sync_action(&self) -> SyncAction {
        decide(self.save.as_ref(), self.latest_remote_save())
    }
}
