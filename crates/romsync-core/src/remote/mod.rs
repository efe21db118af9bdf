//! Remote catalog capability.
//!
//! The sync engine only needs five operations from the catalog server. Any
//! transport that provides them can drive a sync; [`RommClient`] talks HTTP
//! to a RomM server and [`InMemoryCatalog`] keeps everything in process.

mod http;
mod memory;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

pub use http::RommClient;
pub use memory::{CatalogOperation, InMemoryCatalog, UploadRecord};

use crate::models::{RemotePlatform, RemoteRom, RemoteSave};
use crate::Result;

/// Remote saves grouped by the remote ROM id that owns them.
pub type SavesByRom = HashMap<i64, Vec<RemoteSave>>;

/// Operations the sync engine consumes from a catalog server.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// All platforms known to the server.
    async fn list_platforms(&self) -> Result<Vec<RemotePlatform>>;

    /// All ROMs registered for a platform.
    async fn list_roms(&self, platform_id: i64) -> Result<Vec<RemoteRom>>;

    /// All saves for a platform, grouped by ROM id.
    async fn list_saves_by_platform(&self, platform_id: i64) -> Result<SavesByRom>;

    /// Raw bytes of a save addressed by its server download path.
    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>>;

    /// Upload a local file as a new save for `rom_id`; returns the created save.
    async fn upload_save(&self, rom_id: i64, local_file: &Path) -> Result<RemoteSave>;
}

/// Group a flat save listing by ROM id.
pub fn group_saves_by_rom(saves: Vec<RemoteSave>) -> SavesByRom {
    let mut grouped = SavesByRom::new();
    for save in saves {
        grouped.entry(save.rom_id).or_default().push(save);
    }
    grouped
}
