//! In-process catalog backing the matcher, executor and orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{group_saves_by_rom, RemoteCatalog, SavesByRom};
use crate::models::{RemotePlatform, RemoteRom, RemoteSave};
use crate::util::dotted_extension;
use crate::{Error, Result};

/// Catalog operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOperation {
    ListPlatforms,
    ListRoms,
    ListSaves,
    Download,
    Upload,
}

/// A save received through [`RemoteCatalog::upload_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub rom_id: i64,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Store {
    platforms: Vec<RemotePlatform>,
    roms: Vec<RemoteRom>,
    saves: Vec<RemoteSave>,
    blobs: HashMap<String, Vec<u8>>,
    uploads: Vec<UploadRecord>,
    failing: HashSet<CatalogOperation>,
    next_save_id: i64,
    clock: Option<DateTime<Utc>>,
}

/// Thread-safe in-memory [`RemoteCatalog`].
#[derive(Default)]
pub struct InMemoryCatalog {
    store: Mutex<Store>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_platform(&self, id: i64, slug: &str, name: &str) {
        self.lock().platforms.push(RemotePlatform {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_rom(&self, platform_id: i64, id: i64, name: &str, content_hash: &str) {
        self.lock().roms.push(RemoteRom {
            id,
            name: name.to_string(),
            content_hash: content_hash.to_string(),
            platform_id,
        });
    }

    /// Register an existing save and the bytes served for its download path.
    pub fn add_save(&self, save: RemoteSave, bytes: impl Into<Vec<u8>>) {
        let mut store = self.lock();
        store.next_save_id = store.next_save_id.max(save.id);
        store.blobs.insert(save.download_path.clone(), bytes.into());
        store.saves.push(save);
    }

    /// Fix the `updated_at` assigned to uploads; wall-clock time otherwise.
    pub fn set_clock(&self, now: DateTime<Utc>) {
        self.lock().clock = Some(now);
    }

    pub fn fail_on(&self, operation: CatalogOperation) {
        self.lock().failing.insert(operation);
    }

    pub fn recover(&self, operation: CatalogOperation) {
        self.lock().failing.remove(&operation);
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.lock().uploads.clone()
    }

    pub fn saves_for_rom(&self, rom_id: i64) -> Vec<RemoteSave> {
        self.lock()
            .saves
            .iter()
            .filter(|save| save.rom_id == rom_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, operation: CatalogOperation) -> Result<()> {
        if self.lock().failing.contains(&operation) {
            return Err(Error::Remote(format!("{operation:?} unavailable (503)")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCatalog for InMemoryCatalog {
    async fn list_platforms(&self) -> Result<Vec<RemotePlatform>> {
        self.check(CatalogOperation::ListPlatforms)?;
        Ok(self.lock().platforms.clone())
    }

    async fn list_roms(&self, platform_id: i64) -> Result<Vec<RemoteRom>> {
        self.check(CatalogOperation::ListRoms)?;
        Ok(self
            .lock()
            .roms
            .iter()
            .filter(|rom| rom.platform_id == platform_id)
            .cloned()
            .collect())
    }

    async fn list_saves_by_platform(&self, platform_id: i64) -> Result<SavesByRom> {
        self.check(CatalogOperation::ListSaves)?;
        let store = self.lock();
        let rom_ids = store
            .roms
            .iter()
            .filter(|rom| rom.platform_id == platform_id)
            .map(|rom| rom.id)
            .collect::<HashSet<_>>();
        let saves = store
            .saves
            .iter()
            .filter(|save| rom_ids.contains(&save.rom_id))
            .cloned()
            .collect();
        Ok(group_saves_by_rom(saves))
    }

    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>> {
        self.check(CatalogOperation::Download)?;
        self.lock()
            .blobs
            .get(download_path)
            .cloned()
            .ok_or_else(|| Error::Remote(format!("no save at {download_path} (404)")))
    }

    async fn upload_save(&self, rom_id: i64, local_file: &Path) -> Result<RemoteSave> {
        self.check(CatalogOperation::Upload)?;
        let bytes = std::fs::read(local_file)?;
        let file_name = local_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidInput("upload path has no file name".to_string()))?;

        let mut store = self.lock();
        if !store.roms.iter().any(|rom| rom.id == rom_id) {
            return Err(Error::Remote(format!("rom {rom_id} not found (404)")));
        }
        store.next_save_id += 1;
        let id = store.next_save_id;
        let download_path = format!("/api/saves/{id}/content/{file_name}");
        let save = RemoteSave {
            id,
            rom_id,
            file_extension: dotted_extension(local_file).trim_start_matches('.').to_string(),
            file_name: file_name.clone(),
            download_path: download_path.clone(),
            updated_at: store.clock.unwrap_or_else(Utc::now),
            emulator: None,
        };
        store.blobs.insert(download_path, bytes.clone());
        store.uploads.push(UploadRecord {
            rom_id,
            file_name,
            bytes,
        });
        store.saves.push(save.clone());
        Ok(save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_download_serves_same_bytes() {
        let catalog = InMemoryCatalog::new();
        catalog.add_platform(1, "gba", "Game Boy Advance");
        catalog.add_rom(1, 42, "Pokemon", "abc");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pokemon.srm");
        std::fs::write(&path, b"progress").unwrap();

        let save = catalog.upload_save(42, &path).await.unwrap();

        assert_eq!(save.file_extension, "srm");
        assert_eq!(catalog.download_save(&save.download_path).await.unwrap(), b"progress");
        let grouped = catalog.list_saves_by_platform(1).await.unwrap();
        assert_eq!(grouped[&42].len(), 1);
    }

    #[tokio::test]
    async fn failing_operation_surfaces_remote_error() {
        let catalog = InMemoryCatalog::new();
        catalog.fail_on(CatalogOperation::ListPlatforms);
        assert!(matches!(catalog.list_platforms().await, Err(Error::Remote(_))));
        catalog.recover(CatalogOperation::ListPlatforms);
        assert!(catalog.list_platforms().await.unwrap().is_empty());
    }
}
