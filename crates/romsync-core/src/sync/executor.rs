//! Sync executor: performs one decided transfer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{upload_staging_dir, DeviceLayout};
use crate::files::{copy_file, remove_file_quietly, set_modified_time};
use crate::models::{SyncAction, SyncItem};
use crate::remote::RemoteCatalog;
use crate::scan::find_save_files;
use crate::{Error, Result};

/// Result of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub action: SyncAction,
    /// Local save file after the transfer
    pub local_path: PathBuf,
    /// Time the local file was re-stamped to
    pub synced_at: DateTime<Utc>,
}

/// Executes uploads and downloads against a catalog.
///
/// After every successful transfer the local file's modification time equals
/// the remote save's authoritative time, so deciding the same ROM again
/// yields [`SyncAction::Skip`].
pub struct SyncExecutor {
    catalog: Arc<dyn RemoteCatalog>,
    layout: DeviceLayout,
    staging_dir: PathBuf,
}

impl SyncExecutor {
    pub fn new(catalog: Arc<dyn RemoteCatalog>, layout: DeviceLayout) -> Self {
        Self {
            catalog,
            layout,
            staging_dir: upload_staging_dir(),
        }
    }

    #[must_use]
    pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = staging_dir.into();
        self
    }

    pub const fn layout(&self) -> &DeviceLayout {
        &self.layout
    }

    pub async fn execute(&self, item: &SyncItem) -> Result<SyncOutcome> {
        match item.action {
            SyncAction::Upload => self.upload(item).await,
            SyncAction::Download => self.download(item).await,
            SyncAction::Skip => Err(Error::InvalidInput(format!(
                "nothing to execute for {}",
                item.display_name()
            ))),
        }
    }

    async fn upload(&self, item: &SyncItem) -> Result<SyncOutcome> {
        let local = item.local.as_ref().ok_or(Error::MissingLocalSave)?;

        let staged = self
            .staging_dir
            .join(format!("{}{}", item.game_base, local.extension()));
        copy_file(&local.path, &staged)?;

        let uploaded = self.catalog.upload_save(item.rom_id, &staged).await;
        remove_file_quietly(&staged);
        let remote = uploaded?;

        let synced_at = remote.authoritative_time();
        set_modified_time(&local.path, synced_at)?;

        tracing::info!(
            rom = %item.display_name(),
            slug = %item.slug,
            remote_save_id = remote.id,
            "Uploaded save"
        );
        Ok(SyncOutcome {
            action: SyncAction::Upload,
            local_path: local.path.clone(),
            synced_at,
        })
    }

    async fn download(&self, item: &SyncItem) -> Result<SyncOutcome> {
        let remote = item.remote.as_ref().ok_or(Error::MissingRemoteSave)?;
        let directory = self.destination_directory(item)?;

        if let Some(local) = &item.local {
            local.backup()?;
        }

        let bytes = self.catalog.download_save(&remote.download_path).await?;

        let destination = directory.join(format!("{}{}", item.game_base, remote.dotted_extension()));
        fs::create_dir_all(&directory)?;
        fs::write(&destination, &bytes)?;

        let synced_at = remote.authoritative_time();
        set_modified_time(&destination, synced_at)?;

        if let Some(local) = &item.local {
            if local.path != destination {
                remove_file_quietly(&local.path);
            }
        }

        tracing::info!(
            rom = %item.display_name(),
            slug = %item.slug,
            path = %destination.display(),
            bytes = bytes.len(),
            "Downloaded save"
        );
        Ok(SyncOutcome {
            action: SyncAction::Download,
            local_path: destination,
            synced_at,
        })
    }

    /// Where a downloaded save for `item` should be written.
    ///
    /// An explicit emulator choice wins and must name a folder mapped for the
    /// item's platform, then the existing local save's
    /// directory, then the directory of any other save on the same platform.
    pub fn destination_directory(&self, item: &SyncItem) -> Result<PathBuf> {
        if let Some(emulator) = item.selected_emulator.as_deref() {
            return self.layout.emulator_save_directory(&item.slug, emulator);
        }
        if let Some(directory) = item.local.as_ref().and_then(|local| local.directory()) {
            return Ok(directory.to_path_buf());
        }
        find_save_files(&self.layout, &item.slug)
            .first()
            .and_then(|save| save.directory().map(Path::to_path_buf))
            .ok_or_else(|| Error::SaveLocationUnknown(item.slug.clone()))
    }
}
