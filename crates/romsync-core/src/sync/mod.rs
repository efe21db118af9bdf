//! Save synchronization engine.
//!
//! One pass runs scan, match and decide to produce a [`SyncPlan`]; the
//! [`executor::SyncExecutor`] then carries out each item.

pub mod decision;
pub mod executor;
pub mod matcher;

use serde::Serialize;

pub use decision::{build_sync_items, decide, latest_remote_save, requires_emulator_selection};
pub use executor::{SyncExecutor, SyncOutcome};
pub use matcher::{match_catalog, MatchReport};

use crate::config::DeviceLayout;
use crate::models::SyncItem;
use crate::remote::RemoteCatalog;
use crate::scan::{scan_all_roms, LocalRomsBySlug};
use crate::{Error, Result};

/// Decided work for one cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    /// Scanned ROMs with catalog identity attached where it matched
    pub roms: LocalRomsBySlug,
    pub report: MatchReport,
    /// Everything that needs an upload or download
    pub items: Vec<SyncItem>,
}

/// Scan the device, match it against the catalog and decide every ROM.
///
/// Scanning hashes every ROM file and runs on the blocking pool.
pub async fn find_save_syncs(catalog: &dyn RemoteCatalog, layout: &DeviceLayout) -> Result<SyncPlan> {
    let scan_layout = layout.clone();
    let mut roms = tokio::task::spawn_blocking(move || scan_all_roms(&scan_layout))
        .await
        .map_err(|error| Error::Task(error.to_string()))?;

    let report = match_catalog(catalog, &mut roms).await?;
    let items = build_sync_items(&roms);
    tracing::info!(items = items.len(), "Found save syncs");

    Ok(SyncPlan { roms, report, items })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{Firmware, PlatformMapping};
    use crate::files::set_modified_time;
    use crate::models::SyncAction;
    use crate::remote::InMemoryCatalog;
    use crate::scan::hash_file;

    #[tokio::test]
    async fn unmatched_rom_is_excluded_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DeviceLayout::new(Firmware::NextUi, dir.path().join("roms"), dir.path().join("saves"))
            .with_platform(
                "gba",
                PlatformMapping {
                    rom_directory: None,
                    save_directories: vec!["GBA".to_string()],
                },
            );
        let rom_dir = layout.rom_directory("gba");
        fs::create_dir_all(&rom_dir).unwrap();
        fs::create_dir_all(dir.path().join("saves/GBA")).unwrap();
        fs::write(rom_dir.join("Known.gba"), b"known").unwrap();
        fs::write(rom_dir.join("Homebrew.gba"), b"homebrew").unwrap();
        let known_save = dir.path().join("saves/GBA/Known.sav");
        fs::write(&known_save, b"save").unwrap();
        set_modified_time(&known_save, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()).unwrap();
        fs::write(dir.path().join("saves/GBA/Homebrew.sav"), b"save").unwrap();

        let catalog = InMemoryCatalog::new();
        catalog.add_platform(1, "gba", "Game Boy Advance");
        catalog.add_rom(1, 42, "Known", &hash_file(&rom_dir.join("Known.gba")).unwrap());

        let plan = find_save_syncs(&catalog, &layout).await.unwrap();

        assert_eq!(plan.report.matched, 1);
        assert_eq!(plan.report.unmatched, 1);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].game_base, "Known");
        assert_eq!(plan.items[0].action, SyncAction::Upload);
    }
}
