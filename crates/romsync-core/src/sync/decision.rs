//! Sync decision table.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::config::DeviceLayout;
use crate::models::{LocalRom, LocalSave, RemoteSave, SyncAction, SyncItem};
use crate::scan::LocalRomsBySlug;

/// Decide what to do for one ROM.
///
/// | local | remote | times           | action   |
/// |-------|--------|-----------------|----------|
/// | -     | -      |                 | Skip     |
/// | yes   | -      |                 | Upload   |
/// | -     | yes    |                 | Download |
/// | yes   | yes    | local < remote  | Download |
/// | yes   | yes    | local == remote | Skip     |
/// | yes   | yes    | local > remote  | Upload   |
pub fn decide(local: Option<&LocalSave>, remote: Option<&RemoteSave>) -> SyncAction {
    match (local, remote) {
        (None, None) => SyncAction::Skip,
        (Some(_), None) => SyncAction::Upload,
        (None, Some(_)) => SyncAction::Download,
        (Some(local), Some(remote)) => {
            match compare_times(local.last_modified, remote.authoritative_time()) {
                Ordering::Less => SyncAction::Download,
                Ordering::Equal => SyncAction::Skip,
                Ordering::Greater => SyncAction::Upload,
            }
        }
    }
}

/// Compare a local modification time with a remote authoritative time.
///
/// Embedded save timestamps carry milliseconds, so both sides are compared
/// at millisecond resolution.
pub fn compare_times(local: DateTime<Utc>, remote: DateTime<Utc>) -> Ordering {
    local.timestamp_millis().cmp(&remote.timestamp_millis())
}

/// Most recent save by authoritative time; ties go to the higher server id.
pub fn latest_remote_save(saves: &[RemoteSave]) -> Option<&RemoteSave> {
    saves
        .iter()
        .max_by_key(|save| (save.authoritative_time(), save.id))
}

/// Build the sync item for a matched ROM, or `None` when there is nothing
/// to do or the ROM has no catalog identity.
pub fn sync_item_for(rom: &LocalRom) -> Option<SyncItem> {
    let remote_rom = rom.remote.as_ref()?;
    let action = rom.sync_action();
    if action == SyncAction::Skip {
        return None;
    }

    Some(SyncItem {
        rom_id: remote_rom.id,
        rom_name: remote_rom.name.clone(),
        slug: rom.slug.clone(),
        game_base: rom.base_name(),
        local: rom.save.clone(),
        remote: rom.latest_remote_save().cloned(),
        action,
        selected_emulator: None,
    })
}

/// Decide every matched ROM across all platforms.
pub fn build_sync_items(roms: &LocalRomsBySlug) -> Vec<SyncItem> {
    roms.values().flatten().filter_map(sync_item_for).collect()
}

/// Whether executing `item` first needs a person to pick an emulator folder.
///
/// Only downloads with no existing local save on a platform that maps to
/// several emulator folders are ambiguous; writing into the wrong one would
/// silently orphan the save.
pub fn requires_emulator_selection(item: &SyncItem, layout: &DeviceLayout) -> bool {
    item.action == SyncAction::Download
        && item.local.is_none()
        && item.selected_emulator.is_none()
        && layout.requires_emulator_choice(&item.slug)
}
