//! Local ROM scanner.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::hash::hash_file;
use super::saves::find_save_files;
use crate::config::DeviceLayout;
use crate::models::{LocalRom, LocalSave};
use crate::util::{file_stem, is_hidden};

/// Scan results keyed by platform slug.
pub type LocalRomsBySlug = BTreeMap<String, Vec<LocalRom>>;

const SKIP_EXTENSIONS: &[&str] = &[
    ".txt", ".nfo", ".diz", ".db", ".ini", ".cfg", ".conf", ".jpg", ".jpeg", ".png", ".gif",
    ".bmp", ".m3u", ".cue", ".srm", ".sav", ".state",
];

const SKIP_NAMES: &[&str] = &["desktop.ini", "thumbs.db", ".ds_store"];

/// Scan every mapped platform's ROM directory.
///
/// Platforms whose directory is missing or empty are left out of the result.
pub fn scan_all_roms(layout: &DeviceLayout) -> LocalRomsBySlug {
    tracing::debug!(base_dir = %layout.rom_root.display(), "Starting ROM scan");

    let mut result = LocalRomsBySlug::new();
    for slug in layout.slugs() {
        let roms = scan_platform_roms(layout, slug);
        if !roms.is_empty() {
            tracing::debug!(slug, count = roms.len(), "Found ROMs for platform");
            result.insert(slug.to_string(), roms);
        }
    }

    let total: usize = result.values().map(Vec::len).sum();
    tracing::info!(platforms = result.len(), total_roms = total, "Completed ROM scan");
    result
}

/// Scan one platform's ROM directory and pair each ROM with its local save.
pub fn scan_platform_roms(layout: &DeviceLayout, slug: &str) -> Vec<LocalRom> {
    let rom_dir = layout.rom_directory(slug);
    if !rom_dir.is_dir() {
        tracing::debug!(slug, path = %rom_dir.display(), "ROM directory does not exist");
        return Vec::new();
    }

    let mut saves_by_stem: HashMap<String, LocalSave> = HashMap::new();
    for save in find_save_files(layout, slug) {
        saves_by_stem.entry(save.stem()).or_insert(save);
    }

    scan_rom_directory(slug, &rom_dir, &saves_by_stem)
}

fn scan_rom_directory(
    slug: &str,
    rom_dir: &Path,
    saves_by_stem: &HashMap<String, LocalSave>,
) -> Vec<LocalRom> {
    let entries = match fs::read_dir(rom_dir) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!(path = %rom_dir.display(), error = %error, "Failed to read ROM directory");
            return Vec::new();
        }
    };

    let mut roms = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&file_name) || should_skip_file(&file_name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(file = %file_name, error = %error, "Failed to get file info");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let path = entry.path();
        let hash = rom_hash(&path);
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        roms.push(LocalRom {
            slug: slug.to_string(),
            save: saves_by_stem.get(&file_stem(&file_name)).cloned(),
            path,
            file_name,
            hash,
            last_modified,
            remote: None,
            remote_saves: Vec::new(),
        });
    }

    roms.sort_by(|left, right| left.file_name.cmp(&right.file_name));
    roms
}

/// Content hash of a ROM, or an empty string when the file cannot be read.
///
/// The ROM stays in the scan either way; an empty hash never matches the
/// catalog.
fn rom_hash(path: &Path) -> String {
    hash_file(path).unwrap_or_else(|error| {
        tracing::warn!(path = %path.display(), error = %error, "Failed to calculate SHA1 for ROM");
        String::new()
    })
}

/// Sidecar files that live beside ROMs but are never ROMs themselves.
pub fn should_skip_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SKIP_NAMES.contains(&lower.as_str()) || SKIP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{Firmware, PlatformMapping};

    fn layout(root: &Path) -> DeviceLayout {
        DeviceLayout::new(Firmware::NextUi, root.join("Roms"), root.join("Saves"))
            .with_platform(
                "gba",
                PlatformMapping {
                    rom_directory: Some("Game Boy Advance (GBA)".to_string()),
                    save_directories: vec!["GBA".to_string()],
                },
            )
            .with_platform(
                "snes",
                PlatformMapping {
                    rom_directory: None,
                    save_directories: vec!["SFC".to_string()],
                },
            )
    }

    #[test]
    fn should_skip_file_filters_sidecars() {
        for name in ["cover.PNG", "list.m3u", "Thumbs.db", "game.srm", "notes.txt", ".DS_Store"] {
            assert!(should_skip_file(name), "{name}");
        }
        for name in ["Pokemon.gba", "Zelda.sfc", "Game.zip", "Disc.chd"] {
            assert!(!should_skip_file(name), "{name}");
        }
    }

    #[test]
    fn scan_hashes_roms_and_pairs_saves_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let rom_dir = layout.rom_directory("gba");
        let save_dir = dir.path().join("Saves").join("GBA");
        fs::create_dir_all(&rom_dir).unwrap();
        fs::create_dir_all(&save_dir).unwrap();
        fs::create_dir_all(rom_dir.join("Imgs")).unwrap();
        fs::write(rom_dir.join("Pokemon (USA).gba"), b"abc").unwrap();
        fs::write(rom_dir.join("Tetris.gba"), b"tetris").unwrap();
        fs::write(rom_dir.join("Pokemon (USA).png"), b"art").unwrap();
        fs::write(save_dir.join("Pokemon (USA).sav"), b"save").unwrap();

        let scanned = scan_all_roms(&layout);

        assert_eq!(scanned.keys().collect::<Vec<_>>(), vec!["gba"]);
        let roms = &scanned["gba"];
        assert_eq!(roms.len(), 2);
        assert_eq!(roms[0].file_name, "Pokemon (USA).gba");
        assert_eq!(roms[0].hash, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            roms[0].save.as_ref().map(LocalSave::file_name),
            Some("Pokemon (USA).sav".to_string())
        );
        assert_eq!(roms[1].file_name, "Tetris.gba");
        assert!(roms[1].save.is_none());
    }

    #[test]
    fn unreadable_rom_hashes_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pokemon.gba");
        assert_eq!(rom_hash(&path), "");

        fs::write(&path, b"abc").unwrap();
        assert_eq!(rom_hash(&path), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn missing_platform_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_platform_roms(&layout(dir.path()), "snes").is_empty());
        assert!(scan_all_roms(&layout(dir.path())).is_empty());
    }
}
