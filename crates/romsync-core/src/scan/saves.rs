//! Local save scanner.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::DeviceLayout;
use crate::models::LocalSave;
use crate::util::is_hidden;

/// List save files for a platform across all of its mapped save directories.
///
/// An unmapped slug or a missing directory yields no saves; that is the
/// normal state for a platform nobody has played yet.
pub fn find_save_files(layout: &DeviceLayout, slug: &str) -> Vec<LocalSave> {
    let directories = layout.save_directories(slug);
    if directories.is_empty() {
        tracing::debug!(slug, "No save folder mapping for slug");
        return Vec::new();
    }

    let mut saves = Vec::new();
    for directory in directories {
        if !directory.is_dir() {
            tracing::debug!(path = %directory.display(), "Save directory does not exist");
            continue;
        }
        let found = list_save_directory(slug, &directory);
        tracing::debug!(path = %directory.display(), count = found.len(), "Found save files in directory");
        saves.extend(found);
    }

    tracing::debug!(slug, count = saves.len(), "Found total save files");
    saves
}

fn list_save_directory(slug: &str, directory: &Path) -> Vec<LocalSave> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!(path = %directory.display(), error = %error, "Failed to read save directory");
            return Vec::new();
        }
    };

    let mut saves = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(path = %directory.display(), error = %error, "Failed to read directory entry");
                continue;
            }
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&file_name) {
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
        let last_modified = match metadata.modified() {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(error) => {
                tracing::warn!(file = %file_name, error = %error, "Failed to read modification time");
                continue;
            }
        };

        saves.push(LocalSave::new(slug, entry.path(), last_modified));
    }

    saves.sort_by(|left, right| left.path.cmp(&right.path));
    saves
}
