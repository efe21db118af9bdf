//! File helpers shared by the scanners and the sync executor.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Copy `source` to `destination`, creating parent directories as needed.
///
/// This is a plain copy; the source is never moved or truncated.
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        "Copied file"
    );
    Ok(())
}

/// Last-modified time of a file in UTC.
pub fn modified_time(path: &Path) -> io::Result<DateTime<Utc>> {
    fs::metadata(path)?.modified().map(DateTime::<Utc>::from)
}

/// Set both access and modification time of `path` to `time`.
pub fn set_modified_time(path: &Path, time: DateTime<Utc>) -> Result<()> {
    let system_time = SystemTime::from(time);
    let times = fs::FileTimes::new()
        .set_accessed(system_time)
        .set_modified(system_time);
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_times(times))
        .map_err(|source| Error::Timestamp {
            path: path.display().to_string(),
            source,
        })
}

/// Remove a file, logging instead of failing when it is already gone.
pub fn remove_file_quietly(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed file");
            true
        }
        Err(error) => {
            tracing::error!(path = %path.display(), error = %error, "Issue removing file");
            false
        }
    }
}
