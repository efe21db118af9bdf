//! Local and remote save models

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::files::copy_file;
use crate::util::{dotted_extension, file_stem};
use crate::Result;

/// Layout of timestamps embedded in save file names and backup names.
///
/// Colons are not filesystem-safe on every target, so the time part uses
/// dashes: `2024-03-01 10-30-00-000`.
pub const SAVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S-%3f";

const BACKUP_DIR_NAME: &str = ".backup";

/// A save file found on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSave {
    /// Remote platform slug the save directory belongs to
    pub slug: String,
    /// Absolute path of the save file
    pub path: PathBuf,
    /// Modification time when the save was scanned
    pub last_modified: DateTime<Utc>,
}

impl LocalSave {
    pub fn new(slug: impl Into<String>, path: impl Into<PathBuf>, last_modified: DateTime<Utc>) -> Self {
        Self {
            slug: slug.into(),
            path: path.into(),
            last_modified,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension; the key used to pair saves with ROMs.
    pub fn stem(&self) -> String {
        file_stem(&self.file_name())
    }

    /// Extension including the leading dot, e.g. `.srm`.
    pub fn extension(&self) -> String {
        dotted_extension(&self.path)
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Where [`LocalSave::backup`] will copy this save.
    ///
    /// `<dir>/.backup/<stem> [<last-modified>]<ext>`
    pub fn backup_path(&self) -> PathBuf {
        let stamp = format_save_timestamp(self.last_modified);
        let file_name = format!("{} [{}]{}", self.stem(), stamp, self.extension()).replace(':', "-");
        self.directory()
            .unwrap_or_else(|| Path::new("."))
            .join(BACKUP_DIR_NAME)
            .join(file_name)
    }

    /// Copy the save into the `.backup` folder beside it.
    pub fn backup(&self) -> Result<PathBuf> {
        let destination = self.backup_path();
        copy_file(&self.path, &destination)?;
        tracing::debug!(
            save = %self.path.display(),
            backup = %destination.display(),
            "Backed up local save"
        );
        Ok(destination)
    }
}

/// A save file stored on the catalog server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSave {
    pub id: i64,
    pub rom_id: i64,
    pub file_name: String,
    #[serde(default)]
    pub file_extension: String,
    #[serde(default)]
    pub download_path: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub emulator: Option<String>,
}

impl RemoteSave {
    /// Time used to decide freshness.
    ///
    /// Prefers a `[YYYY-MM-DD HH-MM-SS-mmm]` token in the file name and falls
    /// back to the server's `updated_at`.
    pub fn authoritative_time(&self) -> DateTime<Utc> {
        parse_embedded_timestamp(&self.file_name).unwrap_or(self.updated_at)
    }

    /// Declared extension normalized to carry a leading dot.
    pub fn dotted_extension(&self) -> String {
        let extension = self.file_extension.trim();
        if extension.is_empty() {
            dotted_extension(Path::new(&self.file_name))
        } else if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{extension}")
        }
    }
}

/// Format a time the way backup names and remote save names embed it.
pub fn format_save_timestamp(time: DateTime<Utc>) -> String {
    time.format(SAVE_TIMESTAMP_FORMAT).to_string()
}

/// Extract the embedded timestamp from a save file name.
///
/// Bracketed tokens are tried from last to first; the first one matching the
/// layout wins. Tokens containing colons never parse.
pub fn parse_embedded_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    bracket_token_regex()
        .captures_iter(file_name)
        .filter_map(|capture| capture.get(1))
        .map(|token| token.as_str())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .filter(|token| !token.contains(':'))
        .find_map(|token| NaiveDateTime::parse_from_str(token.trim(), SAVE_TIMESTAMP_FORMAT).ok())
        .map(|naive| naive.and_utc())
}

fn bracket_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("Invalid regex"))
}
