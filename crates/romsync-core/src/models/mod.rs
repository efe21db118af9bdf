//! Data models for romsync

mod catalog;
mod rom;
mod save;
mod sync_item;

pub use catalog::{RemotePlatform, RemoteRom, RemoteRomRef};
pub use rom::LocalRom;
pub use save::{
    format_save_timestamp, parse_embedded_timestamp, LocalSave, RemoteSave, SAVE_TIMESTAMP_FORMAT,
};
pub use sync_item::{SyncAction, SyncIssue, SyncItem};
