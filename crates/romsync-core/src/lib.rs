//! romsync-core - Core library for romsync
//!
//! This crate contains the models, local scanners, catalog matcher, sync
//! decision engine, transfer executor and background orchestrator used to
//! keep emulator save files in sync with a RomM catalog server.

pub mod config;
pub mod error;
pub mod files;
pub mod models;
pub mod remote;
pub mod scan;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{LocalRom, LocalSave, RemoteSave, SyncAction, SyncIssue, SyncItem};
pub use remote::RemoteCatalog;
pub use services::AutoSync;
