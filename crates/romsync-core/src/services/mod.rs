//! Long-lived services shared with foreground callers.

mod auto_sync;

pub use auto_sync::{AutoSync, SyncSummary};
