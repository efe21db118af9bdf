use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] romsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No server is configured. Run `romsync config init --url <URL> --username <NAME>` first.")]
    NotConfigured,
    #[error("Sync cycle failed: {0}")]
    CycleFailed(String),
    #[error("{0} sync issue(s) need attention")]
    IssuesRemaining(usize),
}
