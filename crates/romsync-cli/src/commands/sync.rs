use std::path::Path;

use romsync_core::services::SyncSummary;
use romsync_core::state::SyncStatus;
use romsync_core::{AutoSync, SyncIssue};
use serde::Serialize;

use crate::commands::common::{
    build_catalog, format_issue_lines, format_summary, load_config, require_layout,
};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SyncReport {
    status: SyncStatus,
    summary: SyncSummary,
    issues: Vec<SyncIssue>,
}

pub async fn run_sync(as_json: bool, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let layout = require_layout(&config)?.clone();
    let catalog = build_catalog(&config)?;

    // Nothing renders the indicator here, so transfers are not paced.
    let auto_sync = AutoSync::new(catalog, layout, config.settings.without_indicator_delay());
    auto_sync.start();
    auto_sync.wait().await;

    let report = SyncReport {
        status: auto_sync.status(),
        summary: auto_sync.last_summary(),
        issues: auto_sync.issues(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Status: {}", report.status);
        println!("{}", format_summary(&report.summary));
        for line in format_issue_lines(&report.issues) {
            println!("{line}");
        }
    }

    if let Some(error) = report.summary.cycle_error {
        return Err(CliError::CycleFailed(error));
    }
    if !report.issues.is_empty() {
        return Err(CliError::IssuesRemaining(report.issues.len()));
    }
    Ok(())
}
