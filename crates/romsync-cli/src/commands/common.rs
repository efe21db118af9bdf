use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use romsync_core::config::{DeviceLayout, HostConfig};
use romsync_core::remote::{RemoteCatalog, RommClient};
use romsync_core::scan::LocalRomsBySlug;
use romsync_core::services::SyncSummary;
use romsync_core::sync::requires_emulator_selection;
use romsync_core::{SyncIssue, SyncItem};
use serde::Serialize;

use crate::config_file::{resolve_config_path, AppConfig};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct PlanItem {
    pub rom_id: i64,
    pub name: String,
    pub slug: String,
    pub action: String,
    pub local_save: Option<String>,
    pub remote_save: Option<String>,
    pub needs_emulator: bool,
}

/// Load the config file and apply environment overrides.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig, CliError> {
    let path = resolve_config_path(explicit_path).map_err(CliError::Config)?;
    let mut config = AppConfig::load_from_path(&path).map_err(CliError::Config)?;
    config.apply_env_overrides();
    Ok(config)
}

pub fn require_layout(config: &AppConfig) -> Result<&DeviceLayout, CliError> {
    config.layout.validate()?;
    if config.layout.platforms.is_empty() {
        return Err(CliError::Config(
            "no platforms are mapped. Run `romsync config map <SLUG>` first.".to_string(),
        ));
    }
    Ok(&config.layout)
}

pub fn require_host(config: &AppConfig) -> Result<&HostConfig, CliError> {
    config.host.as_ref().ok_or(CliError::NotConfigured)
}

pub fn build_catalog(config: &AppConfig) -> Result<Arc<dyn RemoteCatalog>, CliError> {
    let host = require_host(config)?;
    let client = RommClient::new(host, &config.settings)?;
    tracing::debug!(url = %client.base_url(), "Using RomM server");
    Ok(Arc::new(client))
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_rom_lines(roms: &LocalRomsBySlug) -> Vec<String> {
    let mut lines = Vec::new();
    for (slug, platform_roms) in roms {
        lines.push(format!("{slug} ({} ROMs)", platform_roms.len()));
        for rom in platform_roms {
            let hash = if rom.hash.is_empty() {
                "unhashed".to_string()
            } else {
                rom.hash.chars().take(12).collect()
            };
            let save = rom.save.as_ref().map_or_else(
                || "no save".to_string(),
                |save| format!("{} @ {}", save.file_name(), format_timestamp(save.last_modified)),
            );
            lines.push(format!("  {}  {hash}  {save}", rom.file_name));
        }
    }
    lines
}

pub fn plan_item(item: &SyncItem, layout: &DeviceLayout) -> PlanItem {
    PlanItem {
        rom_id: item.rom_id,
        name: item.display_name().to_string(),
        slug: item.slug.clone(),
        action: item.action.to_string(),
        local_save: item.local.as_ref().map(|save| save.path.display().to_string()),
        remote_save: item.remote.as_ref().map(|save| save.file_name.clone()),
        needs_emulator: requires_emulator_selection(item, layout),
    }
}

pub fn format_plan_lines(items: &[PlanItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let suffix = if item.needs_emulator {
                " (select emulator)"
            } else {
                ""
            };
            format!("{:<8}  {:<8}  {}{suffix}", item.action, item.slug, item.name)
        })
        .collect()
}

pub fn format_issue_lines(issues: &[SyncIssue]) -> Vec<String> {
    issues
        .iter()
        .map(|issue| {
            let detail = issue
                .error_message
                .as_deref()
                .map(|message| format!(": {message}"))
                .unwrap_or_default();
            format!(
                "{:<8}  {:<8}  {} [{}]{detail}",
                issue.item.action,
                issue.item.slug,
                issue.item.display_name(),
                issue.status_label()
            )
        })
        .collect()
}

pub fn format_summary(summary: &SyncSummary) -> String {
    format!(
        "Uploaded {}, downloaded {}, {} awaiting emulator choice, {} failed",
        summary.uploaded, summary.downloaded, summary.needs_emulator, summary.failed
    )
}
