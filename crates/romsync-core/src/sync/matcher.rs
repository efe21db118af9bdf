//! Catalog matcher.
//!
//! Joins local ROMs to catalog entries by content hash. File names never take
//! part in the join, so renamed or duplicated ROM files still resolve to the
//! same catalog entry.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{LocalRom, RemotePlatform, RemoteRom};
use crate::remote::{RemoteCatalog, SavesByRom};
use crate::scan::LocalRomsBySlug;
use crate::Result;

/// Counts from one matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub matched: usize,
    pub unmatched: usize,
    /// Local slugs with no usable catalog platform this pass
    pub skipped_platforms: Vec<String>,
}

/// Resolve every local ROM against the catalog in place.
///
/// Only a failure to list platforms is returned as an error. A slug the
/// catalog does not know, or whose ROM or save listing fails, is logged and
/// skipped; its ROMs stay unresolved for this pass.
pub async fn match_catalog(
    catalog: &dyn RemoteCatalog,
    roms: &mut LocalRomsBySlug,
) -> Result<MatchReport> {
    let platforms = catalog.list_platforms().await?;
    let platforms_by_slug: HashMap<&str, &RemotePlatform> = platforms
        .iter()
        .map(|platform| (platform.slug.as_str(), platform))
        .collect();

    let mut report = MatchReport::default();
    for (slug, local_roms) in roms.iter_mut() {
        let Some(platform) = platforms_by_slug.get(slug.as_str()) else {
            tracing::warn!(slug = %slug, "Platform not found in remote catalog, skipping");
            report.skipped_platforms.push(slug.clone());
            report.unmatched += local_roms.len();
            continue;
        };

        let (remote_roms, saves) = match fetch_platform(catalog, platform.id).await {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!(
                    slug = %slug,
                    platform_id = platform.id,
                    error = %error,
                    "Failed to load platform catalog, skipping"
                );
                report.skipped_platforms.push(slug.clone());
                report.unmatched += local_roms.len();
                continue;
            }
        };

        let matched = attach_remote(local_roms, &remote_roms, &saves);
        tracing::debug!(
            slug = %slug,
            matched,
            total = local_roms.len(),
            "Matched platform ROMs"
        );
        report.matched += matched;
        report.unmatched += local_roms.len() - matched;
    }

    tracing::info!(
        matched = report.matched,
        unmatched = report.unmatched,
        skipped_platforms = report.skipped_platforms.len(),
        "Completed catalog match"
    );
    Ok(report)
}

async fn fetch_platform(
    catalog: &dyn RemoteCatalog,
    platform_id: i64,
) -> Result<(Vec<RemoteRom>, SavesByRom)> {
    let saves = catalog.list_saves_by_platform(platform_id).await?;
    let remote_roms = catalog.list_roms(platform_id).await?;
    Ok((remote_roms, saves))
}

/// Attach catalog identity and save history to each ROM whose hash matches.
/// Returns how many matched.
fn attach_remote(
    local_roms: &mut [LocalRom],
    remote_roms: &[RemoteRom],
    saves: &SavesByRom,
) -> usize {
    let mut matched = 0;
    for rom in local_roms.iter_mut() {
        rom.remote = None;
        rom.remote_saves.clear();

        let Some(remote) = remote_roms.iter().find(|remote| remote.matches_hash(&rom.hash)) else {
            tracing::debug!(file = %rom.file_name, "No catalog entry for ROM hash");
            continue;
        };
        rom.remote = Some(remote.to_ref());
        rom.remote_saves = saves.get(&remote.id).cloned().unwrap_or_default();
        matched += 1;
    }
    matched
}
