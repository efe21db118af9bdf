use std::path::Path;

use romsync_core::sync::find_save_syncs;

use crate::commands::common::{
    build_catalog, format_plan_lines, load_config, plan_item, require_layout, PlanItem,
};
use crate::error::CliError;

pub async fn run_plan(as_json: bool, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let layout = require_layout(&config)?;
    let catalog = build_catalog(&config)?;

    let plan = find_save_syncs(catalog.as_ref(), layout).await?;
    let items = plan
        .items
        .iter()
        .map(|item| plan_item(item, layout))
        .collect::<Vec<PlanItem>>();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!(
            "Everything is in sync ({} matched, {} unmatched ROMs)",
            plan.report.matched, plan.report.unmatched
        );
        return Ok(());
    }

    for line in format_plan_lines(&items) {
        println!("{line}");
    }
    Ok(())
}
