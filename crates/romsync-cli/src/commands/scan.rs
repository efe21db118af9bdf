use std::path::Path;

use romsync_core::scan::scan_all_roms;

use crate::commands::common::{format_rom_lines, load_config, require_layout};
use crate::error::CliError;

pub fn run_scan(as_json: bool, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let layout = require_layout(&config)?;
    let roms = scan_all_roms(layout);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&roms)?);
        return Ok(());
    }

    if roms.is_empty() {
        println!("No ROMs found under {}", layout.rom_root.display());
        return Ok(());
    }

    for line in format_rom_lines(&roms) {
        println!("{line}");
    }
    Ok(())
}
