use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use clap::Parser;
use pretty_assertions::assert_eq;
use romsync_core::config::{DeviceLayout, Firmware, PlatformMapping};
use romsync_core::models::LocalSave;
use romsync_core::scan::scan_all_roms;
use romsync_core::services::SyncSummary;
use romsync_core::{SyncAction, SyncIssue, SyncItem};

use crate::cli::{Cli, Commands, CompletionShell, ConfigCommands, FirmwareArg};
use crate::commands::common::{
    format_issue_lines, format_plan_lines, format_rom_lines, format_summary, format_timestamp,
    plan_item, require_host, require_layout,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::commands::config::{run_config_init, run_config_map, HostInput};
use crate::config_file::AppConfig;
use crate::default_log_directive;
use crate::error::CliError;

fn item(action: SyncAction, slug: &str, local: Option<LocalSave>) -> SyncItem {
    SyncItem {
        rom_id: 42,
        rom_name: "Pokemon Emerald".to_string(),
        slug: slug.to_string(),
        game_base: "Pokemon".to_string(),
        local,
        remote: None,
        action,
        selected_emulator: None,
    }
}

fn host_input(url: &str) -> HostInput {
    HostInput {
        url: url.to_string(),
        port: Some(8080),
        username: "player".to_string(),
        password: Some("secret".to_string()),
    }
}

#[test]
fn verbose_raises_log_level() {
    assert_eq!(default_log_directive(false), "romsync=info");
    assert_eq!(default_log_directive(true), "romsync=debug");
}

#[test]
fn cli_parses_repeated_save_directories() {
    let cli = Cli::try_parse_from([
        "romsync",
        "config",
        "map",
        "gba",
        "--rom-directory",
        "GBA",
        "--save-directory",
        "mGBA",
        "--save-directory",
        "gpSP",
    ])
    .unwrap();

    let Commands::Config {
        command:
            ConfigCommands::Map {
                slug,
                rom_directory,
                save_directories,
            },
    } = cli.command
    else {
        panic!("expected config map");
    };
    assert_eq!(slug, "gba");
    assert_eq!(rom_directory.as_deref(), Some("GBA"));
    assert_eq!(save_directories, vec!["mGBA".to_string(), "gpSP".to_string()]);
}

#[test]
fn cli_accepts_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["romsync", "sync", "--json", "--verbose", "--config", "/tmp/c.json"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/c.json")));
    assert!(matches!(cli.command, Commands::Sync { json: true }));
}

#[test]
fn config_init_then_map_persists_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    run_config_init(
        &path,
        host_input("http://romm.local/"),
        Some(dir.path().join("Roms")),
        Some(dir.path().join("Saves")),
        Some(FirmwareArg::Nextui),
    )
    .unwrap();
    run_config_map(&path, " gba ", Some("Game Boy Advance (GBA)".to_string()), vec!["GBA".to_string()]).unwrap();

    let config = AppConfig::load_from_path(&path).unwrap();
    let host = require_host(&config).unwrap();
    assert_eq!(host.url(), "http://romm.local:8080");
    assert_eq!(host.password, "secret");
    assert_eq!(config.layout.firmware, Firmware::NextUi);
    assert_eq!(
        config.layout.rom_directory("gba"),
        dir.path().join("Roms").join("Game Boy Advance (GBA)")
    );
    assert!(require_layout(&config).is_ok());
}

#[test]
fn config_init_rejects_url_without_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let result = run_config_init(&path, host_input("romm.local"), None, None, None);

    assert!(matches!(result, Err(CliError::Core(_))));
    assert!(!path.exists());
}

#[test]
fn missing_host_is_not_configured() {
    assert!(matches!(
        require_host(&AppConfig::default()),
        Err(CliError::NotConfigured)
    ));
}

#[test]
fn layout_without_platforms_is_rejected() {
    let config = AppConfig {
        layout: DeviceLayout::new(Firmware::MuOs, "/roms", "/saves"),
        ..Default::default()
    };
    assert!(matches!(require_layout(&config), Err(CliError::Config(_))));
}

#[test]
fn rom_lines_show_hash_prefix_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DeviceLayout::new(Firmware::NextUi, dir.path().join("Roms"), dir.path().join("Saves"))
        .with_platform(
            "gba",
            PlatformMapping {
                rom_directory: None,
                save_directories: vec!["GBA".to_string()],
            },
        );
    fs::create_dir_all(dir.path().join("Roms/gba")).unwrap();
    fs::create_dir_all(dir.path().join("Saves/GBA")).unwrap();
    fs::write(dir.path().join("Roms/gba/Pokemon.gba"), b"abc").unwrap();
    fs::write(dir.path().join("Roms/gba/Tetris.gba"), b"tetris").unwrap();
    fs::write(dir.path().join("Saves/GBA/Pokemon.sav"), b"save").unwrap();

    let lines = format_rom_lines(&scan_all_roms(&layout));

    assert_eq!(lines[0], "gba (2 ROMs)");
    assert!(lines[1].starts_with("  Pokemon.gba  a9993e364706  Pokemon.sav @ "));
    assert!(lines[2].ends_with("no save"));
}

#[test]
fn plan_lines_flag_ambiguous_downloads() {
    let layout = DeviceLayout::new(Firmware::MuOs, "/roms", "/saves").with_platform(
        "gba",
        PlatformMapping {
            rom_directory: None,
            save_directories: vec!["mGBA".to_string(), "gpSP".to_string()],
        },
    );
    let modified = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
    let items = [
        plan_item(&item(SyncAction::Download, "gba", None), &layout),
        plan_item(
            &item(
                SyncAction::Upload,
                "gba",
                Some(LocalSave::new("gba", "/saves/mGBA/Pokemon.sav", modified)),
            ),
            &layout,
        ),
    ];

    let lines = format_plan_lines(&items);

    assert!(items[0].needs_emulator);
    assert!(lines[0].starts_with("DOWNLOAD"));
    assert!(lines[0].ends_with("Pokemon Emerald (select emulator)"));
    assert!(!items[1].needs_emulator);
    assert_eq!(items[1].local_save.as_deref(), Some("/saves/mGBA/Pokemon.sav"));
}

#[test]
fn issue_lines_include_status_and_error() {
    let issues = vec![
        SyncIssue::needs_emulator(item(SyncAction::Download, "gba", None)),
        SyncIssue::failed(item(SyncAction::Upload, "snes", None), "timeout"),
    ];

    let lines = format_issue_lines(&issues);

    assert!(lines[0].ends_with("Pokemon Emerald [Select emulator]"));
    assert!(lines[1].ends_with("Pokemon Emerald [Failed]: timeout"));
}

#[test]
fn summary_line_lists_counts() {
    let summary = SyncSummary {
        uploaded: 2,
        downloaded: 1,
        needs_emulator: 1,
        failed: 0,
        cycle_error: None,
    };
    assert_eq!(
        format_summary(&summary),
        "Uploaded 2, downloaded 1, 1 awaiting emulator choice, 0 failed"
    );
}

#[test]
fn format_timestamp_returns_utc_label() {
    let time = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
    assert_eq!(format_timestamp(time), "2024-03-01 10:30:00 UTC");
}

#[test]
fn completions_target_binary_name() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("romsync"), "{shell:?}");
    }
}

#[test]
fn completions_write_to_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("romsync.fish");

    run_completions(CompletionShell::Fish, Some(&path)).unwrap();

    assert_eq!(fs::read(&path).unwrap(), render_completions(CompletionShell::Fish));
}
