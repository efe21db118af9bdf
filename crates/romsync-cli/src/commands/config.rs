use std::env;
use std::path::{Path, PathBuf};

use romsync_core::config::{HostConfig, PlatformMapping};
use romsync_core::util::normalize_text_option;

use crate::cli::{ConfigCommands, FirmwareArg};
use crate::config_file::{resolve_config_path, AppConfig, PASSWORD_ENV};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = resolve_config_path(config_path).map_err(CliError::Config)?;
    match command {
        ConfigCommands::Init {
            url,
            port,
            username,
            password,
            rom_root,
            save_root,
            firmware,
        } => run_config_init(
            &path,
            HostInput {
                url,
                port,
                username,
                password,
            },
            rom_root,
            save_root,
            firmware,
        ),
        ConfigCommands::Show => run_config_show(&path),
        ConfigCommands::Map {
            slug,
            rom_directory,
            save_directories,
        } => run_config_map(&path, &slug, rom_directory, save_directories),
    }
}

pub struct HostInput {
    pub url: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: Option<String>,
}

pub fn run_config_init(
    path: &Path,
    input: HostInput,
    rom_root: Option<PathBuf>,
    save_root: Option<PathBuf>,
    firmware: Option<FirmwareArg>,
) -> Result<(), CliError> {
    let mut config = AppConfig::load_from_path(path).map_err(CliError::Config)?;
    let existing = config.host.clone().unwrap_or_default();

    let password = normalize_text_option(input.password)
        .or_else(|| normalize_text_option(env::var(PASSWORD_ENV).ok()))
        .unwrap_or(existing.password);
    let host = HostConfig {
        display_name: existing.display_name,
        root_uri: input.url.trim().to_string(),
        port: input.port.unwrap_or(existing.port),
        username: input.username.trim().to_string(),
        password,
    };
    host.validate()?;
    config.host = Some(host);

    if let Some(rom_root) = rom_root {
        config.layout.rom_root = rom_root;
    }
    if let Some(save_root) = save_root {
        config.layout.save_root = save_root;
    }
    if let Some(firmware) = firmware {
        config.layout.firmware = firmware.into();
    }

    config.save_to_path(path).map_err(CliError::Config)?;
    println!("Config saved to {}", path.display());

    let mut missing_fields = Vec::new();
    if config.layout.rom_root.as_os_str().is_empty() {
        missing_fields.push("rom_root");
    }
    if config.layout.save_root.as_os_str().is_empty() {
        missing_fields.push("save_root");
    }
    if config.layout.platforms.is_empty() {
        missing_fields.push("platform mappings");
    }
    if !missing_fields.is_empty() {
        println!("Config is missing: {}", missing_fields.join(", "));
    }
    Ok(())
}

pub fn run_config_show(path: &Path) -> Result<(), CliError> {
    let config = AppConfig::load_from_path(path).map_err(CliError::Config)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}

pub fn run_config_map(
    path: &Path,
    slug: &str,
    rom_directory: Option<String>,
    save_directories: Vec<String>,
) -> Result<(), CliError> {
    let slug = normalize_text_option(Some(slug.to_string()))
        .ok_or_else(|| CliError::Config("platform slug must not be empty".to_string()))?;

    let mut config = AppConfig::load_from_path(path).map_err(CliError::Config)?;
    config.set_platform(
        &slug,
        PlatformMapping {
            rom_directory,
            save_directories,
        },
    );
    config.save_to_path(path).map_err(CliError::Config)?;

    let saved = AppConfig::load_from_path(path).map_err(CliError::Config)?;
    println!(
        "Mapped {slug}: roms in {}, saves in [{}]",
        saved.layout.rom_directory(&slug).display(),
        saved.layout.save_directory_names(&slug).join(", ")
    );
    Ok(())
}
