use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "romsync")]
#[command(about = "Keep emulator saves in sync with a RomM server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List local ROMs with their hashes and saves
    Scan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what a sync would transfer without changing anything
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one sync cycle and report remaining issues
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl From<CompletionShell> for clap_complete::Shell {
    fn from(value: CompletionShell) -> Self {
        match value {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FirmwareArg {
    Muos,
    Nextui,
}

impl From<FirmwareArg> for romsync_core::config::Firmware {
    fn from(value: FirmwareArg) -> Self {
        match value {
            FirmwareArg::Muos => Self::MuOs,
            FirmwareArg::Nextui => Self::NextUi,
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the server and device settings
    Init {
        /// RomM server URL, including http:// or https://
        #[arg(long, value_name = "URL")]
        url: String,
        /// Server port; omitted from the URL when not set
        #[arg(long)]
        port: Option<u16>,
        /// RomM user name
        #[arg(long, value_name = "NAME")]
        username: String,
        /// RomM password (ROMSYNC_PASSWORD also works)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
        /// Root directory holding one sub-directory per platform
        #[arg(long, value_name = "PATH")]
        rom_root: Option<PathBuf>,
        /// Root directory holding emulator save folders
        #[arg(long, value_name = "PATH")]
        save_root: Option<PathBuf>,
        /// Firmware running on the device
        #[arg(long, value_enum)]
        firmware: Option<FirmwareArg>,
    },
    /// Print the current config with the password hidden
    Show,
    /// Map a platform slug to its ROM and save directories
    Map {
        /// Platform slug as the server names it, e.g. gba
        slug: String,
        /// ROM sub-directory; the slug itself when omitted
        #[arg(long, value_name = "DIR")]
        rom_directory: Option<String>,
        /// Save sub-directory, default emulator first; repeatable
        #[arg(long = "save-directory", value_name = "DIR")]
        save_directories: Vec<String>,
    },
}
