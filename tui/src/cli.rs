//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use room_core::ConfigOverrides;

/// Telehealth consultation room in the terminal
#[derive(Parser, Debug)]
#[command(name = "room-tui")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Room URL or path (`/room/<name>` or `/room/<name>/doctor`)
    #[arg(short = 'r', long, env = "TELEHEALTH_ROOM_URL", value_name = "URL")]
    pub room_url: String,

    /// Configuration file (default: $XDG_CONFIG_HOME/telehealth-room/room.toml)
    #[arg(short = 'c', long, env = "TELEHEALTH_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API base URL (overrides config and TELEHEALTH_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Access token file
    #[arg(long, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    /// Overlay enter transition in milliseconds (0 disables it)
    #[arg(long, value_name = "MS")]
    pub enter_transition_ms: Option<u64>,

    /// Log file (default: $XDG_DATA_HOME/telehealth-room/room-tui.log)
    #[arg(short = 'l', long, env = "TELEHEALTH_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(url) = &self.base_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if let Some(path) = &self.token_file {
            overrides = overrides.with_token_file(path.clone());
        }
        if let Some(ms) = self.enter_transition_ms {
            overrides = overrides.with_enter_transition_ms(ms);
        }
        overrides
    }
}
