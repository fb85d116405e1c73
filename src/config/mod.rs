//! Configuration management for xarchive.
//!
//! Configuration is read from `~/.config/xarchive/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod colors;
pub mod crawler;
pub mod keybindings;

pub use colors::ColorConfig;
pub use crawler::{AuthConfig, CrawlerConfig};
pub use keybindings::{KeyBindings, KeybindingConfig};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub auth: AuthConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location is created with commented
    /// defaults. Missing fields fall back to default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(ConfigError::Io {
                    path: config_path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Self::create_default_config(&config_path)?;
            tracing::info!(path = %config_path.display(), "Created default config");
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/xarchive/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("xarchive").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::default_config_content()).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# xarchive configuration

[crawler]
# GraphQL UserTweets endpoint
endpoint = "https://x.com/i/api/graphql/-V26I6Pb5xDZ3C7BWwCQ_Q/UserTweets"

# Numeric id of the account to archive
user_id = ""

# Posts per page request
page_size = 20

# Stop after this many posts
max_posts = 2000

# Pause between page requests (milliseconds)
delay_ms = 1000

# Request timeout (seconds)
timeout_secs = 30

# Data directory for pages, entries.json, posts.json and the database.
# Defaults to the platform data directory.
# data_dir = "/path/to/archive"

[auth]
# Copy these from the request headers of a logged-in browser session.
authorization = ""
cookie = ""
csrf_token = ""
client_language = "en"
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)"

[colors]
# Named colors (Cyan, DarkGray, LightBlue, ...) or hex ("#RRGGBB", "#RGB")
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
author = "LightBlue"
timestamp = "Yellow"
counters = "Gray"
link = "Blue"
quote_border = "DarkGray"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
# Single characters ("j"), special keys ("PageDown", "Enter", "Home"),
# or modifiers ("Ctrl+c", "Shift+Tab")
quit = ["q", "Ctrl+c"]
move_up = ["k", "Up"]
move_down = ["j", "Down"]
next_page = ["n", "PageDown"]
prev_page = ["p", "PageUp"]
jump_top = ["g", "Home"]
jump_bottom = ["G", "End"]
next_pane = ["Tab"]
prev_pane = ["BackTab", "Shift+Tab"]
open_post = ["o", "Enter"]
open_like = ["l"]
open_reply = ["r"]
toggle_maximize = ["m"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
