//! Configuration file parser for ~/.config/feedpane/config.toml.
//!
//! The config file is required: a missing file is a startup error, because
//! the Feedly credentials and the pane geometry live there. Unknown keys are
//! accepted by serde, though we log a warning when the file contains
//! potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("No Feedly access token: set FEEDLY_ACCESS_TOKEN or [feedly].access_token")]
    MissingToken,

    #[error("Cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set")]
    NoConfigDir,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Category pane width in columns. 0 selects the default.
    pub ctg_win_width: u16,

    /// Preview pane height in rows. 0 means use `view_win_height_per`.
    pub view_win_height: u16,

    /// Preview pane share of the rows above the two status rows, in percent.
    pub view_win_height_per: u16,

    /// Start in ranked order instead of newest-first.
    pub rank: bool,

    /// Dwell threshold for automatic mark-as-read. Negative disables it.
    pub seconds_to_mark_as_read: i64,

    /// Full-screen viewer used by `o`. `$BROWSER` overrides this.
    pub text_browser: String,

    /// Inline renderer producing the preview text from the scratch file.
    pub preview_renderer: String,

    /// Full-screen viewer used for Enter on a post.
    pub plain_text_viewer: String,

    /// The inline renderer is killed after this many seconds.
    pub render_timeout_secs: u64,

    pub colors: ColorsConfig,

    pub feedly: FeedlyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ctg_win_width: DEFAULT_CTG_WIN_WIDTH,
            view_win_height: 0,
            view_win_height_per: 50,
            rank: false,
            seconds_to_mark_as_read: 3,
            text_browser: "w3m".to_string(),
            preview_renderer: "w3m -dump -T text/html -cols {cols} {file}".to_string(),
            plain_text_viewer: "w3m -T text/html {file}".to_string(),
            render_timeout_secs: 10,
            colors: ColorsConfig::default(),
            feedly: FeedlyConfig::default(),
        }
    }
}

pub const DEFAULT_CTG_WIN_WIDTH: u16 = 40;

/// Terminal palette indices per UI role. `-1` is the terminal default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub background: i16,
    pub active_panel: i16,
    pub idle_panel: i16,
    pub counter: i16,
    pub status_line: i16,
    pub instructions_line: i16,
    pub item_text: i16,
    pub item_highlight: i16,
    pub read_item: i16,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: -1,
            active_panel: 6,
            idle_panel: 8,
            counter: 3,
            status_line: 7,
            instructions_line: 8,
            item_text: 7,
            item_highlight: 6,
            read_item: 8,
        }
    }
}

/// Feedly connection settings.
///
/// Custom Debug impl masks `access_token` to prevent secret leakage in logs,
/// error messages, and debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct FeedlyConfig {
    pub base_url: String,

    /// Alternative to the FEEDLY_ACCESS_TOKEN env var.
    /// Env var takes precedence over config file.
    pub access_token: Option<String>,

    /// Maximum entries requested per stream listing.
    pub stream_count: u32,
}

impl Default for FeedlyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cloud.feedly.com".to_string(),
            access_token: None,
            stream_count: 500,
        }
    }
}

impl std::fmt::Debug for FeedlyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedlyConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("stream_count", &self.stream_count)
            .finish()
    }
}

impl FeedlyConfig {
    /// Resolve the token, preferring `env` (the FEEDLY_ACCESS_TOKEN value).
    pub fn token(&self, env: Option<String>) -> Result<SecretString, ConfigError> {
        env.filter(|t| !t.trim().is_empty())
            .or_else(|| self.access_token.clone())
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::MissingToken)
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 11] = [
        "ctg_win_width",
        "view_win_height",
        "view_win_height_per",
        "rank",
        "seconds_to_mark_as_read",
        "text_browser",
        "preview_renderer",
        "plain_text_viewer",
        "render_timeout_secs",
        "colors",
        "feedly",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Err(ConfigError::NotFound)`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            rank = config.rank,
            dwell_secs = config.seconds_to_mark_as_read,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Text browser for `o`, with `browser_env` (the BROWSER value) taking
    /// precedence when non-empty.
    pub fn text_browser(&self, browser_env: Option<String>) -> String {
        browser_env
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.text_browser.clone())
    }

    /// Category pane width, with 0 meaning the default.
    pub fn category_width(&self) -> u16 {
        if self.ctg_win_width == 0 {
            DEFAULT_CTG_WIN_WIDTH
        } else {
            self.ctg_win_width
        }
    }
}

/// Default config location: `$XDG_CONFIG_HOME/feedpane/config.toml`, else
/// `$HOME/.config/feedpane/config.toml`.
pub fn default_config_path(
    xdg_config_home: Option<String>,
    home: Option<String>,
) -> Result<PathBuf, ConfigError> {
    let base = match (xdg_config_home.filter(|v| !v.is_empty()), home) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => PathBuf::from(home).join(".config"),
        (None, None) => return Err(ConfigError::NoConfigDir),
    };
    Ok(base.join("feedpane").join("config.toml"))
}

// ============================================================================
// Tests
// ============================================================================
