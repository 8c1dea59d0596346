//! Logger configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/eventlog/logger.toml`
//! - Windows: `%APPDATA%/eventlog/logger.toml`

use std::path::{Path, PathBuf};

use eventlog_codec::TimeFormat;
use eventlog_error_tap::TapOptions;
use eventlog_store::{
    DirectorySaver, EventLogger, FileStore, KeyValueStore, StdioConsole, UnavailableStore,
};
use serde::{Deserialize, Serialize};

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding persisted events.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Directory receiving exported logs.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Print to stderr when stdout is unavailable instead of dropping output.
    #[serde(default = "default_true")]
    pub alert_fallback: bool,

    #[serde(default)]
    pub time_format: TimeFormat,

    /// Destination code used when none is given (0 console, 1 store, 2 both).
    #[serde(default = "default_destination")]
    pub default_destination: u8,

    /// Record uncaught panics as events and export the log.
    #[serde(default)]
    pub export_on_error: bool,

    /// Skip the default panic report after recording.
    #[serde(default)]
    pub suppress_error_alerts: bool,

    /// Shift colliding keys forward instead of overwriting.
    #[serde(default)]
    pub avoid_collisions: bool,
}

fn default_store_path() -> PathBuf {
    data_base_dir().join("eventlog").join("events.json")
}

fn default_export_dir() -> PathBuf {
    home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn default_true() -> bool {
    true
}

fn default_destination() -> u8 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            export_dir: default_export_dir(),
            alert_fallback: default_true(),
            time_format: TimeFormat::default(),
            default_destination: default_destination(),
            export_on_error: false,
            suppress_error_alerts: false,
            avoid_collisions: false,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the platform default location.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Builds a logger over the configured file store and export directory.
    ///
    /// A store file that cannot be opened leaves the logger console-only:
    /// appends degrade and reads report the store as unavailable.
    pub fn build_logger(&self) -> EventLogger {
        match FileStore::open(&self.store_path) {
            Ok(store) => self.logger_over(store),
            Err(err) => {
                tracing::warn!(
                    path = %self.store_path.display(),
                    error = %err,
                    "event store unavailable, logging to console only"
                );
                self.logger_over(UnavailableStore::new(err.to_string()))
            }
        }
    }

    fn logger_over(&self, store: impl KeyValueStore + 'static) -> EventLogger {
        EventLogger::new(
            store,
            StdioConsole::new(self.alert_fallback),
            DirectorySaver::new(&self.export_dir),
        )
        .with_time_format(self.time_format)
        .with_avoid_collisions(self.avoid_collisions)
    }

    pub fn tap_options(&self) -> TapOptions {
        TapOptions {
            export_on_error: self.export_on_error,
            suppress_error_alerts: self.suppress_error_alerts,
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("eventlog").join("logger.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        Ok(home.join(".config").join("eventlog").join("logger.toml"))
    }
}

fn data_base_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default\\AppData\\Local"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        home_dir()
            .map(|home| home.join(".local").join("share"))
            .unwrap_or_else(|| PathBuf::from("/tmp"))
    }
}
