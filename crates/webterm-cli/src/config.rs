//! Resolved client configuration.
//!
//! Command-line arguments (with their `WEBTERM_*` env fallbacks handled by
//! clap) are turned into a [`ClientConfig`] once, up front. Environment lookups
//! for the config directory go through a closure so tests never mutate the
//! process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use webterm_core::ServerOrigin;

use crate::error::{CliError, Result};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";
pub const CONFIG_DIR_ENV: &str = "WEBTERM_CONFIG_DIR";
pub const SERVER_ENV: &str = "WEBTERM_SERVER";
pub const DEFAULT_POLL_MS: u64 = 10;

const APP_DIR: &str = "webterm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub origin: ServerOrigin,
    pub config_dir: PathBuf,
    /// Upper bound on how long the event loop blocks waiting for keys.
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(server: &str, config_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            origin: ServerOrigin::parse(server)?,
            config_dir,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        })
    }

    /// Override the key poll interval; zero is raised to one millisecond.
    #[must_use]
    pub fn with_poll_ms(mut self, ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(ms.max(1));
        self
    }

    /// Path of the persisted theme preference.
    #[must_use]
    pub fn theme_file(&self) -> PathBuf {
        self.config_dir.join("theme")
    }

    /// Session log when no `--log-file` is given.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join("webterm.log")
    }
}

/// Pick the configuration directory.
///
/// Order: explicit path, `$XDG_CONFIG_HOME/webterm`, `$HOME/.config/webterm`.
/// Empty variables are treated as unset.
pub fn resolve_config_dir<F>(explicit: Option<&Path>, lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Some(home) = non_empty("HOME") {
        return Ok(PathBuf::from(home).join(".config").join(APP_DIR));
    }
    Err(CliError::NoConfigDir)
}
