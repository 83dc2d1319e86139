//! Subscriber setup for the native client.
//!
//! Logs go to a file when one is given and to stderr otherwise; sessions
//! always pass a file. `RUST_LOG` wins over `--log-level`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|error| CliError::invalid(format!("log level `{level}`: {error}")))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    // A subscriber that is already installed (tests, embedding) is kept.
    let _ = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::LogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    Ok(())
}
