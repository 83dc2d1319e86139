#![forbid(unsafe_code)]

//! Native terminal client for webterm servers.
//!
//! The binary wires a [`webterm_core::SessionController`] to the local
//! terminal: crossterm for keys and raw mode, tungstenite for the socket,
//! reqwest for the shell metadata and a plain file for the theme preference.

pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod metadata;
pub mod prefs;
pub mod runner;
pub mod terminal;
pub mod transport;

pub use cli::{run, run_from_env};
pub use error::{CliError, Result};
