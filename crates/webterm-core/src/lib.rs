#![forbid(unsafe_code)]

//! Core of the webterm client: the session controller and everything it needs
//! that does not touch a platform.
//!
//! # Role
//! `webterm-core` owns the connection state machine, theme resolution, the
//! shell metadata payload and output normalization. Platform code lives in the
//! hosts: `webterm-web` (browser, xterm.js + WebSocket + localStorage) and
//! `webterm-cli` (native terminal, tungstenite + config file).
//!
//! # Flow
//! A host builds a [`SessionController`] around its [`SessionHost`], fetches
//! the shell metadata, and feeds every callback into
//! [`SessionController::dispatch`] as a [`SessionEvent`], one at a time.

pub mod endpoint;
pub mod error;
pub mod event;
pub mod host;
pub mod output;
pub mod session;
pub mod shell_info;
pub mod state;
pub mod theme;

pub use endpoint::ServerOrigin;
pub use error::{Result, WebTermError};
pub use event::{Generation, SessionEvent, WindowAction};
pub use host::{PreferenceStore, SessionChrome, SessionHost, TerminalDisplay, Transport};
pub use output::normalize_newlines;
pub use session::{Dispatch, INTERRUPT_BYTE, SessionConfig, SessionController};
pub use shell_info::ShellInfo;
pub use state::{ConnectionState, SessionStats, WindowMode};
pub use theme::{Rgb, THEME_STORAGE_KEY, ThemeId, ThemePalette};
