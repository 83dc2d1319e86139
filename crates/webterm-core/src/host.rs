//! Collaborator traits: the boundary between the session and its platform.
//!
//! The session never touches a socket, a DOM node or a storage API directly.
//! Hosts implement these traits (browser via `webterm-web`, native terminal via
//! `webterm-cli`, recording fakes in tests) and the controller is generic over
//! [`SessionHost`].

use crate::error::Result;
use crate::event::Generation;
use crate::state::{ConnectionState, WindowMode};
use crate::theme::ThemePalette;

/// The embedded terminal widget.
///
/// Rendering, ANSI handling and scrollback live behind this trait.
pub trait TerminalDisplay {
    /// Write output bytes (already line-ending normalized).
    fn write(&mut self, bytes: &[u8]);

    /// Clear screen and scrollback.
    fn clear(&mut self);

    /// Apply background, foreground and cursor colors.
    fn apply_palette(&mut self, palette: &ThemePalette);

    /// Set the window/tab title.
    fn set_title(&mut self, title: &str);

    /// The visible grid changed size.
    fn resize(&mut self, cols: u16, rows: u16);

    /// Give keyboard focus to the display.
    fn focus(&mut self);
}

/// Bidirectional byte stream to the remote shell.
///
/// `open` starts a connection; its outcome arrives later as
/// `TransportOpened`/`TransportError`/`TransportClosed` events tagged with
/// `generation`. An `Err` from `open` means the attempt failed synchronously
/// and no events will follow for that generation.
pub trait Transport {
    fn open(&mut self, url: &str, generation: Generation) -> Result<()>;

    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Close the current connection, if any. Must be idempotent.
    fn close(&mut self);
}

/// Status badge, reconnect dialog and window frame.
pub trait SessionChrome {
    fn show_status(&mut self, state: ConnectionState);

    fn show_reconnect_prompt(&mut self);

    fn hide_reconnect_prompt(&mut self);

    fn set_window_mode(&mut self, mode: WindowMode);
}

/// Persisted user preferences.
pub trait PreferenceStore {
    /// Stored theme name, if any.
    fn load_theme(&self) -> Option<String>;

    fn save_theme(&mut self, name: &str) -> Result<()>;
}

/// Bundle of collaborators the controller is generic over.
pub trait SessionHost {
    type Display: TerminalDisplay;
    type Transport: Transport;
    type Chrome: SessionChrome;
    type Store: PreferenceStore;

    fn display(&mut self) -> &mut Self::Display;

    fn transport(&mut self) -> &mut Self::Transport;

    fn chrome(&mut self) -> &mut Self::Chrome;

    fn store(&mut self) -> &mut Self::Store;
}
