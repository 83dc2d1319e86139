//! Local terminal as the session's display and chrome.
//!
//! Output bytes go straight to the writer; the palette and title use the
//! xterm OSC sequences, so the local emulator does the rendering.

use std::io::{self, Write};

use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
};
use crossterm::{queue, terminal};
use tracing::{debug, warn};
use webterm_core::{ConnectionState, SessionChrome, TerminalDisplay, ThemePalette, WindowMode};

const CLEAR: &[u8] = b"\x1b[2J\x1b[H";
/// OSC 110/111/112 reset foreground, background and cursor colors.
const RESET_COLORS: &[u8] = b"\x1b]110\x07\x1b]111\x07\x1b]112\x07";

/// Writes session output to a byte sink, usually stdout.
#[derive(Debug)]
pub struct StdoutDisplay<W: Write> {
    out: W,
    size: (u16, u16),
}

impl<W: Write> StdoutDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out, size: (0, 0) }
    }

    /// Last size reported through `resize`.
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, bytes: &[u8]) {
        if let Err(error) = self.out.write_all(bytes).and_then(|()| self.out.flush()) {
            warn!(%error, "terminal write failed");
        }
    }
}

impl<W: Write> TerminalDisplay for StdoutDisplay<W> {
    fn write(&mut self, bytes: &[u8]) {
        self.emit(bytes);
    }

    fn clear(&mut self) {
        self.emit(CLEAR);
    }

    fn apply_palette(&mut self, palette: &ThemePalette) {
        let sequence = format!(
            "\x1b]11;{}\x07\x1b]10;{}\x07\x1b]12;{}\x07",
            palette.background.to_xparse(),
            palette.foreground.to_xparse(),
            palette.cursor.to_xparse(),
        );
        self.emit(sequence.as_bytes());
    }

    fn set_title(&mut self, title: &str) {
        let clean: String = title.chars().filter(|c| !c.is_control()).collect();
        self.emit(format!("\x1b]0;{clean}\x07").as_bytes());
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        // The local emulator reflows on its own.
        self.size = (cols, rows);
    }

    fn focus(&mut self) {}
}

/// Status line and reconnect hint rendered inline.
#[derive(Debug)]
pub struct TerminalChrome<W: Write> {
    out: W,
    last_status: Option<ConnectionState>,
}

impl<W: Write> TerminalChrome<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_status: None,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn line(&mut self, text: &str) {
        let rendered = format!("\r\n\x1b[2m[webterm] {text}\x1b[0m\r\n");
        if let Err(error) = self
            .out
            .write_all(rendered.as_bytes())
            .and_then(|()| self.out.flush())
        {
            warn!(%error, "status write failed");
        }
    }
}

impl<W: Write> SessionChrome for TerminalChrome<W> {
    fn show_status(&mut self, state: ConnectionState) {
        if self.last_status == Some(state) {
            return;
        }
        self.last_status = Some(state);
        // Shell output follows an open, so there is nothing to print for it.
        if state != ConnectionState::Open {
            self.line(state.label());
        }
    }

    fn show_reconnect_prompt(&mut self) {
        self.line("Connection lost. Press r to reconnect or q to quit.");
    }

    fn hide_reconnect_prompt(&mut self) {}

    fn set_window_mode(&mut self, mode: WindowMode) {
        debug!(mode = mode.as_str(), "window mode has no native rendering");
    }
}

/// Bracketed paste and focus reporting, so pastes and focus changes arrive
/// as their own events.
fn enable_input_modes(out: &mut impl Write) -> io::Result<()> {
    queue!(out, EnableBracketedPaste, EnableFocusChange)?;
    out.flush()
}

fn restore_terminal(out: &mut impl Write) -> io::Result<()> {
    queue!(out, DisableFocusChange, DisableBracketedPaste)?;
    out.write_all(RESET_COLORS)?;
    out.flush()
}

/// Raw mode plus paste and focus reporting for the lifetime of the guard;
/// modes and colors are reset on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self { _private: () };
        enable_input_modes(&mut io::stdout())?;
        Ok(guard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(error) = restore_terminal(&mut io::stdout()) {
            warn!(%error, "failed to reset terminal modes");
        }
        if let Err(error) = terminal::disable_raw_mode() {
            warn!(%error, "failed to leave raw mode");
        }
    }
}
