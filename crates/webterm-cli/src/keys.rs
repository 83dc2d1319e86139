//! Key routing and encoding for the native client.
//!
//! Converts crossterm key events into either a local command (reconnect,
//! theme, quit) or the bytes a remote shell expects.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::trace;

/// What a key press means for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Interrupt,
    Send(Vec<u8>),
    Reconnect,
    CycleTheme,
    CloseConnection,
    Quit,
    Ignore,
}

/// Stateful router for the `Ctrl+]` command prefix.
#[derive(Debug, Default)]
pub struct KeyRouter {
    prefix_armed: bool,
}

impl KeyRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix_armed(&self) -> bool {
        self.prefix_armed
    }

    /// Route one key. `prompt_visible` enables the bare `r`/`q` shortcuts.
    pub fn route(&mut self, key: KeyEvent, prompt_visible: bool) -> KeyAction {
        if key.kind == KeyEventKind::Release {
            return KeyAction::Ignore;
        }

        if self.prefix_armed {
            self.prefix_armed = false;
            return match key.code {
                KeyCode::Char('r') => KeyAction::Reconnect,
                KeyCode::Char('t') => KeyAction::CycleTheme,
                KeyCode::Char('c') => KeyAction::CloseConnection,
                KeyCode::Char('q') => KeyAction::Quit,
                // Pressing the prefix twice sends it through.
                KeyCode::Char(']') if is_prefix(key) => KeyAction::Send(vec![0x1d]),
                _ => {
                    trace!(code = ?key.code, "unknown command after prefix");
                    KeyAction::Ignore
                }
            };
        }

        if is_prefix(key) {
            self.prefix_armed = true;
            return KeyAction::Ignore;
        }
        if is_interrupt(key) {
            return KeyAction::Interrupt;
        }

        if prompt_visible && key.modifiers.is_empty() {
            match key.code {
                KeyCode::Char('r') => return KeyAction::Reconnect,
                KeyCode::Char('q') => return KeyAction::Quit,
                _ => {}
            }
        }

        key_event_to_bytes(key).map_or(KeyAction::Ignore, KeyAction::Send)
    }
}

fn is_prefix(key: KeyEvent) -> bool {
    key.code == KeyCode::Char(']') && key.modifiers == KeyModifiers::CONTROL
}

/// Ctrl+C with no other modifier.
#[must_use]
pub fn is_interrupt(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('c' | 'C')) && key.modifiers == KeyModifiers::CONTROL
}

/// Convert a key event to the bytes a shell expects.
///
/// Returns `None` for keys without a terminal encoding (function keys, media
/// keys, bare modifiers).
#[must_use]
pub fn key_event_to_bytes(key: KeyEvent) -> Option<Vec<u8>> {
    match key.code {
        KeyCode::Char(ch) => {
            let bytes = if key.modifiers.contains(KeyModifiers::CONTROL) {
                control_code(ch).map_or_else(|| encode_char(ch), |code| vec![code])
            } else {
                encode_char(ch)
            };
            Some(with_alt_prefix(key.modifiers, bytes))
        }
        KeyCode::Enter => Some(with_alt_prefix(key.modifiers, vec![b'\r'])),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(b"\x1b[Z".to_vec()),
        KeyCode::Tab => Some(with_alt_prefix(key.modifiers, vec![b'\t'])),
        KeyCode::BackTab => Some(b"\x1b[Z".to_vec()),
        KeyCode::Backspace => Some(with_alt_prefix(key.modifiers, vec![0x7f])),
        KeyCode::Esc => Some(vec![0x1b]),
        KeyCode::Up => Some(encode_csi_key(key.modifiers, 'A')),
        KeyCode::Down => Some(encode_csi_key(key.modifiers, 'B')),
        KeyCode::Right => Some(encode_csi_key(key.modifiers, 'C')),
        KeyCode::Left => Some(encode_csi_key(key.modifiers, 'D')),
        KeyCode::Home => Some(encode_csi_key(key.modifiers, 'H')),
        KeyCode::End => Some(encode_csi_key(key.modifiers, 'F')),
        KeyCode::Insert => Some(encode_csi_tilde_key(key.modifiers, 2)),
        KeyCode::Delete => Some(encode_csi_tilde_key(key.modifiers, 3)),
        KeyCode::PageUp => Some(encode_csi_tilde_key(key.modifiers, 5)),
        KeyCode::PageDown => Some(encode_csi_tilde_key(key.modifiers, 6)),
        _ => None,
    }
}

fn encode_char(ch: char) -> Vec<u8> {
    let mut buffer = [0u8; 4];
    ch.encode_utf8(&mut buffer).as_bytes().to_vec()
}

/// Ctrl+letter and the handful of punctuation keys with C0 codes.
fn control_code(ch: char) -> Option<u8> {
    let lower = ch.to_ascii_lowercase();
    match lower {
        'a'..='z' => Some(lower as u8 - b'a' + 1),
        ' ' | '@' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        _ => None,
    }
}

fn with_alt_prefix(modifiers: KeyModifiers, bytes: Vec<u8>) -> Vec<u8> {
    if !modifiers.contains(KeyModifiers::ALT) {
        return bytes;
    }
    let mut prefixed = Vec::with_capacity(bytes.len() + 1);
    prefixed.push(0x1b);
    prefixed.extend(bytes);
    prefixed
}

/// xterm modifier parameter: 1 + shift(1) + alt(2) + ctrl(4).
fn modifier_param(modifiers: KeyModifiers) -> Option<u8> {
    let mut value = 1;
    if modifiers.contains(KeyModifiers::SHIFT) {
        value += 1;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        value += 2;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        value += 4;
    }
    (value > 1).then_some(value)
}

fn encode_csi_key(modifiers: KeyModifiers, final_byte: char) -> Vec<u8> {
    match modifier_param(modifiers) {
        Some(param) => format!("\x1b[1;{param}{final_byte}").into_bytes(),
        None => format!("\x1b[{final_byte}").into_bytes(),
    }
}

fn encode_csi_tilde_key(modifiers: KeyModifiers, code: u8) -> Vec<u8> {
    match modifier_param(modifiers) {
        Some(param) => format!("\x1b[{code};{param}~").into_bytes(),
        None => format!("\x1b[{code}~").into_bytes(),
    }
}
