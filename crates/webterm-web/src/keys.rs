#![forbid(unsafe_code)]

//! Interrupt chord detection for xterm's custom key handler.
//!
//! Plain data in, decision out, so the rules are testable without a browser.

/// The parts of a `KeyboardEvent` the handler looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord<'a> {
    /// `"keydown"`, `"keyup"` or `"keypress"`.
    pub event_type: &'a str,
    /// `KeyboardEvent.key`.
    pub key: &'a str,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

/// What xterm should do with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// Send the interrupt byte and keep xterm from emitting its own.
    Interrupt,
    /// Part of an interrupt chord already handled on keydown.
    Suppress,
    /// Let xterm process the event normally.
    PassThrough,
}

impl KeyDecision {
    /// Return value for `attachCustomKeyEventHandler`: `true` lets xterm run.
    #[must_use]
    pub const fn xterm_should_handle(self) -> bool {
        matches!(self, Self::PassThrough)
    }
}

/// Ctrl+C with no other modifier, either case.
#[must_use]
pub fn is_interrupt_chord(chord: &KeyChord<'_>) -> bool {
    chord.ctrl
        && !chord.alt
        && !chord.meta
        && !chord.shift
        && chord.key.eq_ignore_ascii_case("c")
}

#[must_use]
pub fn classify(chord: &KeyChord<'_>) -> KeyDecision {
    if !is_interrupt_chord(chord) {
        return KeyDecision::PassThrough;
    }
    if chord.event_type == "keydown" {
        KeyDecision::Interrupt
    } else {
        KeyDecision::Suppress
    }
}
