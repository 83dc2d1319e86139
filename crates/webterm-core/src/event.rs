//! Events consumed by [`crate::session::SessionController::dispatch`].
//!
//! Hosts translate their callbacks (socket lifecycle, DOM listeners, key
//! presses) into these variants and hand them to a single dispatcher.

use std::fmt;

use crate::error::WebTermError;
use crate::shell_info::ShellInfo;

/// Identifies one transport connection attempt.
///
/// Every open gets a new generation; transport events carry the generation they
/// belong to so events from a replaced socket can be discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Window chrome buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Minimize,
    Maximize,
}

/// Everything the session reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    /// The startup metadata fetch finished, successfully or not.
    ShellInfoSettled(Result<ShellInfo, WebTermError>),
    TransportOpened {
        generation: Generation,
    },
    TransportMessage {
        generation: Generation,
        data: Vec<u8>,
    },
    TransportError {
        generation: Generation,
        message: String,
    },
    TransportClosed {
        generation: Generation,
        code: Option<u16>,
        reason: String,
    },
    /// Bytes typed (or pasted) into the display.
    UserInput(Vec<u8>),
    /// The local interrupt chord.
    Interrupt,
    Resize {
        cols: u16,
        rows: u16,
    },
    ReconnectRequested,
    ThemeSelected(String),
    Window(WindowAction),
    VisibilityChanged {
        visible: bool,
    },
    Unload,
}

impl SessionEvent {
    /// Stable snake_case label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ShellInfoSettled(_) => "shell_info_settled",
            Self::TransportOpened { .. } => "transport_opened",
            Self::TransportMessage { .. } => "transport_message",
            Self::TransportError { .. } => "transport_error",
            Self::TransportClosed { .. } => "transport_closed",
            Self::UserInput(_) => "user_input",
            Self::Interrupt => "interrupt",
            Self::Resize { .. } => "resize",
            Self::ReconnectRequested => "reconnect_requested",
            Self::ThemeSelected(_) => "theme_selected",
            Self::Window(_) => "window",
            Self::VisibilityChanged { .. } => "visibility_changed",
            Self::Unload => "unload",
        }
    }

    /// Connection the event belongs to, for transport events.
    #[must_use]
    pub const fn generation(&self) -> Option<Generation> {
        match self {
            Self::TransportOpened { generation }
            | Self::TransportMessage { generation, .. }
            | Self::TransportError { generation, .. }
            | Self::TransportClosed { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_advances_and_saturates() {
        assert_eq!(Generation::default().next().get(), 1);
        assert_eq!(Generation::new(u64::MAX).next().get(), u64::MAX);
        assert_eq!(Generation::new(7).to_string(), "#7");
    }

    #[test]
    fn transport_events_report_generation() {
        let generation = Generation::new(3);
        let events = [
            SessionEvent::TransportOpened { generation },
            SessionEvent::TransportMessage {
                generation,
                data: b"x".to_vec(),
            },
            SessionEvent::TransportError {
                generation,
                message: String::new(),
            },
            SessionEvent::TransportClosed {
                generation,
                code: Some(1000),
                reason: String::new(),
            },
        ];
        for event in &events {
            assert_eq!(event.generation(), Some(generation), "{}", event.kind());
        }
        assert_eq!(SessionEvent::Interrupt.generation(), None);
    }

    #[test]
    fn kinds_are_snake_case() {
        let events = [
            SessionEvent::UserInput(Vec::new()),
            SessionEvent::ReconnectRequested,
            SessionEvent::Window(WindowAction::Maximize),
            SessionEvent::VisibilityChanged { visible: true },
        ];
        for event in &events {
            let kind = event.kind();
            assert!(kind.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{kind}");
        }
    }
}
