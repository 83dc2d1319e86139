//! Plain state types owned by the session.

use std::fmt;

use crate::event::WindowAction;

/// Transport connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Text for the status badge.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Open => "Connected",
            Self::Closed => "Disconnected",
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation of the terminal window frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowMode {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl WindowMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Minimized => "minimized",
            Self::Maximized => "maximized",
        }
    }

    /// Mode after pressing a window button.
    ///
    /// Minimize and maximize toggle back to normal when already active.
    /// `Close` leaves the frame as it is.
    #[must_use]
    pub const fn after(self, action: WindowAction) -> Self {
        match (action, self) {
            (WindowAction::Minimize, Self::Minimized) => Self::Normal,
            (WindowAction::Minimize, _) => Self::Minimized,
            (WindowAction::Maximize, Self::Maximized) => Self::Normal,
            (WindowAction::Maximize, _) => Self::Maximized,
            (WindowAction::Close, mode) => mode,
        }
    }
}

/// Saturating counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Output bytes received from the transport (before normalization).
    pub bytes_received: u64,
    /// Input bytes handed to the transport.
    pub bytes_sent: u64,
    /// Input events dropped because the session was not open.
    pub inputs_dropped: u64,
    /// Manual reconnects performed.
    pub reconnects: u64,
}

impl SessionStats {
    pub(crate) fn record_received(&mut self, len: usize) {
        self.bytes_received = self
            .bytes_received
            .saturating_add(u64::try_from(len).unwrap_or(u64::MAX));
    }

    pub(crate) fn record_sent(&mut self, len: usize) {
        self.bytes_sent = self
            .bytes_sent
            .saturating_add(u64::try_from(len).unwrap_or(u64::MAX));
    }

    pub(crate) fn record_dropped(&mut self) {
        self.inputs_dropped = self.inputs_dropped.saturating_add(1);
    }

    pub(crate) fn record_reconnect(&mut self) {
        self.reconnects = self.reconnects.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_is_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Closed.is_open());
    }

    #[test]
    fn labels_for_status_badge() {
        assert_eq!(ConnectionState::Open.label(), "Connected");
        assert_eq!(ConnectionState::Closed.label(), "Disconnected");
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
    }

    #[test]
    fn window_buttons_toggle() {
        let mode = WindowMode::default().after(WindowAction::Maximize);
        assert_eq!(mode, WindowMode::Maximized);
        assert_eq!(mode.after(WindowAction::Maximize), WindowMode::Normal);
        assert_eq!(mode.after(WindowAction::Minimize), WindowMode::Minimized);
        assert_eq!(
            WindowMode::Minimized.after(WindowAction::Minimize),
            WindowMode::Normal
        );
        assert_eq!(
            WindowMode::Minimized.after(WindowAction::Close),
            WindowMode::Minimized
        );
    }

    #[test]
    fn stats_saturate() {
        let mut stats = SessionStats {
            bytes_received: u64::MAX - 1,
            ..SessionStats::default()
        };
        stats.record_received(10);
        assert_eq!(stats.bytes_received, u64::MAX);
        stats.record_sent(3);
        stats.record_dropped();
        stats.record_reconnect();
        assert_eq!(stats.bytes_sent, 3);
        assert_eq!(stats.inputs_dropped, 1);
        assert_eq!(stats.reconnects, 1);
    }
}
