//! The session controller.
//!
//! One [`SessionController`] exists per page (or native process). It owns the
//! connection state, the resolved shell description and the active theme, and
//! reacts to [`SessionEvent`]s through [`SessionController::dispatch`]. All side
//! effects go through the injected [`SessionHost`].
//!
//! State machine:
//!
//! ```text
//!   Connecting --opened--> Open --closed/error/user close--> Closed
//!       ^                                                      |
//!       +------------------- manual reconnect -----------------+
//! ```
//!
//! Reconnects are manual only: a close surfaces the reconnect prompt and the
//! session waits for `ReconnectRequested`.

use tracing::{debug, error, info, trace, warn};

use crate::endpoint::ServerOrigin;
use crate::event::{Generation, SessionEvent, WindowAction};
use crate::host::{PreferenceStore, SessionChrome, SessionHost, TerminalDisplay, Transport};
use crate::output::normalize_newlines;
use crate::shell_info::ShellInfo;
use crate::state::{ConnectionState, SessionStats, WindowMode};
use crate::theme::ThemeId;

/// Byte sent for the local interrupt chord (ETX, Ctrl+C).
pub const INTERRUPT_BYTE: u8 = 0x03;

/// Whether the host should keep feeding events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Shutdown,
}

/// Static session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub origin: ServerOrigin,
}

impl SessionConfig {
    #[must_use]
    pub fn new(origin: ServerOrigin) -> Self {
        Self { origin }
    }
}

/// Drives one terminal session against an injected host.
pub struct SessionController<H: SessionHost> {
    host: H,
    config: SessionConfig,
    state: ConnectionState,
    shell_info: Option<ShellInfo>,
    theme: ThemeId,
    generation: Generation,
    prompt_visible: bool,
    window_mode: WindowMode,
    stats: SessionStats,
    shut_down: bool,
}

impl<H: SessionHost> SessionController<H> {
    /// Create a session in the `Connecting` state.
    ///
    /// The stored theme is read here; an unknown stored name falls back to the
    /// default theme. Nothing is opened until the shell metadata settles.
    pub fn new(mut host: H, config: SessionConfig) -> Self {
        let theme = match host.store().load_theme() {
            Some(name) => ThemeId::from_name(&name).unwrap_or_else(|| {
                warn!(stored = %name, fallback = %ThemeId::DEFAULT, "stored theme is unknown");
                ThemeId::DEFAULT
            }),
            None => ThemeId::DEFAULT,
        };
        debug!(%theme, origin = %config.origin, "session created");

        Self {
            host,
            config,
            state: ConnectionState::Connecting,
            shell_info: None,
            theme,
            generation: Generation::default(),
            prompt_visible: false,
            window_mode: WindowMode::default(),
            stats: SessionStats::default(),
            shut_down: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Resolved shell description, once the startup fetch has settled.
    #[must_use]
    pub fn shell_info(&self) -> Option<&ShellInfo> {
        self.shell_info.as_ref()
    }

    #[must_use]
    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    /// Generation of the current (or most recently retired) connection.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    #[must_use]
    pub fn window_mode(&self) -> WindowMode {
        self.window_mode
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Apply one event.
    ///
    /// Transport events whose generation does not match the current connection
    /// are discarded. After `Unload` every event is ignored and `Shutdown` is
    /// returned.
    pub fn dispatch(&mut self, event: SessionEvent) -> Dispatch {
        if self.shut_down {
            trace!(event = event.kind(), "session shut down; ignoring event");
            return Dispatch::Shutdown;
        }

        if let Some(generation) = event.generation()
            && (generation != self.generation || generation == Generation::default())
        {
            trace!(
                event = event.kind(),
                stale = %generation,
                current = %self.generation,
                "ignoring event from a replaced transport"
            );
            return Dispatch::Continue;
        }

        match event {
            SessionEvent::ShellInfoSettled(outcome) => self.on_shell_info(outcome),
            SessionEvent::TransportOpened { .. } => self.on_transport_open(),
            SessionEvent::TransportMessage { data, .. } => self.on_transport_message(&data),
            SessionEvent::TransportError { message, .. } => self.on_transport_error(&message),
            SessionEvent::TransportClosed { code, reason, .. } => {
                self.on_transport_close(code, &reason);
            }
            SessionEvent::UserInput(bytes) => self.send_input(&bytes),
            SessionEvent::Interrupt => self.send_input(&[INTERRUPT_BYTE]),
            SessionEvent::Resize { cols, rows } => self.on_resize(cols, rows),
            SessionEvent::ReconnectRequested => self.reconnect(),
            SessionEvent::ThemeSelected(name) => self.set_theme(&name),
            SessionEvent::Window(action) => self.on_window_action(action),
            SessionEvent::VisibilityChanged { visible } => {
                if visible && self.state.is_open() {
                    self.host.display().focus();
                }
            }
            SessionEvent::Unload => {
                info!(generation = %self.generation, "unloading session");
                self.retire_transport();
                self.set_state(ConnectionState::Closed);
                self.shut_down = true;
                return Dispatch::Shutdown;
            }
        }
        Dispatch::Continue
    }

    fn on_shell_info(&mut self, outcome: crate::Result<ShellInfo>) {
        if self.shell_info.is_some() {
            warn!("shell metadata settled twice; keeping the first result");
            return;
        }

        let info = match outcome {
            Ok(info) => {
                info!(command = info.command_line(), "shell metadata loaded");
                info
            }
            Err(err) => {
                let info = ShellInfo::default();
                warn!(
                    error = %err,
                    fallback = info.command_line(),
                    "shell metadata unavailable; using default shell"
                );
                info
            }
        };

        let palette = self.theme.palette();
        let display = self.host.display();
        display.apply_palette(&palette);
        display.set_title(info.command_line());
        self.shell_info = Some(info);

        self.open_transport();
    }

    fn on_transport_open(&mut self) {
        info!(generation = %self.generation, "transport open");
        self.host.display().clear();
        self.set_state(ConnectionState::Open);
        self.hide_prompt();
        self.host.display().focus();
    }

    fn on_transport_message(&mut self, data: &[u8]) {
        self.stats.record_received(data.len());
        let normalized = normalize_newlines(data);
        self.host.display().write(&normalized);
    }

    fn on_transport_error(&mut self, message: &str) {
        warn!(generation = %self.generation, error = message, "transport error");
        self.set_state(ConnectionState::Closed);
    }

    fn on_transport_close(&mut self, code: Option<u16>, reason: &str) {
        info!(
            generation = %self.generation,
            code,
            reason,
            "transport closed"
        );
        self.set_state(ConnectionState::Closed);
        self.show_prompt();
    }

    fn send_input(&mut self, bytes: &[u8]) {
        if !self.state.is_open() {
            self.stats.record_dropped();
            trace!(len = bytes.len(), state = %self.state, "dropping input while not connected");
            return;
        }
        if bytes.is_empty() {
            return;
        }
        match self.host.transport().send(bytes) {
            Ok(()) => self.stats.record_sent(bytes.len()),
            Err(err) => warn!(len = bytes.len(), error = %err, "failed to send input"),
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        if cols == 0 || rows == 0 {
            debug!(cols, rows, "ignoring degenerate resize");
            return;
        }
        trace!(cols, rows, "display resized");
        self.host.display().resize(cols, rows);
    }

    fn reconnect(&mut self) {
        if self.state != ConnectionState::Closed {
            debug!(state = %self.state, "reconnect ignored; session is not closed");
            return;
        }
        if self.shell_info.is_none() {
            debug!("reconnect ignored; startup has not finished");
            return;
        }
        self.stats.record_reconnect();
        info!(attempt = self.stats.reconnects, "reconnecting");
        self.retire_transport();
        self.open_transport();
    }

    fn set_theme(&mut self, name: &str) {
        let theme = ThemeId::from_name(name).unwrap_or_else(|| {
            warn!(requested = name, fallback = %ThemeId::DEFAULT, "unknown theme");
            ThemeId::DEFAULT
        });
        debug!(%theme, "applying theme");
        self.theme = theme;
        self.host.display().apply_palette(&theme.palette());
        if let Err(err) = self.host.store().save_theme(theme.name()) {
            warn!(%theme, error = %err, "failed to persist theme");
        }
    }

    fn on_window_action(&mut self, action: WindowAction) {
        match action {
            WindowAction::Close => {
                if self.state == ConnectionState::Closed {
                    return;
                }
                info!(generation = %self.generation, "connection closed by user");
                self.retire_transport();
                self.set_state(ConnectionState::Closed);
                self.show_prompt();
            }
            WindowAction::Minimize | WindowAction::Maximize => {
                self.window_mode = self.window_mode.after(action);
                debug!(mode = self.window_mode.as_str(), "window mode changed");
                self.host.chrome().set_window_mode(self.window_mode);
            }
        }
    }

    fn open_transport(&mut self) {
        self.generation = self.generation.next();
        let generation = self.generation;
        let url = self.config.origin.terminal_url();

        self.hide_prompt();
        self.set_state(ConnectionState::Connecting);
        info!(%url, %generation, "opening transport");

        if let Err(err) = self.host.transport().open(&url, generation) {
            error!(%url, %generation, error = %err, "transport failed to open");
            self.generation = self.generation.next();
            self.set_state(ConnectionState::Closed);
            self.show_prompt();
        }
    }

    /// Close the current transport and make its pending events stale.
    fn retire_transport(&mut self) {
        self.host.transport().close();
        self.generation = self.generation.next();
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "connection state changed");
        }
        self.state = state;
        self.host.chrome().show_status(state);
    }

    fn show_prompt(&mut self) {
        if !self.prompt_visible {
            self.prompt_visible = true;
            self.host.chrome().show_reconnect_prompt();
        }
    }

    fn hide_prompt(&mut self) {
        if self.prompt_visible {
            self.prompt_visible = false;
            self.host.chrome().hide_reconnect_prompt();
        }
    }
}
