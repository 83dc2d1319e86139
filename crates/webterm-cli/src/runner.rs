//! Native host and its single-threaded event loop.
//!
//! Each turn drains the transport, then waits up to `poll_interval` for a
//! crossterm event. Everything funnels into `SessionController::dispatch`.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event};
use tracing::{debug, info};
use webterm_core::{
    Dispatch, SessionConfig, SessionController, SessionEvent, SessionHost, ThemeId, WindowAction,
};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::keys::{KeyAction, KeyRouter};
use crate::metadata::{build_client, fetch_shell_info};
use crate::prefs::FilePreferenceStore;
use crate::terminal::{RawModeGuard, StdoutDisplay, TerminalChrome};
use crate::transport::WsTransport;

/// Collaborators for a session running in the local terminal.
pub struct NativeHost<W: Write> {
    pub display: StdoutDisplay<W>,
    pub transport: WsTransport,
    pub chrome: TerminalChrome<W>,
    pub store: FilePreferenceStore,
}

impl<W: Write> NativeHost<W> {
    pub fn new(display: W, chrome: W, store: FilePreferenceStore) -> Self {
        Self {
            display: StdoutDisplay::new(display),
            transport: WsTransport::new(),
            chrome: TerminalChrome::new(chrome),
            store,
        }
    }
}

impl NativeHost<Stdout> {
    #[must_use]
    pub fn stdout(store: FilePreferenceStore, connect_timeout: Duration) -> Self {
        let mut host = Self::new(io::stdout(), io::stdout(), store);
        host.transport = WsTransport::new().with_connect_timeout(connect_timeout);
        host
    }
}

impl<W: Write> SessionHost for NativeHost<W> {
    type Display = StdoutDisplay<W>;
    type Transport = WsTransport;
    type Chrome = TerminalChrome<W>;
    type Store = FilePreferenceStore;

    fn display(&mut self) -> &mut Self::Display {
        &mut self.display
    }

    fn transport(&mut self) -> &mut Self::Transport {
        &mut self.transport
    }

    fn chrome(&mut self) -> &mut Self::Chrome {
        &mut self.chrome
    }

    fn store(&mut self) -> &mut Self::Store {
        &mut self.store
    }
}

pub type NativeSession<W> = SessionController<NativeHost<W>>;

/// Dispatch every event the transport has ready.
pub fn pump_transport<W: Write>(session: &mut NativeSession<W>) -> Dispatch {
    let events = session.host_mut().transport.poll();
    for event in events {
        if session.dispatch(event) == Dispatch::Shutdown {
            return Dispatch::Shutdown;
        }
    }
    Dispatch::Continue
}

/// Translate one routed key into session events.
pub fn apply_key_action<W: Write>(session: &mut NativeSession<W>, action: KeyAction) -> Dispatch {
    match action {
        KeyAction::Interrupt => session.dispatch(SessionEvent::Interrupt),
        KeyAction::Send(bytes) => session.dispatch(SessionEvent::UserInput(bytes)),
        KeyAction::Reconnect => session.dispatch(SessionEvent::ReconnectRequested),
        KeyAction::CycleTheme => {
            let next = session.theme().next();
            session.dispatch(SessionEvent::ThemeSelected(next.name().to_owned()))
        }
        KeyAction::CloseConnection => session.dispatch(SessionEvent::Window(WindowAction::Close)),
        KeyAction::Quit => session.dispatch(SessionEvent::Unload),
        KeyAction::Ignore => Dispatch::Continue,
    }
}

fn apply_terminal_event<W: Write>(
    session: &mut NativeSession<W>,
    router: &mut KeyRouter,
    event: Event,
) -> Dispatch {
    match event {
        Event::Key(key) => {
            let action = router.route(key, session.prompt_visible());
            apply_key_action(session, action)
        }
        Event::Paste(text) => session.dispatch(SessionEvent::UserInput(text.into_bytes())),
        Event::Resize(cols, rows) => session.dispatch(SessionEvent::Resize { cols, rows }),
        Event::FocusGained => session.dispatch(SessionEvent::VisibilityChanged { visible: true }),
        Event::FocusLost => session.dispatch(SessionEvent::VisibilityChanged { visible: false }),
        _ => Dispatch::Continue,
    }
}

/// Run an interactive session until the user quits.
pub fn run_session(config: &ClientConfig, theme: Option<&str>) -> Result<()> {
    let client = build_client(config)?;
    let store = FilePreferenceStore::new(config.theme_file());
    let mut session = SessionController::new(
        NativeHost::stdout(store, config.connect_timeout),
        SessionConfig::new(config.origin.clone()),
    );
    if let Some(name) = theme {
        session.dispatch(SessionEvent::ThemeSelected(name.to_owned()));
    }

    let shell_info = fetch_shell_info(&client, &config.origin);
    let _raw = RawModeGuard::enter()?;
    let (cols, rows) = crossterm::terminal::size()?;
    session.dispatch(SessionEvent::Resize { cols, rows });
    session.dispatch(SessionEvent::ShellInfoSettled(shell_info));

    let mut router = KeyRouter::new();
    loop {
        if pump_transport(&mut session) == Dispatch::Shutdown {
            break;
        }
        if !event::poll(config.poll_interval)? {
            continue;
        }
        let event = event::read()?;
        if apply_terminal_event(&mut session, &mut router, event) == Dispatch::Shutdown {
            break;
        }
    }

    let stats = session.stats();
    info!(
        bytes_received = stats.bytes_received,
        bytes_sent = stats.bytes_sent,
        reconnects = stats.reconnects,
        "session ended"
    );
    Ok(())
}

/// Print the theme table, marking the stored selection.
pub fn write_themes(out: &mut impl Write, store: &FilePreferenceStore) -> Result<()> {
    use webterm_core::PreferenceStore;

    let current = store
        .load_theme()
        .map_or(ThemeId::DEFAULT, |name| ThemeId::resolve(&name));
    debug!(%current, "listing themes");
    for theme in ThemeId::ALL {
        let marker = if theme == current { '*' } else { ' ' };
        let palette = theme.palette();
        writeln!(
            out,
            "{marker} {:<10} bg {} fg {}",
            theme.name(),
            palette.background,
            palette.foreground
        )?;
    }
    Ok(())
}
