//! End-to-end session flows against a journaling host.
//!
//! Every collaborator call is appended to one shared journal so the tests can
//! assert on ordering across display, transport, chrome and store.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tracing::Level;
use webterm_core::{
    ConnectionState, Dispatch, Generation, PreferenceStore, Result, ServerOrigin, SessionChrome,
    SessionConfig, SessionController, SessionEvent, SessionHost, ShellInfo, TerminalDisplay,
    ThemeId, ThemePalette, Transport, WebTermError, WindowAction, WindowMode,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .try_init();
}

type Journal = Rc<RefCell<Vec<String>>>;

fn note(journal: &Journal, entry: impl Into<String>) {
    journal.borrow_mut().push(entry.into());
}

struct JournalDisplay(Journal);

impl TerminalDisplay for JournalDisplay {
    fn write(&mut self, bytes: &[u8]) {
        note(&self.0, format!("write {}", String::from_utf8_lossy(bytes).escape_debug()));
    }
    fn clear(&mut self) {
        note(&self.0, "clear");
    }
    fn apply_palette(&mut self, palette: &ThemePalette) {
        note(&self.0, format!("palette {}", palette.background));
    }
    fn set_title(&mut self, title: &str) {
        note(&self.0, format!("title {title}"));
    }
    fn resize(&mut self, cols: u16, rows: u16) {
        note(&self.0, format!("resize {cols}x{rows}"));
    }
    fn focus(&mut self) {
        note(&self.0, "focus");
    }
}

struct JournalTransport {
    journal: Journal,
    refuse: bool,
}

impl Transport for JournalTransport {
    fn open(&mut self, url: &str, generation: Generation) -> Result<()> {
        if self.refuse {
            note(&self.journal, format!("open-refused {url}"));
            return Err(WebTermError::transport_open("refused"));
        }
        note(&self.journal, format!("open {url} {generation}"));
        Ok(())
    }
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        note(
            &self.journal,
            format!("send {}", String::from_utf8_lossy(bytes).escape_debug()),
        );
        Ok(())
    }
    fn close(&mut self) {
        note(&self.journal, "close");
    }
}

struct JournalChrome(Journal);

impl SessionChrome for JournalChrome {
    fn show_status(&mut self, state: ConnectionState) {
        note(&self.0, format!("status {}", state.label()));
    }
    fn show_reconnect_prompt(&mut self) {
        note(&self.0, "prompt show");
    }
    fn hide_reconnect_prompt(&mut self) {
        note(&self.0, "prompt hide");
    }
    fn set_window_mode(&mut self, mode: WindowMode) {
        note(&self.0, format!("window {}", mode.as_str()));
    }
}

struct MemoryStore {
    theme: Option<String>,
}

impl PreferenceStore for MemoryStore {
    fn load_theme(&self) -> Option<String> {
        self.theme.clone()
    }
    fn save_theme(&mut self, name: &str) -> Result<()> {
        self.theme = Some(name.to_owned());
        Ok(())
    }
}

struct JournalHost {
    display: JournalDisplay,
    transport: JournalTransport,
    chrome: JournalChrome,
    store: MemoryStore,
}

impl JournalHost {
    fn new(journal: &Journal, stored_theme: Option<&str>) -> Self {
        Self {
            display: JournalDisplay(Rc::clone(journal)),
            transport: JournalTransport {
                journal: Rc::clone(journal),
                refuse: false,
            },
            chrome: JournalChrome(Rc::clone(journal)),
            store: MemoryStore {
                theme: stored_theme.map(str::to_owned),
            },
        }
    }
}

impl SessionHost for JournalHost {
    type Display = JournalDisplay;
    type Transport = JournalTransport;
    type Chrome = JournalChrome;
    type Store = MemoryStore;

    fn display(&mut self) -> &mut JournalDisplay {
        &mut self.display
    }
    fn transport(&mut self) -> &mut JournalTransport {
        &mut self.transport
    }
    fn chrome(&mut self) -> &mut JournalChrome {
        &mut self.chrome
    }
    fn store(&mut self) -> &mut MemoryStore {
        &mut self.store
    }
}

fn session(journal: &Journal, stored_theme: Option<&str>) -> SessionController<JournalHost> {
    init_tracing();
    let origin = ServerOrigin::from_location("http:", "localhost:3000").expect("origin");
    SessionController::new(JournalHost::new(journal, stored_theme), SessionConfig::new(origin))
}

fn drain(journal: &Journal) -> Vec<String> {
    std::mem::take(&mut *journal.borrow_mut())
}

#[test]
fn startup_then_open_then_output() {
    let journal = Journal::default();
    let mut session = session(&journal, Some("dracula"));

    session.dispatch(SessionEvent::ShellInfoSettled(ShellInfo::from_json(
        r#"{"shell":"/bin/zsh","args":["-i"],"full_command":"/bin/zsh -i"}"#,
    )));
    assert_eq!(
        drain(&journal),
        vec![
            "palette #282a36",
            "title /bin/zsh -i",
            "status Connecting...",
            "open ws://localhost:3000/ws #1",
        ]
    );

    session.dispatch(SessionEvent::TransportOpened {
        generation: Generation::new(1),
    });
    session.dispatch(SessionEvent::TransportMessage {
        generation: Generation::new(1),
        data: b"$ ls\nfile\n".to_vec(),
    });
    assert_eq!(
        drain(&journal),
        vec![
            "clear",
            "status Connected",
            "focus",
            "write $ ls\\r\\nfile\\r\\n",
        ]
    );
}

#[test]
fn malformed_metadata_falls_back_to_bash() {
    let journal = Journal::default();
    let mut session = session(&journal, None);

    session.dispatch(SessionEvent::ShellInfoSettled(ShellInfo::from_json(
        "<html>502</html>",
    )));
    let entries = drain(&journal);
    assert!(entries.contains(&"title bash -i".to_string()), "{entries:?}");
    assert!(entries.contains(&"open ws://localhost:3000/ws #1".to_string()));
    assert_eq!(session.theme(), ThemeId::Dark);
}

#[test]
fn drop_and_manual_reconnect() {
    let journal = Journal::default();
    let mut session = session(&journal, None);
    session.dispatch(SessionEvent::ShellInfoSettled(Ok(ShellInfo::default())));
    session.dispatch(SessionEvent::TransportOpened {
        generation: Generation::new(1),
    });
    drain(&journal);

    session.dispatch(SessionEvent::TransportError {
        generation: Generation::new(1),
        message: "reset".into(),
    });
    session.dispatch(SessionEvent::TransportClosed {
        generation: Generation::new(1),
        code: Some(1006),
        reason: String::new(),
    });
    session.dispatch(SessionEvent::UserInput(b"typed while down".to_vec()));
    assert_eq!(
        drain(&journal),
        vec!["status Disconnected", "status Disconnected", "prompt show"]
    );

    session.dispatch(SessionEvent::ReconnectRequested);
    assert_eq!(
        drain(&journal),
        vec![
            "close",
            "prompt hide",
            "status Connecting...",
            "open ws://localhost:3000/ws #3",
        ]
    );

    // Late event from the first socket.
    session.dispatch(SessionEvent::TransportMessage {
        generation: Generation::new(1),
        data: b"stale".to_vec(),
    });
    assert!(drain(&journal).is_empty());

    session.dispatch(SessionEvent::TransportOpened {
        generation: Generation::new(3),
    });
    session.dispatch(SessionEvent::Interrupt);
    let entries = drain(&journal);
    assert_eq!(entries.last().map(String::as_str), Some("send \\u{3}"));
    assert_eq!(session.stats().inputs_dropped, 1);
}

#[test]
fn refused_open_offers_reconnect() {
    let journal = Journal::default();
    let mut session = session(&journal, None);
    session.host_mut().transport.refuse = true;
    session.dispatch(SessionEvent::ShellInfoSettled(Ok(ShellInfo::default())));
    let entries = drain(&journal);
    assert_eq!(
        &entries[entries.len() - 3..],
        &[
            "open-refused ws://localhost:3000/ws".to_string(),
            "status Disconnected".to_string(),
            "prompt show".to_string(),
        ]
    );
    assert_eq!(session.state(), ConnectionState::Closed);
}

#[test]
fn theme_round_trips_through_store() {
    let journal = Journal::default();
    let mut session = session(&journal, None);
    session.dispatch(SessionEvent::ThemeSelected("  LIGHT ".into()));
    assert_eq!(drain(&journal), vec!["palette #ffffff"]);

    let store = session.into_host().store;
    assert_eq!(store.theme.as_deref(), Some("light"));

    let journal = Journal::default();
    let reloaded = SessionController::new(
        JournalHost {
            store,
            ..JournalHost::new(&journal, None)
        },
        SessionConfig::new(ServerOrigin::parse("localhost:3000").expect("origin")),
    );
    assert_eq!(reloaded.theme(), ThemeId::Light);
}

#[test]
fn window_controls_and_unload() {
    let journal = Journal::default();
    let mut session = session(&journal, None);
    session.dispatch(SessionEvent::ShellInfoSettled(Ok(ShellInfo::default())));
    session.dispatch(SessionEvent::TransportOpened {
        generation: Generation::new(1),
    });
    drain(&journal);

    session.dispatch(SessionEvent::Window(WindowAction::Minimize));
    session.dispatch(SessionEvent::Window(WindowAction::Close));
    assert_eq!(
        drain(&journal),
        vec![
            "window minimized",
            "close",
            "status Disconnected",
            "prompt show",
        ]
    );

    assert_eq!(session.dispatch(SessionEvent::Unload), Dispatch::Shutdown);
    assert_eq!(drain(&journal), vec!["close", "status Disconnected"]);
    assert_eq!(
        session.dispatch(SessionEvent::UserInput(b"x".to_vec())),
        Dispatch::Shutdown
    );
    assert!(drain(&journal).is_empty());
}
