#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use webterm_core::{
    ConnectionState, Generation, PreferenceStore, Result, ServerOrigin, SessionChrome,
    SessionConfig, SessionController, SessionEvent, SessionHost, ShellInfo, TerminalDisplay,
    ThemePalette, Transport, WebTermError, WindowAction, WindowMode,
};

#[derive(Debug, Arbitrary)]
enum Step {
    Settle { ok: bool },
    Opened { lag: u8 },
    Message { lag: u8, data: Vec<u8> },
    Error { lag: u8 },
    Closed { lag: u8 },
    Input(Vec<u8>),
    Interrupt,
    Resize { cols: u16, rows: u16 },
    Reconnect,
    Theme(String),
    Close,
    Minimize,
    Maximize,
    Visible(bool),
    RefuseNextOpen,
}

#[derive(Default)]
struct Host {
    refuse_open: bool,
    connected: bool,
    sends_while_not_open: usize,
    stored: Option<String>,
    state: Option<ConnectionState>,
}

impl TerminalDisplay for Host {
    fn write(&mut self, _bytes: &[u8]) {}
    fn clear(&mut self) {}
    fn apply_palette(&mut self, _palette: &ThemePalette) {}
    fn set_title(&mut self, _title: &str) {}
    fn resize(&mut self, _cols: u16, _rows: u16) {}
    fn focus(&mut self) {}
}

impl Transport for Host {
    fn open(&mut self, _url: &str, _generation: Generation) -> Result<()> {
        if std::mem::take(&mut self.refuse_open) {
            return Err(WebTermError::transport_open("refused"));
        }
        self.connected = true;
        Ok(())
    }

    fn send(&mut self, _bytes: &[u8]) -> Result<()> {
        if self.state != Some(ConnectionState::Open) {
            self.sends_while_not_open += 1;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.connected = false;
    }
}

impl SessionChrome for Host {
    fn show_status(&mut self, state: ConnectionState) {
        self.state = Some(state);
    }
    fn show_reconnect_prompt(&mut self) {}
    fn hide_reconnect_prompt(&mut self) {}
    fn set_window_mode(&mut self, _mode: WindowMode) {}
}

impl PreferenceStore for Host {
    fn load_theme(&self) -> Option<String> {
        self.stored.clone()
    }

    fn save_theme(&mut self, name: &str) -> Result<()> {
        self.stored = Some(name.to_owned());
        Ok(())
    }
}

impl SessionHost for Host {
    type Display = Self;
    type Transport = Self;
    type Chrome = Self;
    type Store = Self;

    fn display(&mut self) -> &mut Self {
        self
    }
    fn transport(&mut self) -> &mut Self {
        self
    }
    fn chrome(&mut self) -> &mut Self {
        self
    }
    fn store(&mut self) -> &mut Self {
        self
    }
}

fn tagged(session: &SessionController<Host>, lag: u8) -> Generation {
    Generation::new(session.generation().get().saturating_sub(u64::from(lag % 3)))
}

fuzz_target!(|steps: Vec<Step>| {
    let origin = ServerOrigin::parse("http://127.0.0.1:3000").expect("origin");
    let mut session = SessionController::new(Host::default(), SessionConfig::new(origin));
    let mut last_generation = session.generation();

    for step in steps.into_iter().take(256) {
        let event = match step {
            Step::Settle { ok } => SessionEvent::ShellInfoSettled(if ok {
                Ok(ShellInfo::default())
            } else {
                Err(WebTermError::request("fuzz"))
            }),
            Step::Opened { lag } => SessionEvent::TransportOpened {
                generation: tagged(&session, lag),
            },
            Step::Message { lag, data } => SessionEvent::TransportMessage {
                generation: tagged(&session, lag),
                data,
            },
            Step::Error { lag } => SessionEvent::TransportError {
                generation: tagged(&session, lag),
                message: String::new(),
            },
            Step::Closed { lag } => SessionEvent::TransportClosed {
                generation: tagged(&session, lag),
                code: None,
                reason: String::new(),
            },
            Step::Input(bytes) => SessionEvent::UserInput(bytes),
            Step::Interrupt => SessionEvent::Interrupt,
            Step::Resize { cols, rows } => SessionEvent::Resize { cols, rows },
            Step::Reconnect => SessionEvent::ReconnectRequested,
            Step::Theme(name) => SessionEvent::ThemeSelected(name),
            Step::Close => SessionEvent::Window(WindowAction::Close),
            Step::Minimize => SessionEvent::Window(WindowAction::Minimize),
            Step::Maximize => SessionEvent::Window(WindowAction::Maximize),
            Step::Visible(visible) => SessionEvent::VisibilityChanged { visible },
            Step::RefuseNextOpen => {
                session.host_mut().refuse_open = true;
                continue;
            }
        };
        session.dispatch(event);

        assert!(session.generation() >= last_generation);
        last_generation = session.generation();
        assert_eq!(session.host().sends_while_not_open, 0);
        if session.prompt_visible() {
            assert_eq!(session.state(), ConnectionState::Closed);
        }
    }
});
