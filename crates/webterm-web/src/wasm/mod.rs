//! `wasm-bindgen` exports.
//!
//! [`WebTerm`] owns the event pump; every DOM, xterm and socket callback holds
//! only a weak handle to it. Only compiled on `wasm32` targets.

mod console;
mod dom;
mod socket;
mod xterm;

use std::rc::{Rc, Weak};

use js_sys::{Object, Reflect};
use tracing::{Level, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlElement, KeyboardEvent, VisibilityState, Window};
use webterm_core::{
    ServerOrigin, SessionConfig, SessionController, SessionEvent, SessionHost, ThemeId,
};

use self::console::{init_tracing, install_panic_hook};
use self::dom::{DomChrome, LocalStorageStore, fetch_shell_info, query};
use self::socket::WebSocketTransport;
use self::xterm::{FitAddon, XtermDisplay, XtermTerminal, set_js, terminal_options};
use crate::controls::{
    RECONNECT_BUTTON_SELECTOR, THEME_ATTRIBUTE, THEME_BUTTON_SELECTOR, WINDOW_BUTTONS,
};
use crate::keys::{KeyChord, KeyDecision, classify};
use crate::pump::EventPump;

/// Collaborators for a session running in the page.
pub struct DomHost {
    display: XtermDisplay,
    transport: WebSocketTransport,
    chrome: DomChrome,
    store: LocalStorageStore,
}

impl SessionHost for DomHost {
    type Display = XtermDisplay;
    type Transport = WebSocketTransport;
    type Chrome = DomChrome;
    type Store = LocalStorageStore;

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

pub(crate) type WebPump = EventPump<DomHost>;

fn forward(pump: &Weak<WebPump>, event: SessionEvent) {
    if let Some(pump) = pump.upgrade() {
        pump.dispatch(event);
    }
}

/// Register a page-lifetime listener.
fn listen(
    target: &EventTarget,
    kind: &str,
    mut handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        handler(event);
    });
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn read_u16(obj: &JsValue, key: &str) -> Option<u16> {
    let value = Reflect::get(obj, &JsValue::from_str(key)).ok()?.as_f64()?;
    (value >= 0.0 && value <= f64::from(u16::MAX)).then(|| value as u16)
}

fn bind_terminal(term: &XtermTerminal, pump: &Weak<WebPump>) {
    let input = pump.clone();
    let on_data = Closure::<dyn FnMut(String)>::new(move |data: String| {
        forward(&input, SessionEvent::UserInput(data.into_bytes()));
    });
    term.on_data(&on_data);
    on_data.forget();

    let resizes = pump.clone();
    let on_resize = Closure::<dyn FnMut(JsValue)>::new(move |size: JsValue| {
        if let (Some(cols), Some(rows)) = (read_u16(&size, "cols"), read_u16(&size, "rows")) {
            forward(&resizes, SessionEvent::Resize { cols, rows });
        }
    });
    term.on_resize(&on_resize);
    on_resize.forget();

    let keys = pump.clone();
    let on_key = Closure::<dyn FnMut(KeyboardEvent) -> bool>::new(move |event: KeyboardEvent| {
        let event_type = event.type_();
        let key = event.key();
        let decision = classify(&KeyChord {
            event_type: &event_type,
            key: &key,
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
            shift: event.shift_key(),
        });
        match decision {
            KeyDecision::Interrupt => {
                event.prevent_default();
                forward(&keys, SessionEvent::Interrupt);
            }
            KeyDecision::Suppress => event.prevent_default(),
            KeyDecision::PassThrough => {}
        }
        decision.xterm_should_handle()
    });
    term.attach_custom_key_event_handler(&on_key);
    on_key.forget();
}

fn bind_controls(document: &Document, pump: &Weak<WebPump>) -> Result<(), JsValue> {
    if let Some(button) = query(document, RECONNECT_BUTTON_SELECTOR) {
        let pump = pump.clone();
        listen(&button, "click", move |_| {
            forward(&pump, SessionEvent::ReconnectRequested);
        })?;
    }

    let themes = document.query_selector_all(THEME_BUTTON_SELECTOR)?;
    for index in 0..themes.length() {
        let Some(element) = themes
            .item(index)
            .and_then(|node| node.dyn_into::<web_sys::Element>().ok())
        else {
            continue;
        };
        let Some(name) = element.get_attribute(THEME_ATTRIBUTE) else {
            continue;
        };
        let pump = pump.clone();
        listen(&element, "click", move |_| {
            forward(&pump, SessionEvent::ThemeSelected(name.clone()));
        })?;
    }

    for (selector, action) in WINDOW_BUTTONS {
        if let Some(button) = query(document, selector) {
            let pump = pump.clone();
            listen(&button, "click", move |_| {
                forward(&pump, SessionEvent::Window(action));
            })?;
        }
    }
    Ok(())
}

fn bind_page(
    window: &Window,
    document: &Document,
    pump: &Weak<WebPump>,
    fit: Option<FitAddon>,
) -> Result<(), JsValue> {
    if let Some(fit) = fit {
        // xterm reports the new grid through onResize.
        listen(window, "resize", move |_| fit.fit())?;
    }

    let visibility = pump.clone();
    let doc = document.clone();
    listen(document, "visibilitychange", move |_| {
        let visible = doc.visibility_state() == VisibilityState::Visible;
        forward(&visibility, SessionEvent::VisibilityChanged { visible });
    })?;

    let unload = pump.clone();
    listen(window, "pagehide", move |_| {
        forward(&unload, SessionEvent::Unload);
    })
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Browser entry point.
///
/// ```js
/// const term = new WebTerm("terminal");
/// term.start();
/// ```
#[wasm_bindgen]
pub struct WebTerm {
    container_id: String,
    pump: Option<Rc<WebPump>>,
}

#[wasm_bindgen]
impl WebTerm {
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> Self {
        Self {
            container_id: container_id.to_owned(),
            pump: None,
        }
    }

    /// Mount the terminal and start connecting. Calling it again does nothing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.pump.is_some() {
            return Ok(());
        }
        install_panic_hook();
        init_tracing(Level::INFO);

        let window = web_sys::window().ok_or_else(|| to_js("no window"))?;
        let document = window.document().ok_or_else(|| to_js("no document"))?;
        let container = document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| to_js(format!("no element #{}", self.container_id)))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| to_js("terminal container is not an HTML element"))?;
        let location = window.location();
        let origin = ServerOrigin::from_location(&location.protocol()?, &location.host()?)
            .map_err(to_js)?;

        let term = XtermTerminal::new(&terminal_options())?;
        let fit = FitAddon::new().ok();
        if let Some(fit) = &fit {
            term.load_addon(fit);
        }
        term.open(&container);
        if let Some(fit) = &fit {
            fit.fit();
        }

        let pump = Rc::new(WebPump::new());
        let weak = Rc::downgrade(&pump);
        let host = DomHost {
            display: XtermDisplay::new(term.clone(), document.clone()),
            transport: WebSocketTransport::new(weak.clone()),
            chrome: DomChrome::new(&document),
            store: LocalStorageStore::new(&window),
        };
        pump.install(SessionController::new(
            host,
            SessionConfig::new(origin.clone()),
        ));

        bind_terminal(&term, &weak);
        bind_controls(&document, &weak)?;
        bind_page(&window, &document, &weak, fit)?;
        pump.dispatch(SessionEvent::Resize {
            cols: term.cols(),
            rows: term.rows(),
        });

        info!(%origin, "webterm started");
        let url = origin.shell_info_url();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = fetch_shell_info(window, url).await;
            forward(&weak, SessionEvent::ShellInfoSettled(outcome));
        });

        self.pump = Some(pump);
        Ok(())
    }

    /// `"connecting"`, `"open"` or `"closed"`; empty before `start`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.with_session(|session| session.state().as_str().to_owned())
            .unwrap_or_default()
    }

    #[wasm_bindgen(getter)]
    pub fn theme(&self) -> String {
        self.with_session(|session| session.theme().name().to_owned())
            .unwrap_or_else(|| ThemeId::DEFAULT.name().to_owned())
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, name: &str) {
        self.dispatch(SessionEvent::ThemeSelected(name.to_owned()));
    }

    pub fn reconnect(&self) {
        self.dispatch(SessionEvent::ReconnectRequested);
    }

    /// Session counters as a plain object.
    pub fn stats(&self) -> JsValue {
        let Some(stats) = self.with_session(|session| session.stats()) else {
            return JsValue::NULL;
        };
        let obj = Object::new();
        // Counters stay far below 2^53 in practice.
        set_js(&obj, "bytesReceived", JsValue::from_f64(stats.bytes_received as f64));
        set_js(&obj, "bytesSent", JsValue::from_f64(stats.bytes_sent as f64));
        set_js(&obj, "inputsDropped", JsValue::from_f64(stats.inputs_dropped as f64));
        set_js(&obj, "reconnects", JsValue::from_f64(stats.reconnects as f64));
        obj.into()
    }
}

impl WebTerm {
    fn dispatch(&self, event: SessionEvent) {
        if let Some(pump) = &self.pump {
            pump.dispatch(event);
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&SessionController<DomHost>) -> R) -> Option<R> {
        self.pump.as_ref()?.with_session(f)
    }
}
