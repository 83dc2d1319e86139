//! xterm.js bindings and the display built on them.
//!
//! Expects the UMD builds on the page: `window.Terminal` and, optionally,
//! `window.FitAddon.FitAddon`.

use js_sys::{Object, Reflect, Uint8Array};
use tracing::trace;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, KeyboardEvent};
use webterm_core::{TerminalDisplay, ThemePalette};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Terminal)]
    #[derive(Debug, Clone)]
    pub type XtermTerminal;

    #[wasm_bindgen(constructor, js_class = "Terminal", catch)]
    pub fn new(options: &JsValue) -> Result<XtermTerminal, JsValue>;

    #[wasm_bindgen(method)]
    pub fn open(this: &XtermTerminal, parent: &HtmlElement);

    #[wasm_bindgen(method, js_name = write)]
    pub fn write_bytes(this: &XtermTerminal, data: &Uint8Array);

    #[wasm_bindgen(method)]
    pub fn clear(this: &XtermTerminal);

    #[wasm_bindgen(method)]
    pub fn focus(this: &XtermTerminal);

    #[wasm_bindgen(method, getter)]
    pub fn options(this: &XtermTerminal) -> Object;

    #[wasm_bindgen(method, getter)]
    pub fn cols(this: &XtermTerminal) -> u16;

    #[wasm_bindgen(method, getter)]
    pub fn rows(this: &XtermTerminal) -> u16;

    #[wasm_bindgen(method, js_name = onData)]
    pub fn on_data(this: &XtermTerminal, callback: &Closure<dyn FnMut(String)>) -> JsValue;

    #[wasm_bindgen(method, js_name = onResize)]
    pub fn on_resize(this: &XtermTerminal, callback: &Closure<dyn FnMut(JsValue)>) -> JsValue;

    #[wasm_bindgen(method, js_name = attachCustomKeyEventHandler)]
    pub fn attach_custom_key_event_handler(
        this: &XtermTerminal,
        handler: &Closure<dyn FnMut(KeyboardEvent) -> bool>,
    );

    #[wasm_bindgen(method, js_name = loadAddon)]
    pub fn load_addon(this: &XtermTerminal, addon: &FitAddon);

    #[derive(Debug, Clone)]
    pub type FitAddon;

    #[wasm_bindgen(constructor, js_namespace = FitAddon, catch)]
    pub fn new() -> Result<FitAddon, JsValue>;

    #[wasm_bindgen(method)]
    pub fn fit(this: &FitAddon);
}

pub(super) fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

/// Constructor options. Line endings are normalized before writing, so
/// xterm's own `convertEol` stays off.
pub fn terminal_options() -> Object {
    let options = Object::new();
    set_js(&options, "cursorBlink", JsValue::TRUE);
    set_js(&options, "convertEol", JsValue::FALSE);
    set_js(&options, "fontSize", JsValue::from_f64(14.0));
    set_js(
        &options,
        "fontFamily",
        JsValue::from_str("Menlo, Monaco, 'Courier New', monospace"),
    );
    options
}

pub struct XtermDisplay {
    term: XtermTerminal,
    document: Document,
}

impl XtermDisplay {
    pub fn new(term: XtermTerminal, document: Document) -> Self {
        Self { term, document }
    }
}

impl TerminalDisplay for XtermDisplay {
    fn write(&mut self, bytes: &[u8]) {
        let chunk = Uint8Array::from(bytes);
        self.term.write_bytes(&chunk);
    }

    fn clear(&mut self) {
        self.term.clear();
    }

    fn apply_palette(&mut self, palette: &ThemePalette) {
        let theme = Object::new();
        set_js(&theme, "background", palette.background.to_css().into());
        set_js(&theme, "foreground", palette.foreground.to_css().into());
        set_js(&theme, "cursor", palette.cursor.to_css().into());
        set_js(&self.term.options(), "theme", theme.into());
    }

    fn set_title(&mut self, title: &str) {
        self.document.set_title(title);
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        // xterm reported the size itself; nothing to push back.
        trace!(cols, rows, "display resized");
    }

    fn focus(&mut self) {
        self.term.focus();
    }
}
