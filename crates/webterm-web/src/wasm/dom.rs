use js_sys::Error as JsError;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, Response, Storage, Window};
use webterm_core::{
    ConnectionState, PreferenceStore, Result, SessionChrome, ShellInfo, THEME_STORAGE_KEY,
    WebTermError, WindowMode,
};

use crate::controls::{
    RECONNECT_DIALOG_SELECTOR, STATUS_SELECTOR, WINDOW_FRAME_SELECTOR, WINDOW_MODE_CLASSES,
    status_class, window_mode_class,
};

/// Best-effort text for a thrown JS value.
pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<JsError>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

pub fn query(document: &Document, selector: &str) -> Option<Element> {
    let found = document.query_selector(selector).ok().flatten();
    if found.is_none() {
        debug!(selector, "element not found");
    }
    found
}

pub struct DomChrome {
    status: Option<Element>,
    dialog: Option<HtmlElement>,
    frame: Option<Element>,
}

impl DomChrome {
    pub fn new(document: &Document) -> Self {
        Self {
            status: query(document, STATUS_SELECTOR),
            dialog: query(document, RECONNECT_DIALOG_SELECTOR)
                .and_then(|element| element.dyn_into::<HtmlElement>().ok()),
            frame: query(document, WINDOW_FRAME_SELECTOR),
        }
    }
}

impl SessionChrome for DomChrome {
    fn show_status(&mut self, state: ConnectionState) {
        if let Some(status) = &self.status {
            status.set_text_content(Some(state.label()));
            status.set_class_name(&status_class(state));
        }
    }

    fn show_reconnect_prompt(&mut self) {
        if let Some(dialog) = &self.dialog {
            dialog.set_hidden(false);
        }
    }

    fn hide_reconnect_prompt(&mut self) {
        if let Some(dialog) = &self.dialog {
            dialog.set_hidden(true);
        }
    }

    fn set_window_mode(&mut self, mode: WindowMode) {
        let Some(frame) = &self.frame else {
            return;
        };
        let classes = frame.class_list();
        for class in WINDOW_MODE_CLASSES {
            let _ = classes.remove_1(class);
        }
        if let Some(class) = window_mode_class(mode) {
            let _ = classes.add_1(class);
        }
    }
}

/// Theme preference in `localStorage`.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new(window: &Window) -> Self {
        // Throws in some privacy modes; the session then runs without persistence.
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            debug!("localStorage unavailable");
        }
        Self { storage }
    }
}

impl PreferenceStore for LocalStorageStore {
    fn load_theme(&self) -> Option<String> {
        self.storage
            .as_ref()?
            .get_item(THEME_STORAGE_KEY)
            .ok()
            .flatten()
    }

    fn save_theme(&mut self, name: &str) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Err(WebTermError::preference("localStorage unavailable"));
        };
        storage
            .set_item(THEME_STORAGE_KEY, name)
            .map_err(|err| WebTermError::preference(describe_js(&err)))
    }
}

/// `GET` the shell description.
pub async fn fetch_shell_info(window: Window, url: String) -> Result<ShellInfo> {
    let request_error = |err: JsValue| WebTermError::request(describe_js(&err));

    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(request_error)?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| WebTermError::request("fetch did not yield a Response"))?;
    if !response.ok() {
        return Err(WebTermError::request(format!(
            "{url} answered HTTP {}",
            response.status()
        )));
    }
    let body = JsFuture::from(response.text().map_err(request_error)?)
        .await
        .map_err(request_error)?;
    let body = body
        .as_string()
        .ok_or_else(|| WebTermError::request("response body is not text"))?;
    ShellInfo::from_json(&body)
}
