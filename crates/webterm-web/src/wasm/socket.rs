//! Browser `WebSocket` transport.
//!
//! Each socket gets its own set of handlers tagged with the generation it was
//! opened for. Handlers are detached before the socket is closed, and dropped
//! on a later microtask since one of them may be the code currently running.

use std::rc::Weak;

use js_sys::{ArrayBuffer, Uint8Array};
use tracing::{debug, trace};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};
use webterm_core::{Generation, Result, SessionEvent, Transport, WebTermError};

use super::dom::describe_js;
use super::{WebPump, forward};

struct SocketHandlers {
    on_open: Closure<dyn FnMut(Event)>,
    on_message: Closure<dyn FnMut(MessageEvent)>,
    on_error: Closure<dyn FnMut(Event)>,
    on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl SocketHandlers {
    fn new(pump: &Weak<WebPump>, generation: Generation) -> Self {
        let opened = pump.clone();
        let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            forward(&opened, SessionEvent::TransportOpened { generation });
        });

        let messages = pump.clone();
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match message_bytes(&event.data()) {
                Some(data) => forward(&messages, SessionEvent::TransportMessage { generation, data }),
                None => debug!(%generation, "ignoring non-text, non-binary message"),
            }
        });

        let errors = pump.clone();
        let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            forward(
                &errors,
                SessionEvent::TransportError {
                    generation,
                    message: String::from("websocket error"),
                },
            );
        });

        let closes = pump.clone();
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            forward(
                &closes,
                SessionEvent::TransportClosed {
                    generation,
                    code: Some(event.code()),
                    reason: event.reason(),
                },
            );
        });

        Self {
            on_open,
            on_message,
            on_error,
            on_close,
        }
    }

    fn attach(&self, socket: &WebSocket) {
        socket.set_onopen(Some(self.on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(self.on_message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(self.on_error.as_ref().unchecked_ref()));
        socket.set_onclose(Some(self.on_close.as_ref().unchecked_ref()));
    }

    fn detach(socket: &WebSocket) {
        socket.set_onopen(None);
        socket.set_onmessage(None);
        socket.set_onerror(None);
        socket.set_onclose(None);
    }

    fn retire(self) {
        wasm_bindgen_futures::spawn_local(async move {
            drop(self);
        });
    }
}

/// Text frames arrive as strings, binary ones as `ArrayBuffer`.
fn message_bytes(data: &JsValue) -> Option<Vec<u8>> {
    if let Some(text) = data.as_string() {
        return Some(text.into_bytes());
    }
    data.dyn_ref::<ArrayBuffer>()
        .map(|buffer| Uint8Array::new(buffer).to_vec())
}

struct ActiveSocket {
    socket: WebSocket,
    handlers: SocketHandlers,
    generation: Generation,
}

pub struct WebSocketTransport {
    pump: Weak<WebPump>,
    active: Option<ActiveSocket>,
}

impl WebSocketTransport {
    pub fn new(pump: Weak<WebPump>) -> Self {
        Self { pump, active: None }
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, url: &str, generation: Generation) -> Result<()> {
        self.close();
        let socket =
            WebSocket::new(url).map_err(|err| WebTermError::transport_open(describe_js(&err)))?;
        socket.set_binary_type(BinaryType::Arraybuffer);

        let handlers = SocketHandlers::new(&self.pump, generation);
        handlers.attach(&socket);
        debug!(%url, %generation, "websocket created");
        self.active = Some(ActiveSocket {
            socket,
            handlers,
            generation,
        });
        Ok(())
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(active) = &self.active else {
            return Err(WebTermError::NotConnected);
        };
        if active.socket.ready_state() != WebSocket::OPEN {
            return Err(WebTermError::NotConnected);
        }
        // The server reads text frames only.
        active
            .socket
            .send_with_str(&String::from_utf8_lossy(bytes))
            .map_err(|err| WebTermError::transport_send(describe_js(&err)))
    }

    fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        SocketHandlers::detach(&active.socket);
        if let Err(err) = active.socket.close() {
            trace!(error = %describe_js(&err), "websocket close raised");
        }
        debug!(generation = %active.generation, "websocket closed");
        active.handlers.retire();
    }
}
