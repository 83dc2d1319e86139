//! Browser host for webterm.
//!
//! [`WebTerm`] wires a [`webterm_core::SessionController`] to xterm.js, the
//! browser `WebSocket`, the page's controls and `localStorage`. The DOM-free
//! pieces (key classification, control selectors, the event pump) are plain
//! Rust and tested natively; the bindings are only compiled on `wasm32`.

pub mod controls;
pub mod keys;
pub mod pump;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::WebTerm;
