#![forbid(unsafe_code)]

//! DOM surface the browser host binds to.
//!
//! The page is expected to provide these elements; missing ones are skipped
//! with a debug log rather than treated as errors.

use webterm_core::{ConnectionState, WindowAction, WindowMode};

pub const STATUS_SELECTOR: &str = "#status";
pub const RECONNECT_DIALOG_SELECTOR: &str = "#reconnect-dialog";
pub const RECONNECT_BUTTON_SELECTOR: &str = "#reconnect-btn";
pub const THEME_BUTTON_SELECTOR: &str = "[data-theme]";
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const WINDOW_FRAME_SELECTOR: &str = ".terminal-window";

/// Window buttons and the action each one raises.
pub const WINDOW_BUTTONS: [(&str, WindowAction); 3] = [
    (".btn-close", WindowAction::Close),
    (".btn-minimize", WindowAction::Minimize),
    (".btn-maximize", WindowAction::Maximize),
];

/// Class list for the status badge, e.g. `status status-open`.
#[must_use]
pub fn status_class(state: ConnectionState) -> String {
    format!("status status-{}", state.as_str())
}

/// Modifier class toggled on the window frame; `None` for the normal layout.
#[must_use]
pub const fn window_mode_class(mode: WindowMode) -> Option<&'static str> {
    match mode {
        WindowMode::Normal => None,
        WindowMode::Minimized => Some("minimized"),
        WindowMode::Maximized => Some("maximized"),
    }
}

/// Every class [`window_mode_class`] can return.
pub const WINDOW_MODE_CLASSES: [&str; 2] = ["minimized", "maximized"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_follow_state() {
        assert_eq!(status_class(ConnectionState::Open), "status status-open");
        assert_eq!(
            status_class(ConnectionState::Closed),
            "status status-closed"
        );
    }

    #[test]
    fn window_mode_classes_are_known() {
        for mode in [WindowMode::Normal, WindowMode::Minimized, WindowMode::Maximized] {
            if let Some(class) = window_mode_class(mode) {
                assert!(WINDOW_MODE_CLASSES.contains(&class));
            }
        }
        assert_eq!(window_mode_class(WindowMode::Normal), None);
    }

    #[test]
    fn each_window_action_has_one_button() {
        for action in [WindowAction::Close, WindowAction::Minimize, WindowAction::Maximize] {
            let count = WINDOW_BUTTONS.iter().filter(|(_, a)| *a == action).count();
            assert_eq!(count, 1, "{action:?}");
        }
    }
}
