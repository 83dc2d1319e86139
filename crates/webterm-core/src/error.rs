use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebTermError>;

/// Errors surfaced by the session controller and its collaborators.
///
/// None of these are fatal to a running session: the controller logs them and
/// degrades (default shell, Closed state, unsaved preference).
#[derive(Debug, Error)]
pub enum WebTermError {
    #[error("invalid server origin `{origin}`: {reason}")]
    InvalidOrigin {
        origin: String,
        reason: &'static str,
    },

    #[error("shell metadata request failed: {0}")]
    ShellInfoRequest(String),

    #[error("shell metadata has unexpected shape: {0}")]
    ShellInfoDecode(#[from] serde_json::Error),

    #[error("shell metadata names no shell")]
    EmptyShell,

    #[error("transport failed to open: {0}")]
    TransportOpen(String),

    #[error("transport send failed: {0}")]
    TransportSend(String),

    #[error("transport is not connected")]
    NotConnected,

    #[error("preference storage unavailable: {0}")]
    Preference(String),
}

impl WebTermError {
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::ShellInfoRequest(message.into())
    }

    #[must_use]
    pub fn transport_open(message: impl Into<String>) -> Self {
        Self::TransportOpen(message.into())
    }

    #[must_use]
    pub fn transport_send(message: impl Into<String>) -> Self {
        Self::TransportSend(message.into())
    }

    #[must_use]
    pub fn preference(message: impl Into<String>) -> Self {
        Self::Preference(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::WebTermError;

    #[test]
    fn invalid_origin_message_names_origin_and_reason() {
        let error = WebTermError::InvalidOrigin {
            origin: "ftp://x".to_string(),
            reason: "unsupported scheme",
        };
        assert_eq!(
            error.to_string(),
            "invalid server origin `ftp://x`: unsupported scheme"
        );
    }

    #[test]
    fn decode_error_converts_from_serde_json() {
        let raw = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json");
        let error: WebTermError = raw.into();
        assert!(matches!(error, WebTermError::ShellInfoDecode(_)));
        assert!(error.to_string().starts_with("shell metadata has unexpected shape"));
    }

    #[test]
    fn constructors_wrap_messages() {
        assert_eq!(
            WebTermError::transport_open("refused").to_string(),
            "transport failed to open: refused"
        );
        assert_eq!(
            WebTermError::preference("quota").to_string(),
            "preference storage unavailable: quota"
        );
    }
}
