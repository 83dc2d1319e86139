//! Server origin and the two endpoints derived from it.

use std::fmt;

use crate::error::{Result, WebTermError};

/// Path of the terminal WebSocket endpoint.
pub const TERMINAL_PATH: &str = "/ws";

/// Path of the shell metadata endpoint.
pub const SHELL_INFO_PATH: &str = "/api/shell-info";

/// Where the terminal server lives.
///
/// `secure` selects `https`/`wss`, matching the page's own transport security.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOrigin {
    pub secure: bool,
    pub authority: String,
}

impl ServerOrigin {
    /// Build from a browser location's `protocol` (`"https:"`) and `host`.
    pub fn from_location(protocol: &str, host: &str) -> Result<Self> {
        let secure = protocol.trim_end_matches(':').eq_ignore_ascii_case("https");
        Self::checked(host, secure, host)
    }

    /// Parse a server URL such as `http://127.0.0.1:3000` or `wss://host/ws`.
    ///
    /// A bare `host:port` is taken as plain HTTP. Any path is discarded.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        let (secure, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) => {
                let secure = match scheme.to_ascii_lowercase().as_str() {
                    "http" | "ws" => false,
                    "https" | "wss" => true,
                    _ => {
                        return Err(WebTermError::InvalidOrigin {
                            origin: url.to_owned(),
                            reason: "unsupported scheme",
                        });
                    }
                };
                (secure, rest)
            }
            None => (false, trimmed),
        };
        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        Self::checked(url, secure, authority)
    }

    fn checked(origin: &str, secure: bool, authority: &str) -> Result<Self> {
        let authority = authority.trim();
        if authority.is_empty() {
            return Err(WebTermError::InvalidOrigin {
                origin: origin.to_owned(),
                reason: "missing host",
            });
        }
        if authority.contains(char::is_whitespace) {
            return Err(WebTermError::InvalidOrigin {
                origin: origin.to_owned(),
                reason: "host contains whitespace",
            });
        }
        Ok(Self {
            secure,
            authority: authority.to_owned(),
        })
    }

    /// `ws://host/ws`, or `wss://` for a secure origin.
    #[must_use]
    pub fn terminal_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}{TERMINAL_PATH}", self.authority)
    }

    /// `http://host/api/shell-info`, or `https://` for a secure origin.
    #[must_use]
    pub fn shell_info_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}{SHELL_INFO_PATH}", self.authority)
    }
}

impl fmt::Display for ServerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "https" } else { "http" };
        write!(f, "{scheme}://{}", self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insecure_location_uses_ws() {
        let origin = ServerOrigin::from_location("http:", "localhost:3000").expect("origin");
        assert_eq!(origin.terminal_url(), "ws://localhost:3000/ws");
        assert_eq!(
            origin.shell_info_url(),
            "http://localhost:3000/api/shell-info"
        );
    }

    #[test]
    fn secure_location_uses_wss() {
        let origin = ServerOrigin::from_location("https:", "term.example.com").expect("origin");
        assert!(origin.secure);
        assert_eq!(origin.terminal_url(), "wss://term.example.com/ws");
        assert_eq!(
            origin.shell_info_url(),
            "https://term.example.com/api/shell-info"
        );
    }

    #[test]
    fn file_location_has_no_host() {
        let error = ServerOrigin::from_location("file:", "").expect_err("no host");
        assert!(matches!(
            error,
            WebTermError::InvalidOrigin {
                reason: "missing host",
                ..
            }
        ));
    }

    #[test]
    fn parse_accepts_http_and_ws_schemes() {
        for url in ["http://127.0.0.1:3000", "ws://127.0.0.1:3000/ws"] {
            let origin = ServerOrigin::parse(url).expect("parse");
            assert!(!origin.secure);
            assert_eq!(origin.authority, "127.0.0.1:3000");
        }
        for url in ["https://host", "WSS://host/ws?token=1"] {
            let origin = ServerOrigin::parse(url).expect("parse");
            assert!(origin.secure);
            assert_eq!(origin.authority, "host");
        }
    }

    #[test]
    fn parse_bare_authority_is_plain_http() {
        let origin = ServerOrigin::parse("localhost:3000").expect("parse");
        assert!(!origin.secure);
        assert_eq!(origin.to_string(), "http://localhost:3000");
    }

    #[test]
    fn parse_rejects_unknown_scheme_and_empty_host() {
        assert!(matches!(
            ServerOrigin::parse("ftp://host").expect_err("scheme"),
            WebTermError::InvalidOrigin {
                reason: "unsupported scheme",
                ..
            }
        ));
        assert!(ServerOrigin::parse("http:///ws").is_err());
        assert!(ServerOrigin::parse("   ").is_err());
    }
}
