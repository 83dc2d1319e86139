//! Shell metadata published by the server at `/api/shell-info`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WebTermError};

/// Shell used when the metadata endpoint is unreachable or malformed.
pub const DEFAULT_SHELL: &str = "bash";

/// Arguments paired with [`DEFAULT_SHELL`].
pub const DEFAULT_SHELL_ARGS: [&str; 1] = ["-i"];

/// Description of the shell the server runs behind the terminal socket.
///
/// Wire shape: `{"shell": "bash", "args": ["-i"], "full_command": "bash -i"}`.
/// `args` and `full_command` are optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellInfo {
    pub shell: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub full_command: String,
}

impl ShellInfo {
    /// Build a description, deriving `full_command` from the parts.
    #[must_use]
    pub fn new(shell: impl Into<String>, args: Vec<String>) -> Self {
        let shell = shell.into();
        let full_command = join_command(&shell, &args);
        Self {
            shell,
            args,
            full_command,
        }
    }

    /// Decode a metadata payload.
    ///
    /// A blank `full_command` is re-derived; a blank `shell` is rejected.
    pub fn from_json(payload: &str) -> Result<Self> {
        let mut info: Self = serde_json::from_str(payload)?;
        info.shell = info.shell.trim().to_owned();
        if info.shell.is_empty() {
            return Err(WebTermError::EmptyShell);
        }
        if info.full_command.trim().is_empty() {
            info.full_command = join_command(&info.shell, &info.args);
        }
        Ok(info)
    }

    /// Human-readable command line, used as the terminal title.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.full_command
    }
}

impl Default for ShellInfo {
    fn default() -> Self {
        Self::new(
            DEFAULT_SHELL,
            DEFAULT_SHELL_ARGS.iter().map(|arg| (*arg).to_owned()).collect(),
        )
    }
}

fn join_command(shell: &str, args: &[String]) -> String {
    if args.is_empty() {
        return shell.to_owned();
    }
    format!("{shell} {}", args.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_interactive_bash() {
        let info = ShellInfo::default();
        assert_eq!(info.shell, "bash");
        assert_eq!(info.args, vec!["-i".to_string()]);
        assert_eq!(info.command_line(), "bash -i");
    }

    #[test]
    fn from_json_accepts_full_payload() {
        let info = ShellInfo::from_json(
            r#"{"shell":"zsh","args":["-i","-l"],"full_command":"zsh -i -l"}"#,
        )
        .expect("valid payload");
        assert_eq!(info, ShellInfo::new("zsh", vec!["-i".into(), "-l".into()]));
    }

    #[test]
    fn from_json_derives_missing_full_command() {
        let info = ShellInfo::from_json(r#"{"shell":"fish","args":["-i"]}"#).expect("parse");
        assert_eq!(info.full_command, "fish -i");
    }

    #[test]
    fn from_json_without_args_has_bare_command() {
        let info = ShellInfo::from_json(r#"{"shell":"claude"}"#).expect("parse");
        assert!(info.args.is_empty());
        assert_eq!(info.full_command, "claude");
    }

    #[test]
    fn from_json_keeps_server_full_command() {
        // The server formats `"{cmd} {args}"`, which leaves a trailing space
        // when there are no args; it is shown as sent.
        let info = ShellInfo::from_json(r#"{"shell":"sh","args":[],"full_command":"sh "}"#)
            .expect("parse");
        assert_eq!(info.full_command, "sh ");
    }

    #[test]
    fn from_json_rejects_blank_shell() {
        let error = ShellInfo::from_json(r#"{"shell":"  ","args":[]}"#).expect_err("blank");
        assert!(matches!(error, WebTermError::EmptyShell));
    }

    #[test]
    fn from_json_rejects_wrong_shape() {
        let error = ShellInfo::from_json(r#"{"shell":42}"#).expect_err("wrong type");
        assert!(matches!(error, WebTermError::ShellInfoDecode(_)));
        let error = ShellInfo::from_json("<html>").expect_err("not json");
        assert!(matches!(error, WebTermError::ShellInfoDecode(_)));
    }
}
