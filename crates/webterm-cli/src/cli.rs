use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use webterm_core::ShellInfo;

use crate::config::{
    CONFIG_DIR_ENV, ClientConfig, DEFAULT_POLL_MS, DEFAULT_SERVER, SERVER_ENV, resolve_config_dir,
};
use crate::error::{CliError, Result};
use crate::logging::init_logging;
use crate::metadata::{build_client, fetch_shell_info};
use crate::prefs::FilePreferenceStore;
use crate::runner::{run_session, write_themes};

#[derive(Debug, Parser)]
#[command(
    name = "webterm",
    about = "Terminal client for webterm servers",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Server origin, e.g. http://127.0.0.1:3000 or wss://host.
    #[arg(long, global = true, env = SERVER_ENV, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Directory holding the theme preference.
    #[arg(long = "config-dir", global = true, env = CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long = "log-level", global = true, default_value = "warn")]
    pub log_level: String,

    /// Log file; `connect` defaults to `webterm.log` in the config directory.
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open an interactive session.
    Connect(ConnectArgs),

    /// Print the server's shell description.
    Info(InfoArgs),

    /// List themes; the stored one is marked with `*`.
    Themes,
}

#[derive(Debug, Clone, Args)]
pub struct ConnectArgs {
    /// Select (and store) a theme before connecting.
    #[arg(long)]
    pub theme: Option<String>,

    /// Key poll interval in milliseconds.
    #[arg(long = "poll-ms", default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct InfoArgs {
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    server: String,
    #[serde(flatten)]
    shell: &'a ShellInfo,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

/// Raw mode owns the terminal during a session, so its logs always go to a
/// file: `--log-file` when given, else `webterm.log` in the config directory.
fn session_log_file(explicit: Option<&Path>, config: &ClientConfig) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    fs::create_dir_all(&config.config_dir).map_err(|source| CliError::LogFile {
        path: config.log_file(),
        source,
    })?;
    Ok(config.log_file())
}

pub fn run(cli: Cli) -> Result<()> {
    let lookup = |key: &str| std::env::var(key).ok();

    match cli.command {
        Commands::Connect(args) => {
            let config_dir = resolve_config_dir(cli.common.config_dir.as_deref(), lookup)?;
            let config =
                ClientConfig::new(&cli.common.server, config_dir)?.with_poll_ms(args.poll_ms);
            let log_file = session_log_file(cli.common.log_file.as_deref(), &config)?;
            init_logging(&cli.common.log_level, Some(&log_file))?;
            run_session(&config, args.theme.as_deref())
        }
        Commands::Info(args) => {
            init_logging(&cli.common.log_level, cli.common.log_file.as_deref())?;
            // The preference directory is irrelevant here.
            let config = ClientConfig::new(&cli.common.server, PathBuf::new())?;
            let client = build_client(&config)?;
            let shell = fetch_shell_info(&client, &config.origin)?;
            print_info(&mut io::stdout().lock(), &config, &shell, args.json)
        }
        Commands::Themes => {
            init_logging(&cli.common.log_level, cli.common.log_file.as_deref())?;
            let config_dir = resolve_config_dir(cli.common.config_dir.as_deref(), lookup)?;
            let store = FilePreferenceStore::new(config_dir.join("theme"));
            write_themes(&mut io::stdout().lock(), &store)
        }
    }
}

fn print_info(
    out: &mut impl Write,
    config: &ClientConfig,
    shell: &ShellInfo,
    json: bool,
) -> Result<()> {
    if json {
        let report = InfoReport {
            server: config.origin.to_string(),
            shell,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "server:  {}", config.origin)?;
        writeln!(out, "shell:   {}", shell.shell)?;
        writeln!(out, "args:    {}", shell.args.join(" "))?;
        writeln!(out, "command: {}", shell.command_line())?;
    }
    Ok(())
}
