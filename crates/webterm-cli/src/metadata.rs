//! Shell metadata fetch over blocking HTTP.

use reqwest::blocking::Client;
use tracing::debug;
use webterm_core::{ServerOrigin, ShellInfo, WebTermError};

use crate::config::ClientConfig;
use crate::error::Result;

pub fn build_client(config: &ClientConfig) -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()?;
    Ok(client)
}

/// `GET /api/shell-info` and decode the payload.
///
/// Every failure (connect, non-2xx status, bad body) is reported as a
/// [`WebTermError`] so the session can fall back to the default shell.
pub fn fetch_shell_info(client: &Client, origin: &ServerOrigin) -> webterm_core::Result<ShellInfo> {
    let url = origin.shell_info_url();
    debug!(%url, "fetching shell metadata");

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|error| WebTermError::request(error.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WebTermError::request(format!("{url} returned {status}")));
    }

    let body = response
        .text()
        .map_err(|error| WebTermError::request(error.to_string()))?;
    ShellInfo::from_json(&body)
}
