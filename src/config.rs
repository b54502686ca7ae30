use std::env;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr, eyre};
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/";
pub const DEFAULT_NOTICE_DELAY: Duration = Duration::from_millis(1000);

const HISTORY_FILE: &str = ".talentscout_history";

/// Runtime settings for the chat client.
///
/// Values come from command line flags first, then the environment
/// (including a `.env` file loaded in `main`), then built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hiring assistant server. Always ends in `/`.
    pub server_url: Url,
    /// How long to wait before telling the user to reset an ended conversation.
    pub end_notice_delay: Duration,
    /// Where the line editor keeps its history, if a home directory exists.
    pub history_path: Option<PathBuf>,
}

impl Config {
    pub fn load(server_override: Option<String>) -> Result<Self> {
        let server = server_override
            .or_else(|| env::var("TALENTSCOUT_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let end_notice_delay = match env::var("TALENTSCOUT_NOTICE_DELAY_MS") {
            Ok(raw) => parse_delay(&raw)?,
            Err(_) => DEFAULT_NOTICE_DELAY,
        };

        Ok(Self {
            server_url: parse_server_url(&server)?,
            end_notice_delay,
            history_path: dirs::home_dir().map(|home| home.join(HISTORY_FILE)),
        })
    }
}

/// Parse a server base URL, forcing a trailing slash so endpoint
/// names join as children instead of replacing the last segment.
pub fn parse_server_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .wrap_err_with(|| format!("Invalid server URL: {}", raw))?;

    if url.cannot_be_a_base() {
        return Err(eyre!("Server URL cannot be used as a base: {}", raw));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn parse_delay(raw: &str) -> Result<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .wrap_err_with(|| format!("TALENTSCOUT_NOTICE_DELAY_MS must be a number of milliseconds, got {:?}", raw))?;
    Ok(Duration::from_millis(millis))
}
