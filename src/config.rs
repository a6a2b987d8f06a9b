use std::env;

use log::{debug, error, info};
use url::Url;

use crate::error::{BotError, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_SEARCH_API_URL: &str = "https://api.duckduckgo.com";
const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Checked on every request; a missing token answers 500 instead of stopping the process.
    pub telegram_token: Option<String>,
    /// Without it the bot runs in basic mode.
    pub openai_api_key: Option<String>,
    pub bind_addr: String,
    pub telegram_api_url: Url,
    pub search_api_url: Url,
    pub openai_api_url: Url,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let telegram_token = optional_var("TELEGRAM_BOT_TOKEN");
        let openai_api_key = optional_var("OPENAI_API_KEY");
        let bind_addr = optional_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let telegram_api_url = url_var("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL)?;
        let search_api_url = url_var("SEARCH_API_URL", DEFAULT_SEARCH_API_URL)?;
        let openai_api_url = url_var("OPENAI_API_URL", DEFAULT_OPENAI_API_URL)?;

        info!("Configuration loaded successfully");
        match &telegram_token {
            Some(token) => debug!("Telegram token length: {} characters", token.len()),
            None => error!("TELEGRAM_BOT_TOKEN is not set, webhook requests will be rejected"),
        }
        match &openai_api_key {
            Some(key) => debug!("OpenAI API key length: {} characters", key.len()),
            None => info!("OPENAI_API_KEY is not set, running in basic mode"),
        }
        debug!("Bind address: {bind_addr}");
        debug!("Telegram API: {telegram_api_url}");
        debug!("Search API: {search_api_url}");
        debug!("OpenAI API: {openai_api_url}");

        Ok(Self {
            telegram_token,
            openai_api_key,
            bind_addr,
            telegram_api_url,
            search_api_url,
            openai_api_url,
        })
    }

    /// The messaging token, if one is configured and non-empty.
    pub fn telegram_token(&self) -> Option<&str> {
        self.telegram_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Joins a provider base URL and an endpoint path, keeping any path prefix of the base.
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn url_var(name: &str, default: &str) -> Result<Url> {
    let raw = optional_var(name).unwrap_or_else(|| default.to_string());
    parse_base_url(name, &raw)
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        error!("Failed to parse {name} as a URL: {e}");
        e
    })?;

    if url.cannot_be_a_base() {
        return Err(BotError::Config(format!("{name} is not a base URL: {raw}")));
    }

    Ok(url)
}

#[cfg(test)]
impl Config {
    /// Configuration pointing at unroutable providers, for unit tests.
    pub fn for_tests(telegram_token: Option<&str>, openai_api_key: Option<&str>) -> Self {
        let local = |port: u16| {
            Url::parse(&format!("http://127.0.0.1:{port}")).expect("static test url")
        };
        Self {
            telegram_token: telegram_token.map(str::to_string),
            openai_api_key: openai_api_key.map(str::to_string),
            bind_addr: "127.0.0.1:0".to_string(),
            telegram_api_url: local(9),
            search_api_url: local(9),
            openai_api_url: local(9),
        }
    }
}
