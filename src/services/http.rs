// src/services/http.rs
use reqwest::Client;

use crate::config::Config;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One client per run: browser user agent, per-request timeout, and a cookie
/// jar for the Trends session.
pub fn build_client(config: &Config) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.http_timeout)
        .cookie_store(true)
        .build()
}
