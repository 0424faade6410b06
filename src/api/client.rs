//! Rate-limited HTTP client for the Scryfall API

use crate::api::rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};
use crate::api::scryfall::Lang;
use crate::error::{ProxyError, Result};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";
pub const DEFAULT_USER_AGENT: &str = "D2D-Automations-MtgProxy/1.0";

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Minimum spacing between two requests
    pub min_interval: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default settings against a different API root (mock servers, mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

/// Scryfall client. Every request goes through its rate limiter.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    http: reqwest::Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl ScryfallClient {
    /// Create a client with its own rate limiter
    pub fn new(config: ClientConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.min_interval));
        Self::with_limiter(config, limiter)
    }

    /// Create a client throttled by an existing (possibly shared) limiter.
    /// `config.min_interval` is ignored in favour of the limiter's own.
    pub fn with_limiter(config: ClientConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(ProxyError::HttpClient)?;

        log::debug!(
            "Created Scryfall client for {} ({:?} between requests)",
            config.base_url,
            limiter.min_interval()
        );

        Ok(Self {
            http,
            base_url: config.base_url,
            limiter,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url` and return the response body.
    ///
    /// Non-2xx statuses become [`ProxyError::BadStatus`], everything the
    /// transport reports becomes [`ProxyError::Transport`]. Nothing is retried.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.limiter
            .run(move || async move {
                log::debug!("GET {}", url);

                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|source| transport(url, source))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(ProxyError::BadStatus {
                        url: url.to_string(),
                        status,
                    });
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|source| transport(url, source))?;
                Ok(bytes.to_vec())
            })
            .await
    }

    /// URL of the fuzzy name lookup
    pub fn named_url(&self, name: &str) -> String {
        format!(
            "{}/cards/named?fuzzy={}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    /// URL of the fuzzy name lookup restricted to one set
    pub fn named_in_set_url(&self, name: &str, set_code: &str) -> String {
        format!(
            "{}/cards/named?fuzzy={}&set={}",
            self.base_url,
            urlencoding::encode(name),
            urlencoding::encode(&set_code.to_lowercase())
        )
    }

    /// URL of a single printing: `/cards/:code/:number/:lang`
    pub fn identity_url(&self, set_code: &str, collector_number: &str, lang: Lang) -> String {
        format!(
            "{}/cards/{}/{}/{}",
            self.base_url,
            urlencoding::encode(&set_code.to_lowercase()),
            urlencoding::encode(collector_number),
            lang.code()
        )
    }
}

fn transport(url: &str, source: reqwest::Error) -> ProxyError {
    ProxyError::Transport {
        url: url.to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
