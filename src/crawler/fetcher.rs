//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients, one per route (direct or through a proxy)
//! - Bounded retries with linear backoff
//! - Error classification for logging

use crate::crawler::retry::RetryPolicy;
use crate::{ConfigError, HarvestError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Proxy, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// One logical request, retried as a unit
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Target URL, without query string
    pub url: String,

    /// Query parameters, in order
    pub query: Vec<(String, String)>,

    /// Extra request headers
    pub headers: HeaderMap,

    /// Proxy URL to route through, `None` for a direct connection
    pub proxy: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn proxy(mut self, proxy: Option<&str>) -> Self {
        self.proxy = proxy.map(str::to_string);
        self
    }
}

/// Why a single attempt failed
#[derive(Debug)]
pub enum AttemptError {
    /// Connection-level failure (DNS, refused, reset, timeout, body read)
    Transport(reqwest::Error),

    /// The server answered with something other than 200 OK
    HttpStatus(StatusCode),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) if e.is_timeout() => write!(f, "request timeout: {}", e),
            Self::Transport(e) if e.is_connect() => write!(f, "connection failed: {}", e),
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::HttpStatus(status) => write!(f, "HTTP {}", status),
        }
    }
}

/// Builds an HTTP client, optionally routed through a proxy
pub fn build_http_client(proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Executes requests with bounded retries
///
/// Every request is attempted up to `max_attempts` times. Transport errors
/// and non-200 responses are retried after a linearly growing pause; the
/// first 200 response wins. No state carries over between calls.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    direct: Client,
    proxied: HashMap<String, Client>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Creates a fetcher with one pre-built client per proxy
    pub fn new(policy: RetryPolicy, proxies: &[String]) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(None)?;
        let proxied = proxies
            .iter()
            .map(|proxy| Ok((proxy.clone(), build_http_client(Some(proxy))?)))
            .collect::<Result<HashMap<_, _>, reqwest::Error>>()?;

        Ok(Self {
            direct,
            proxied,
            policy,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a plain GET without query, headers, or proxy
    pub async fn fetch_url(&self, url: &str) -> Result<String, HarvestError> {
        self.fetch(&FetchRequest::get(url)).await
    }

    /// Fetches the response body of `request`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body of the first 200 response
    /// * `Err(HarvestError::Fetch)` - Every attempt failed
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String, HarvestError> {
        let client = self.client_for(request.proxy.as_deref())?;
        let max_attempts = self.policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            match send_once(&client, request).await {
                Ok(body) => {
                    if attempt > 0 {
                        tracing::debug!("Fetched {} on attempt {}", request.url, attempt + 1);
                    }
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        max_attempts,
                        request.url,
                        e
                    );
                    last_error = e.to_string();

                    if self.policy.allows_retry_after(attempt) {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(
            "Completely failed to fetch {} after {} attempt(s)",
            request.url,
            max_attempts
        );

        Err(HarvestError::Fetch {
            url: request.url.clone(),
            attempts: max_attempts,
            last_error,
        })
    }

    fn client_for(&self, proxy: Option<&str>) -> Result<Client, HarvestError> {
        match proxy {
            None => Ok(self.direct.clone()),
            Some(proxy) => self.proxied.get(proxy).cloned().ok_or_else(|| {
                ConfigError::Validation(format!("proxy {proxy} is not configured")).into()
            }),
        }
    }
}

async fn send_once(client: &Client, request: &FetchRequest) -> Result<String, AttemptError> {
    let response = client
        .get(&request.url)
        .query(&request.query)
        .headers(request.headers.clone())
        .send()
        .await
        .map_err(AttemptError::Transport)?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(AttemptError::HttpStatus(status));
    }

    response.text().await.map_err(AttemptError::Transport)
}
