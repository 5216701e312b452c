//! Header and proxy rotation for listing requests

use crate::config::{EndpointConfig, RequestConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin over the configured User-Agent and proxy pools
#[derive(Debug)]
pub struct RequestRotation {
    base_headers: HeaderMap,
    user_agents: Vec<HeaderValue>,
    proxies: Vec<String>,
    next_agent: AtomicUsize,
    next_proxy: AtomicUsize,
}

impl RequestRotation {
    pub fn new(request: &RequestConfig, endpoints: &EndpointConfig) -> Self {
        let mut base_headers = HeaderMap::new();
        base_headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        base_headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("cors"),
        );
        base_headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-origin"),
        );
        if let Ok(referer) = HeaderValue::from_str(&endpoints.referer) {
            base_headers.insert(REFERER, referer);
        }

        let user_agents = request
            .user_agents
            .iter()
            .filter_map(|agent| match HeaderValue::from_str(agent) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Skipping invalid user agent {:?}", agent);
                    None
                }
            })
            .collect();

        Self {
            base_headers,
            user_agents,
            proxies: request.proxies.clone(),
            next_agent: AtomicUsize::new(0),
            next_proxy: AtomicUsize::new(0),
        }
    }

    /// Header set for the next listing request
    pub fn next_headers(&self) -> HeaderMap {
        let mut headers = self.base_headers.clone();
        if !self.user_agents.is_empty() {
            let slot = self.next_agent.fetch_add(1, Ordering::Relaxed) % self.user_agents.len();
            headers.insert(USER_AGENT, self.user_agents[slot].clone());
        }
        headers
    }

    /// Proxy for the next listing request, or `None` for a direct connection
    pub fn next_proxy(&self) -> Option<&str> {
        if self.proxies.is_empty() {
            return None;
        }
        let slot = self.next_proxy.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
        Some(self.proxies[slot].as_str())
    }
}
