//! Thin blocking HTTP client shared by the gene and guide-catalog
//! lookups: default headers, 429 backoff, JSON and plain-text GETs.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::ResolveError;

const MAX_ATTEMPTS: u32 = 3;

pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ResolveError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(ua) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn get_json(&self, path: &str) -> Result<serde_json::Value, ResolveError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.send_with_retry(&url, "application/json")?;
        Ok(response.json()?)
    }

    pub fn get_text(&self, path: &str) -> Result<String, ResolveError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.send_with_retry(&url, "text/plain")?;
        Ok(response.text()?)
    }

    fn send_with_retry(&self, url: &str, accept: &str) -> Result<Response, ResolveError> {
        let mut attempts = 0;
        loop {
            let response = self.client.get(url).header(ACCEPT, accept).send()?;

            if response.status().is_success() {
                return Ok(response);
            }

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;
                if attempts >= MAX_ATTEMPTS {
                    return Err(ResolveError::RateLimited(attempts));
                }
                let wait = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                log::warn!("rate limited by {url}, retrying in {wait}s");
                thread::sleep(Duration::from_secs(wait));
                continue;
            }

            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(ResolveError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
    }
}
