//! Bookmarks page client
//!
//! Issues a single GET per call and classifies the answer:
//! - 2xx: the JSON body
//! - 401: the session is no longer valid
//! - 429: rate limited, with the wait the server asked for (if any)
//! - anything else: an HTTP error with a bounded body snippet

use crate::auth::Session;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Outcome of one page request that did not fail
#[derive(Debug, Clone)]
pub enum PageResponse {
    /// Parsed response body
    Page(Value),
    /// 429; `retry_after` is the server's hint when it sent a usable one
    RateLimited { retry_after: Option<Duration> },
}

/// Client for the bookmarks timeline endpoint
pub struct HttpClient {
    client: Client,
    endpoint: String,
    features: String,
    page_size: u32,
    include_promoted_content: bool,
    error_body_snippet: usize,
}

impl HttpClient {
    /// Create a client carrying the session's headers and cookies
    pub fn new(session: &Session, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: session.client()?,
            endpoint: config.endpoint(),
            features: serde_json::to_string(&config.features)?,
            page_size: config.page_size,
            include_promoted_content: config.include_promoted_content,
            error_body_snippet: config.error_body_snippet,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `variables` parameter for one page
    pub fn page_variables(&self, cursor: Option<&str>) -> Value {
        let mut variables = json!({
            "count": self.page_size,
            "includePromotedContent": self.include_promoted_content,
        });
        if let Some(cursor) = cursor {
            variables["cursor"] = Value::String(cursor.to_string());
        }
        variables
    }

    /// Request one page
    pub async fn fetch_page(&self, cursor: Option<&str>) -> Result<PageResponse> {
        let variables = self.page_variables(cursor).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("variables", variables.as_str()),
                ("features", self.features.as_str()),
            ])
            .send()
            .await
            .map_err(Error::Connection)?;

        let status = response.status();
        debug!("GET {} -> {}", self.endpoint, status.as_u16());

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::auth(
                "401 Unauthorized: the session cookies are no longer valid",
            ));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(PageResponse::RateLimited {
                retry_after: extract_retry_after(&response),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(
                status.as_u16(),
                snippet(&body, self.error_body_snippet),
            ));
        }

        let body = response.text().await.map_err(Error::Connection)?;
        let json = serde_json::from_str(&body).map_err(|e| {
            Error::malformed(format!(
                "body is not JSON ({e}): {}",
                snippet(&body, self.error_body_snippet)
            ))
        })?;

        Ok(PageResponse::Page(json))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Seconds from a numeric `retry-after` header
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// First `max_chars` characters of a body
pub(crate) fn snippet(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
