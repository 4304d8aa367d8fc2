//! Session construction
//!
//! Builds the header set and cookie jar every request carries. Pure
//! construction: no request is sent here.

use super::credentials::CredentialSet;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, REFERER, USER_AGENT,
};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Authenticated request context. Immutable after construction.
pub struct Session {
    cookies: Arc<Jar>,
    headers: HeaderMap,
    cookie_url: Url,
    timeout: Duration,
}

impl Session {
    /// Headers attached to every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `Cookie` header value the jar produces for the site
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies
            .cookies(&self.cookie_url)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Build the HTTP client carrying this session
    pub fn client(&self) -> Result<Client> {
        Client::builder()
            .cookie_provider(Arc::clone(&self.cookies))
            .default_headers(self.headers.clone())
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie_url", &self.cookie_url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Session`] from credentials and the client config
pub struct SessionBuilder<'a> {
    config: &'a ClientConfig,
}

impl<'a> SessionBuilder<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    /// Fails with `Error::Auth` when the auth token is missing or empty
    pub fn build(&self, credentials: &CredentialSet) -> Result<Session> {
        credentials.validate()?;

        let cookie_url = self.config.base()?;
        let jar = Jar::default();
        for (name, value) in credentials.iter() {
            jar.add_cookie_str(&format!("{name}={value}; Path=/"), &cookie_url);
        }

        let mut headers = HeaderMap::new();
        insert(
            &mut headers,
            AUTHORIZATION,
            &format!("Bearer {}", self.config.bearer_token),
        )?;
        insert(
            &mut headers,
            HeaderName::from_static("x-csrf-token"),
            credentials.csrf_token(),
        )?;
        insert(
            &mut headers,
            HeaderName::from_static("x-twitter-auth-type"),
            "OAuth2Session",
        )?;
        insert(
            &mut headers,
            HeaderName::from_static("x-twitter-client-language"),
            &self.config.client_language,
        )?;
        insert(
            &mut headers,
            HeaderName::from_static("x-twitter-active-user"),
            "yes",
        )?;
        insert(&mut headers, CONTENT_TYPE, "application/json")?;
        insert(&mut headers, REFERER, &self.config.referer())?;
        insert(&mut headers, USER_AGENT, &self.config.user_agent)?;

        Ok(Session {
            cookies: Arc::new(jar),
            headers,
            cookie_url,
            timeout: self.config.request_timeout(),
        })
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| Error::config(format!("Invalid value for header '{name}': {e}")))?;
    headers.insert(name, value);
    Ok(())
}
