//! Credential set loaded from a browser cookie export

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Cookie carrying the session token; a run cannot start without it
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Cookie mirrored into the `x-csrf-token` header
pub const CSRF_COOKIE: &str = "ct0";

/// One entry of a cookie-editor style export. Other properties
/// (`domain`, `path`, `expirationDate`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct ExportedCookie {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CookieExport {
    List(Vec<ExportedCookie>),
    Map(BTreeMap<String, String>),
}

/// Cookie name → value, read once at startup and never mutated
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    cookies: BTreeMap<String, String>,
}

impl CredentialSet {
    /// Create a credential set from name/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse an export: either `[{"name": .., "value": ..}, ..]` or a flat object
    pub fn from_json_str(json: &str) -> Result<Self> {
        let export: CookieExport = serde_json::from_str(json)
            .map_err(|e| Error::credentials(format!("cookie export is not valid JSON: {e}")))?;

        let cookies = match export {
            CookieExport::List(list) => list.into_iter().map(|c| (c.name, c.value)).collect(),
            CookieExport::Map(map) => map,
        };

        Ok(Self { cookies })
    }

    /// Read and validate a cookie export file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::credentials(format!(
                "{} not found. Export the cookies of a logged-in x.com tab \
                 as JSON (e.g. with Cookie-Editor) and save them there",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::credentials(format!("failed to read {}: {e}", path.display()))
        })?;

        let credentials = Self::from_json_str(&content)?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Fail unless a non-empty auth token is present
    pub fn validate(&self) -> Result<()> {
        match self.auth_token() {
            Some(_) => Ok(()),
            None => Err(Error::auth(format!(
                "cookie '{AUTH_TOKEN_COOKIE}' is missing or empty; export the cookies while logged in"
            ))),
        }
    }

    /// Session token, `None` when absent or empty
    pub fn auth_token(&self) -> Option<&str> {
        self.get(AUTH_TOKEN_COOKIE).filter(|v| !v.is_empty())
    }

    /// CSRF token, empty when absent
    pub fn csrf_token(&self) -> &str {
        self.get(CSRF_COOKIE).unwrap_or("")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("cookies", &self.cookies.keys().collect::<Vec<_>>())
            .finish()
    }
}
