use std::path::Path;

use crate::error::Result;

use super::cookies;

/// Authenticated session state for one batch run.
///
/// Immutable apart from the CSRF token slot, which the request executor fills
/// at most once per run and reuses for every later request. The token is never
/// refreshed: if the portal invalidates it mid-run, subsequent requests fail
/// and surface as per-row errors.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Value for the `Cookie:` header, assembled from the exported jar
    cookie_header: String,

    /// Browser user agent presented on every request
    user_agent: String,

    /// Portal origin, e.g. `https://berkeley.zoom.us`
    origin: String,

    /// Cached CSRF token, populated by the first token-requiring request
    csrf_token: Option<String>,
}

impl SessionContext {
    /// Builds a session from an exported Netscape cookie jar.
    pub fn from_cookie_file(path: &Path, user_agent: String, origin: String) -> Result<Self> {
        let cookie_header = cookies::cookie_header_from_file(path)?;
        Ok(Self {
            cookie_header,
            user_agent,
            origin: origin.trim_end_matches('/').to_string(),
            csrf_token: None,
        })
    }

    /// Builds a session from an already-assembled cookie header value.
    pub fn from_cookie_header(cookie_header: String, user_agent: String, origin: String) -> Self {
        Self {
            cookie_header,
            user_agent,
            origin: origin.trim_end_matches('/').to_string(),
            csrf_token: None,
        }
    }

    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Caches the CSRF token for the remainder of the run.
    pub fn cache_csrf_token(&mut self, token: String) {
        self.csrf_token = Some(token);
    }
}
