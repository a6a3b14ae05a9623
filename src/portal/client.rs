use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::session::SessionContext;

use super::envelope::ApiEnvelope;
use super::scrape;

/// How a request obtains its CSRF token header.
#[derive(Debug, Clone, Default)]
pub enum CsrfPolicy {
    /// No CSRF header (plain page fetches and the bootstrap itself)
    #[default]
    Skip,
    /// Use the session's cached token, bootstrapping it on first use
    FetchFresh,
    /// Use this token verbatim
    Token(String),
}

/// Per-request options layered over the session's base headers.
#[derive(Debug, Default)]
pub struct RequestOptions {
    /// Extra headers; these win over the base set on conflict
    pub headers: Vec<(String, String)>,
    /// Request body; presence forces POST and a form-encoded content type
    pub body: Option<String>,
    /// CSRF token handling for this request
    pub csrf: CsrfPolicy,
}

/// Issues requests against the portal with session headers, CSRF injection,
/// and uniform status checking.
///
/// Every operation protocol goes through here; the CSRF handshake exists
/// only in this module.
pub struct PortalClient {
    http: reqwest::Client,
    csrf_override: Option<String>,
}

impl PortalClient {
    pub fn new(csrf_override: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            csrf_override,
        })
    }

    /// Policy for endpoints that require a CSRF token: the pre-supplied
    /// override verbatim when one was configured, otherwise the session's
    /// cached token.
    pub fn csrf_policy(&self) -> CsrfPolicy {
        match &self.csrf_override {
            Some(token) => CsrfPolicy::Token(token.clone()),
            None => CsrfPolicy::FetchFresh,
        }
    }

    /// Executes one request. Any non-2xx status is fatal for the call; retry
    /// policy, if any, belongs to the caller.
    pub async fn execute(
        &self,
        path: &str,
        session: &mut SessionContext,
        options: RequestOptions,
    ) -> Result<reqwest::Response> {
        let csrf_token = match &options.csrf {
            CsrfPolicy::Skip => None,
            CsrfPolicy::Token(token) => Some(token.clone()),
            CsrfPolicy::FetchFresh => Some(self.cached_or_fetched_token(session).await?),
        };

        self.send(path, session, options.headers, options.body, csrf_token)
            .await
    }

    /// Executes a request whose response follows the portal's JSON envelope
    /// convention and returns the envelope's `result` payload.
    pub async fn execute_json(
        &self,
        path: &str,
        session: &mut SessionContext,
        options: RequestOptions,
    ) -> Result<serde_json::Value> {
        let response = self.execute(path, session, options).await?;
        let body = response.text().await?;
        ApiEnvelope::parse(&body)?.into_result()
    }

    /// Returns the session's CSRF token, performing the bootstrap request and
    /// caching the result when the slot is still empty. The cached token is
    /// never refreshed; if the portal invalidates it mid-run, later requests
    /// fail as per-row errors.
    async fn cached_or_fetched_token(&self, session: &mut SessionContext) -> Result<String> {
        if let Some(token) = session.csrf_token() {
            return Ok(token.to_string());
        }

        let response = self
            .send(
                "/csrf_js",
                session,
                vec![("FETCH-CSRF-TOKEN".to_string(), "1".to_string())],
                Some(String::new()),
                None,
            )
            .await?;
        let body = response.text().await?;
        let token = scrape::csrf_token(&body)
            .ok_or_else(|| Error::NotFound("couldn't get CSRF token".to_string()))?;

        debug!("cached CSRF token for this run");
        session.cache_csrf_token(token.clone());
        Ok(token)
    }

    async fn send(
        &self,
        path: &str,
        session: &SessionContext,
        extra_headers: Vec<(String, String)>,
        body: Option<String>,
        csrf_token: Option<String>,
    ) -> Result<reqwest::Response> {
        let url = Url::parse(session.origin())
            .and_then(|origin| origin.join(path))
            .map_err(|e| {
                Error::Config(format!("invalid portal URL {}{}: {}", session.origin(), path, e))
            })?;

        let mut headers = base_headers(session)?;
        if let Some(token) = &csrf_token {
            insert_header(&mut headers, "ZOOM-CSRFTOKEN", token)?;
        }

        let method = if body.is_some() { Method::POST } else { Method::GET };
        let has_content_type = extra_headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if body.is_some() && !has_content_type {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
            );
        }

        // Caller headers are inserted last so they win on conflict
        for (name, value) in &extra_headers {
            insert_header(&mut headers, name, value)?;
        }

        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

/// The fixed browser-mimicking header set sent on every request.
fn base_headers(session: &SessionContext) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, "User-Agent", session.user_agent())?;
    insert_header(&mut headers, "Accept", "application/json, text/plain, */*")?;
    insert_header(&mut headers, "Accept-Language", "en-US,en;q=0.5")?;
    insert_header(
        &mut headers,
        "X-Requested-With",
        "XMLHttpRequest, XMLHttpRequest, OWASP CSRFGuard Project",
    )?;
    insert_header(&mut headers, "Sec-Fetch-Dest", "empty")?;
    insert_header(&mut headers, "Sec-Fetch-Mode", "cors")?;
    insert_header(&mut headers, "Sec-Fetch-Site", "same-origin")?;
    insert_header(&mut headers, "Referer", &format!("{}/meeting", session.origin()))?;
    insert_header(&mut headers, "Origin", session.origin())?;
    insert_header(&mut headers, "Cookie", session.cookie_header())?;
    Ok(headers)
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::Config(format!("invalid header name {}: {}", name, e)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
    headers.insert(header_name, header_value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> SessionContext {
        SessionContext::from_cookie_header(
            "_zm_ssid=abc".to_string(),
            "TestAgent/1.0".to_string(),
            "https://origin.example".to_string(),
        )
    }

    #[test]
    fn test_base_headers_cover_browser_set() {
        let headers = base_headers(&test_session()).unwrap();
        assert_eq!(headers.get("User-Agent").unwrap(), "TestAgent/1.0");
        assert_eq!(headers.get("Origin").unwrap(), "https://origin.example");
        assert_eq!(headers.get("Referer").unwrap(), "https://origin.example/meeting");
        assert_eq!(headers.get("Cookie").unwrap(), "_zm_ssid=abc");
        assert_eq!(
            headers.get("X-Requested-With").unwrap(),
            "XMLHttpRequest, XMLHttpRequest, OWASP CSRFGuard Project"
        );
    }

    #[test]
    fn test_csrf_policy_prefers_override() {
        let client = PortalClient::new(Some("tok".to_string())).unwrap();
        assert!(matches!(client.csrf_policy(), CsrfPolicy::Token(t) if t == "tok"));

        let client = PortalClient::new(None).unwrap();
        assert!(matches!(client.csrf_policy(), CsrfPolicy::FetchFresh));
    }
}
