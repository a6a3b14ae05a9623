use serde::Deserialize;

use crate::error::{Error, Result};

/// Error code the portal uses for a stale authenticated session.
const SESSION_EXPIRED_CODE: i64 = 201;

/// The portal's shared JSON response envelope.
///
/// A response is a domain failure when `status` is false, `errorCode` is
/// non-zero, or `errorMessage` is non-empty. Code 201 means the session
/// itself is stale rather than a per-call problem, and is surfaced as
/// `Error::SessionExpired` so the operator knows to re-export cookies.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ApiEnvelope {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::Api {
            code: -1,
            message: format!("unparseable response: {}", e),
        })
    }

    /// Applies the success/failure convention and unwraps the `result`
    /// payload.
    pub fn into_result(self) -> Result<serde_json::Value> {
        let message = self.error_message.unwrap_or_default();
        if !self.status || self.error_code != 0 || !message.is_empty() {
            if self.error_code == SESSION_EXPIRED_CODE {
                return Err(Error::SessionExpired);
            }
            return Err(Error::Api {
                code: self.error_code,
                message,
            });
        }
        Ok(self.result)
    }
}
