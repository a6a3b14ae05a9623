use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::portal::{PortalClient, RequestOptions};
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareInfo {
    encrypt_meet_id: String,
}

/// Resolves a recording's public share link.
///
/// Two steps: update the recording's passcode (an empty password clears
/// protection), then fetch its share info. The share-info envelope's `result`
/// is itself a JSON-encoded string and has to be parsed a second time.
pub async fn fetch_share_link(
    client: &PortalClient,
    session: &mut SessionContext,
    internal_meeting_id: &str,
    password: &str,
) -> Result<String> {
    let mut body = form_urlencoded::Serializer::new(String::new());
    body.append_pair("passwd", password);
    body.append_pair("id", internal_meeting_id);
    client
        .execute_json(
            "/recording/update_meet_passwd",
            session,
            RequestOptions {
                body: Some(body.finish()),
                csrf: client.csrf_policy(),
                ..Default::default()
            },
        )
        .await?;

    let mut body = form_urlencoded::Serializer::new(String::new());
    body.append_pair("meeting_id", internal_meeting_id);
    let result = client
        .execute_json(
            "/recording/get_recordmeet_shareinfo",
            session,
            RequestOptions {
                body: Some(body.finish()),
                csrf: client.csrf_policy(),
                ..Default::default()
            },
        )
        .await?;

    let encoded = result
        .as_str()
        .ok_or_else(|| Error::NotFound("share info payload was not a string".to_string()))?;
    let info: ShareInfo = serde_json::from_str(encoded)
        .map_err(|e| Error::NotFound(format!("unexpected share info payload: {}", e)))?;

    debug!("resolved share link for {}", internal_meeting_id);
    Ok(format!("{}/rec/share/{}", session.origin(), info.encrypt_meet_id))
}
