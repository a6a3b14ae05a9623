use tracing::debug;

use crate::batch::output::ERROR_MARKER;
use crate::error::Result;
use crate::portal::{scrape, PortalClient, RequestOptions};
use crate::session::SessionContext;

/// Recovers the numeric meeting ID from a recorded join link, or `None` when
/// the row was never successfully provisioned: an empty value, the literal
/// failure marker, or a link without a `/j/<digits>` segment.
pub fn deletable_meeting_id(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() || link == ERROR_MARKER {
        return None;
    }
    scrape::meeting_id_from_link(link)
}

/// Deletes one meeting. No occurrence scoping, no notification mail.
pub async fn delete_meeting(
    client: &PortalClient,
    session: &mut SessionContext,
    meeting_id: &str,
) -> Result<()> {
    let mut body = form_urlencoded::Serializer::new(String::new());
    body.append_pair("user_id", "");
    body.append_pair("id", meeting_id);
    body.append_pair("occurrence", "");
    body.append_pair("sendMail", "false");
    body.append_pair("mailBody", "");

    client
        .execute_json(
            "/meeting/delete",
            session,
            RequestOptions {
                body: Some(body.finish()),
                csrf: client.csrf_policy(),
                ..Default::default()
            },
        )
        .await?;
    debug!("meeting {} deleted", meeting_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletable_id_from_join_link() {
        assert_eq!(
            deletable_meeting_id("https://origin.example/j/123456789?pwd=x").as_deref(),
            Some("123456789")
        );
    }

    #[test]
    fn test_error_marker_is_not_deletable() {
        assert_eq!(deletable_meeting_id("ERROR"), None);
        assert_eq!(deletable_meeting_id(""), None);
        assert_eq!(deletable_meeting_id("  "), None);
    }

    #[test]
    fn test_unrecognized_link_is_not_deletable() {
        assert_eq!(deletable_meeting_id("https://origin.example/about"), None);
    }
}
