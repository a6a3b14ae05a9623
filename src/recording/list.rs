use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::meeting::schedule;
use crate::portal::{PortalClient, RequestOptions};
use crate::session::SessionContext;

/// One cloud recording as reported by the listing endpoint.
#[derive(Debug, Clone)]
pub struct RecordingDescriptor {
    /// The meeting's public numeric ID
    pub meeting_number: u64,
    /// The portal's internal recording/meeting identifier
    pub internal_meeting_id: String,
    /// Recording creation time, ISO-8601
    pub timestamp: String,
    pub topic: String,
}

// The listing payload mixes conventions: its own fields are snake_case while
// each recording entry is camelCase.
#[derive(Debug, Deserialize)]
struct ListingResult {
    page: u32,
    total_records: u32,
    page_size: u32,
    #[serde(default)]
    recordings: Vec<RawRecording>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecording {
    meeting_number: u64,
    meeting_id: String,
    create_time: i64,
    #[serde(default)]
    topic: String,
}

impl From<RawRecording> for RecordingDescriptor {
    fn from(raw: RawRecording) -> Self {
        Self {
            meeting_number: raw.meeting_number,
            internal_meeting_id: raw.meeting_id,
            timestamp: schedule::iso_from_epoch_millis(raw.create_time).unwrap_or_default(),
            topic: raw.topic,
        }
    }
}

/// Fetches every page of the recording listing, most-recent-first exactly as
/// the portal returns it, without re-sorting.
///
/// The page bound is fixed from the first response's totals, so a backend
/// whose reported total grows between pages cannot keep the loop alive past
/// that bound; a shrinking total ends it early through the same check.
pub async fn list_recordings(
    client: &PortalClient,
    session: &mut SessionContext,
    interval: Duration,
) -> Result<Vec<RecordingDescriptor>> {
    let mut recordings = Vec::new();
    let mut page = 1u32;
    let mut first_bound = None;

    loop {
        let result = client
            .execute_json(
                "/recording/host_list",
                session,
                RequestOptions {
                    body: Some(listing_body(page)),
                    csrf: client.csrf_policy(),
                    ..Default::default()
                },
            )
            .await?;
        let listing: ListingResult = serde_json::from_value(result)
            .map_err(|e| Error::NotFound(format!("unexpected listing payload: {}", e)))?;

        let total_pages = total_page_count(listing.total_records, listing.page_size);
        let bound = *first_bound.get_or_insert(total_pages);
        info!("fetched recordings (page {} / {})", listing.page, bound);

        recordings.extend(listing.recordings.into_iter().map(RecordingDescriptor::from));

        if listing.page >= bound {
            break;
        }
        page = listing.page + 1;
        tokio::time::sleep(interval).await;
    }

    Ok(recordings)
}

fn listing_body(page: u32) -> String {
    let mut body = form_urlencoded::Serializer::new(String::new());
    body.append_pair("from", "");
    body.append_pair("to", "");
    body.append_pair("search_value", "");
    body.append_pair("transcript_keyword", "");
    body.append_pair("search_type", "mixed");
    body.append_pair("p", &page.to_string());
    body.append_pair("search_status", "0");
    body.append_pair("assistant_host_id", "");
    body.finish()
}

fn total_page_count(total_records: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}
