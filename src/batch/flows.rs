use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::config::ScheduleDefaults;
use crate::error::{Error, Result};
use crate::meeting::{self, schedule, MeetingRequest};
use crate::portal::PortalClient;
use crate::recording::{self, RecordingDescriptor};
use crate::session::SessionContext;

use super::output::{self, OutputTarget, ResumeSet, ERROR_MARKER};
use super::runner::{BatchRunner, RowOperation, RowOutcome, RunSummary};
use super::worklist::{self, Row};

/// Output header for provisioning runs.
pub const GENERATE_HEADER: [&str; 2] = ["Email", "Meeting"];

/// Output header for recording-link runs.
pub const RECORDINGS_HEADER: [&str; 5] = [
    "Meeting ID",
    "Timestamp",
    "Internal Meeting ID",
    "Topic",
    "Recording Link",
];

/// Creates one meeting per worklist row, writing `Email,Meeting` records.
pub async fn run_generate(
    client: &PortalClient,
    session: &mut SessionContext,
    defaults: &ScheduleDefaults,
    input: &Path,
    target: &OutputTarget,
    interval: Duration,
) -> Result<RunSummary> {
    let rows = worklist::load_provisioning_rows(input)?;
    info!("loaded {} rows from {}", rows.len(), input.display());

    let (mut sink, resume) = output::open(target, &GENERATE_HEADER, "email")?;
    let mut op = CreateOp {
        client,
        session,
        defaults,
    };
    BatchRunner::new(interval)
        .run(&rows, &mut op, &mut sink, &resume)
        .await
}

/// Collects a share link for every cloud recording, writing one record per
/// recording keyed on the internal meeting ID.
pub async fn run_recordings(
    client: &PortalClient,
    session: &mut SessionContext,
    password: &str,
    target: &OutputTarget,
    interval: Duration,
) -> Result<RunSummary> {
    let (mut sink, resume) = output::open(target, &RECORDINGS_HEADER, "internalMeetingID")?;

    let recordings = recording::list_recordings(client, session, interval).await?;
    info!("listed {} recordings", recordings.len());

    let mut op = ShareLinkOp {
        client,
        session,
        password,
    };
    BatchRunner::new(interval)
        .run(&recordings, &mut op, &mut sink, &resume)
        .await
}

/// Deletes the meetings recorded in a previous provisioning output. Rows
/// whose `Meeting` value is the failure marker or carries no join link are
/// skipped without a delete request.
pub async fn run_ungenerate(
    client: &PortalClient,
    session: &mut SessionContext,
    input: &Path,
    interval: Duration,
) -> Result<RunSummary> {
    let rows = worklist::load_rows(input)?;
    info!("loaded {} rows from {}", rows.len(), input.display());

    let mut sink = output::OutputSink::discard();
    let mut op = DeleteOp { client, session };
    BatchRunner::new(interval)
        .run(&rows, &mut op, &mut sink, &ResumeSet::empty())
        .await
}

/// Merges global options with one row's overrides into a request, resolving
/// `@` templates against the row's email. All field validation happens here,
/// before the row's first network call.
pub fn meeting_request_for_row(defaults: &ScheduleDefaults, row: &Row) -> Result<MeetingRequest> {
    let email = row.get_non_empty("email").unwrap_or_default().to_string();

    let topic = row
        .get_non_empty("topic")
        .unwrap_or(defaults.topic.as_str())
        .replacen('@', &email, 1);
    let description = row
        .get_non_empty("description")
        .or(defaults.description.as_deref())
        .map(|d| d.replacen('@', &email, 1))
        .unwrap_or_default();

    let when = row
        .get_non_empty("when")
        .map(str::to_string)
        .or_else(|| defaults.when.clone());

    let duration_minutes = match row.get_non_empty("duration") {
        Some(raw) => schedule::parse_duration(raw)?,
        None => defaults.duration_minutes,
    };

    let timezone = row
        .get_non_empty("timezone")
        .unwrap_or(defaults.timezone.as_str())
        .to_string();

    let cohost = match row.get_non_empty("cohost") {
        Some(raw) => raw.eq_ignore_ascii_case("true"),
        None => defaults.cohost,
    };

    let enforce_sign_in_mode = match row.get_non_empty("enforceSignInMode") {
        Some(raw) => raw
            .parse::<u8>()
            .map_err(|_| Error::Validation(format!("invalid enforce-sign-in mode: {}", raw)))?,
        None => 0,
    };

    let mut request = MeetingRequest {
        topic,
        description,
        when,
        duration_minutes,
        timezone,
        alt_hosts: if cohost { vec![email] } else { Vec::new() },
        enforce_sign_in_mode,
        ..Default::default()
    };
    if let Some(password) = row.get_non_empty("password") {
        request.password = password.to_string();
    }
    if let Some(raw) = row.get_non_empty("autoRecordMode") {
        request.auto_record = raw.parse()?;
    }
    if let Some(raw) = row.get_non_empty("audioType") {
        request.audio_type = raw.parse()?;
    }
    Ok(request)
}

struct CreateOp<'a> {
    client: &'a PortalClient,
    session: &'a mut SessionContext,
    defaults: &'a ScheduleDefaults,
}

#[async_trait]
impl RowOperation for CreateOp<'_> {
    type Row = Row;

    fn identity(&self, row: &Row, index: usize) -> String {
        row.get_non_empty("email")
            .map(str::to_string)
            .unwrap_or_else(|| format!("row[{}]", index))
    }

    fn resume_key(&self, row: &Row) -> Option<String> {
        row.get_non_empty("email").map(str::to_string)
    }

    async fn process(&mut self, row: &Row, _index: usize) -> Result<RowOutcome> {
        let email = row.get_non_empty("email").unwrap_or_default().to_string();
        let request = meeting_request_for_row(self.defaults, row)?;
        let created = meeting::create_meeting(self.client, self.session, &request).await?;
        info!("[{}] created meeting ({})", email, created.link);
        Ok(RowOutcome::Record(vec![email, created.link]))
    }

    fn failure_record(&self, row: &Row) -> Option<Vec<String>> {
        Some(vec![
            row.get_non_empty("email").unwrap_or_default().to_string(),
            ERROR_MARKER.to_string(),
        ])
    }
}

struct ShareLinkOp<'a> {
    client: &'a PortalClient,
    session: &'a mut SessionContext,
    password: &'a str,
}

#[async_trait]
impl RowOperation for ShareLinkOp<'_> {
    type Row = RecordingDescriptor;

    fn identity(&self, row: &RecordingDescriptor, _index: usize) -> String {
        row.internal_meeting_id.clone()
    }

    fn resume_key(&self, row: &RecordingDescriptor) -> Option<String> {
        Some(row.internal_meeting_id.clone())
    }

    async fn process(&mut self, row: &RecordingDescriptor, _index: usize) -> Result<RowOutcome> {
        let link = recording::fetch_share_link(
            self.client,
            self.session,
            &row.internal_meeting_id,
            self.password,
        )
        .await?;
        info!("fetched recording share info (topic: {})", row.topic);
        Ok(RowOutcome::Record(vec![
            row.meeting_number.to_string(),
            row.timestamp.clone(),
            row.internal_meeting_id.clone(),
            row.topic.clone(),
            link,
        ]))
    }

    fn failure_record(&self, row: &RecordingDescriptor) -> Option<Vec<String>> {
        Some(vec![
            row.meeting_number.to_string(),
            row.timestamp.clone(),
            row.internal_meeting_id.clone(),
            row.topic.clone(),
            ERROR_MARKER.to_string(),
        ])
    }
}

struct DeleteOp<'a> {
    client: &'a PortalClient,
    session: &'a mut SessionContext,
}

#[async_trait]
impl RowOperation for DeleteOp<'_> {
    type Row = Row;

    fn identity(&self, row: &Row, index: usize) -> String {
        row.get_non_empty("email")
            .map(str::to_string)
            .unwrap_or_else(|| format!("row[{}]", index))
    }

    fn resume_key(&self, _row: &Row) -> Option<String> {
        None
    }

    async fn process(&mut self, row: &Row, index: usize) -> Result<RowOutcome> {
        let identity = self.identity(row, index);

        let link = match row.get_non_empty("meeting") {
            Some(link) => link.to_string(),
            None => return Ok(RowOutcome::Skipped),
        };
        let meeting_id = match meeting::deletable_meeting_id(&link) {
            Some(id) => id,
            None => {
                info!("[{}] nothing to delete, skipping", identity);
                return Ok(RowOutcome::Skipped);
            }
        };

        meeting::delete_meeting(self.client, self.session, &meeting_id).await?;
        info!("[{}] deleted meeting ({})", identity, link);
        Ok(RowOutcome::Done)
    }

    fn failure_record(&self, _row: &Row) -> Option<Vec<String>> {
        None
    }
}
