use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};
use crate::portal::{scrape, PortalClient, RequestOptions};
use crate::session::SessionContext;

use super::schedule;

/// Portal auto-recording mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoRecord {
    #[default]
    None,
    Local,
    Cloud,
}

impl AutoRecord {
    pub fn as_str(self) -> &'static str {
        match self {
            AutoRecord::None => "none",
            AutoRecord::Local => "local",
            AutoRecord::Cloud => "cloud",
        }
    }
}

impl FromStr for AutoRecord {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(AutoRecord::None),
            "local" => Ok(AutoRecord::Local),
            "cloud" => Ok(AutoRecord::Cloud),
            other => Err(Error::Validation(format!("invalid auto-record mode: {}", other))),
        }
    }
}

/// Meeting audio connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioType {
    Telephony,
    Voip,
    #[default]
    Both,
}

impl AudioType {
    pub fn as_str(self) -> &'static str {
        match self {
            AudioType::Telephony => "telephony",
            AudioType::Voip => "voip",
            AudioType::Both => "both",
        }
    }
}

impl FromStr for AudioType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "telephony" => Ok(AudioType::Telephony),
            "voip" => Ok(AudioType::Voip),
            "both" => Ok(AudioType::Both),
            other => Err(Error::Validation(format!("invalid audio type: {}", other))),
        }
    }
}

/// A fully-resolved create-meeting request.
///
/// One of these is built per worklist row by merging global options with the
/// row's overrides; it is consumed by `create_meeting` and discarded. The
/// defaults mirror the portal's "schedule a meeting" form.
#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub topic: String,
    pub description: String,
    /// Raw start value; resolved by `schedule::resolve_start` (unset = now)
    pub when: Option<String>,
    /// 0 marks the meeting as having no fixed schedule
    pub duration_minutes: u32,
    /// IANA timezone the start triple is rendered in
    pub timezone: String,
    pub password: String,
    /// Alternate hosts, joined with commas on the wire
    pub alt_hosts: Vec<String>,
    pub auto_record: AutoRecord,
    pub audio_type: AudioType,
    pub allow_join_before_host: bool,
    pub allow_join_before_host_prior_start: bool,
    pub host_video: bool,
    pub participant_video: bool,
    pub allow_alt_host_to_edit_poll: bool,
    pub enable_pac: bool,
    pub enable_waiting_room: bool,
    /// JSON-encoded dial-in country list, when restricted
    pub dial_in_countries: Option<serde_json::Value>,
    /// Explicit auth-restriction payload; auto-populated when an
    /// enforce-sign-in mode is requested without one
    pub auth_options: Option<serde_json::Value>,
    /// 0 = any signed-in user, 1 = institutional accounts only
    pub enforce_sign_in_mode: u8,
    pub breakout_rooms: Option<serde_json::Value>,
    pub require_registration: bool,
    pub use_personal_meeting_id: bool,
    pub mute_upon_entry: bool,
    pub region_allow_list: Vec<String>,
    pub region_deny_list: Vec<String>,
}

impl Default for MeetingRequest {
    fn default() -> Self {
        Self {
            topic: String::new(),
            description: String::new(),
            when: None,
            duration_minutes: 0,
            timezone: "UTC".to_string(),
            password: random_password(),
            alt_hosts: Vec::new(),
            auto_record: AutoRecord::None,
            audio_type: AudioType::Both,
            allow_join_before_host: true,
            allow_join_before_host_prior_start: true,
            host_video: true,
            participant_video: true,
            allow_alt_host_to_edit_poll: false,
            enable_pac: false,
            enable_waiting_room: false,
            dial_in_countries: None,
            auth_options: None,
            enforce_sign_in_mode: 0,
            breakout_rooms: None,
            require_registration: false,
            use_personal_meeting_id: false,
            mute_upon_entry: false,
            region_allow_list: Vec::new(),
            region_deny_list: Vec::new(),
        }
    }
}

/// Six random digits, the portal's own passcode shape.
fn random_password() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

impl MeetingRequest {
    /// Serializes the schedule form body the portal's scheduling page would
    /// submit. All field validation happens here, before any network call.
    pub fn form_body(&self, now: DateTime<Utc>) -> Result<String> {
        let tz = schedule::parse_timezone(&self.timezone)?;
        let start = schedule::resolve_start(self.when.as_deref(), now)?;
        let triple = schedule::format_start(start, tz);

        let mut body = form_urlencoded::Serializer::new(String::new());
        body.append_pair("topic", &self.topic);
        body.append_pair("agenda", &self.description);
        body.append_pair("timezone", &self.timezone);
        body.append_pair("start_date", &triple.date);
        body.append_pair("start_time", &triple.time);
        body.append_pair("start_time_2", &triple.meridiem);
        body.append_pair("duration", &self.duration_minutes.to_string());

        if self.duration_minutes == 0 {
            // No fixed schedule: the portal wants the classic recurrence marker
            body.append_pair("option_rm", "true");
            body.append_pair(
                "recurrence_setting",
                &json!({"type": "CLASSIC", "timezone": self.timezone}).to_string(),
            );
        } else {
            body.append_pair("option_rm", "false");
        }

        body.append_pair("option_jbh", flag(self.allow_join_before_host));
        body.append_pair("option_video_host", on_off(self.host_video));
        body.append_pair("option_video_participants", on_off(self.participant_video));
        body.append_pair("option_audio_type", self.audio_type.as_str());
        body.append_pair("password", &self.password);
        body.append_pair("mtg_alternative_host", &self.alt_hosts.join(","));
        body.append_pair(
            "enable_alternative_host_edit_poll",
            flag(self.allow_alt_host_to_edit_poll),
        );
        body.append_pair("option_pac", flag(self.enable_pac));
        body.append_pair("option_waiting_room", bit(self.enable_waiting_room));

        if let Some(countries) = &self.dial_in_countries {
            body.append_pair("global_dialin_countries", &countries.to_string());
        }
        if let Some(auth) = self.auth_payload() {
            body.append_pair("authOptionsJson", &auth.to_string());
        }
        body.append_pair("option_enforce_signed_in", &self.enforce_sign_in_mode.to_string());

        body.append_pair("option_bre_room", flag(self.breakout_rooms.is_some()));
        if let Some(rooms) = &self.breakout_rooms {
            body.append_pair("breout_room_info", &rooms.to_string());
        }

        body.append_pair("autorec", self.auto_record.as_str());
        body.append_pair("option_registration", flag(self.require_registration));
        body.append_pair("with_pmi", flag(self.use_personal_meeting_id));
        body.append_pair("option_mute_upon_entry", bit(self.mute_upon_entry));
        body.append_pair(
            "jbhPriorStartMeeting",
            bit(self.allow_join_before_host_prior_start),
        );

        let region_restricted =
            !self.region_allow_list.is_empty() || !self.region_deny_list.is_empty();
        body.append_pair("enable_join_meeting_region", flag(region_restricted));
        body.append_pair("white_region_list", &json!(self.region_allow_list).to_string());
        body.append_pair("black_region_list", &json!(self.region_deny_list).to_string());

        Ok(body.finish())
    }

    /// The auth-restriction payload to submit: the explicit one when given,
    /// or a minimal sign-in-required object when an enforce mode is requested
    /// without one.
    fn auth_payload(&self) -> Option<serde_json::Value> {
        match (&self.auth_options, self.enforce_sign_in_mode) {
            (Some(payload), _) => Some(payload.clone()),
            (None, 0) => None,
            (None, _) => Some(json!({"enforceLogin": true, "enforceLoginDomains": ""})),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn bit(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// A provisioned meeting's identifier and public join link.
#[derive(Debug, Clone)]
pub struct CreatedMeeting {
    pub id: String,
    pub link: String,
}

/// Creates one meeting and returns its ID and public join link.
///
/// Two portal calls: the schedule form POST, then a fetch of the meeting's
/// info page to scrape the join link out of its markup. The page scrape is
/// the most fragile step in the whole pipeline.
pub async fn create_meeting(
    client: &PortalClient,
    session: &mut SessionContext,
    request: &MeetingRequest,
) -> Result<CreatedMeeting> {
    let body = request.form_body(Utc::now())?;

    let result = client
        .execute_json(
            "/meeting/save",
            session,
            RequestOptions {
                body: Some(body),
                csrf: client.csrf_policy(),
                ..Default::default()
            },
        )
        .await?;
    let id = meeting_id_from_result(&result)?;
    debug!("meeting {} saved, fetching join link", id);

    let page = client
        .execute(&format!("/meeting/{}", id), session, RequestOptions::default())
        .await?
        .text()
        .await?;
    let link = scrape::join_link(&page, session.origin(), &id).ok_or_else(|| {
        Error::NotFound("could not find meeting link on meeting page".to_string())
    })?;

    Ok(CreatedMeeting { id, link })
}

fn meeting_id_from_result(result: &serde_json::Value) -> Result<String> {
    match result {
        serde_json::Value::Number(id) => Ok(id.to_string()),
        serde_json::Value::String(id) if !id.is_empty() => Ok(id.clone()),
        _ => Err(Error::NotFound(
            "meeting ID missing from save response".to_string(),
        )),
    }
}
