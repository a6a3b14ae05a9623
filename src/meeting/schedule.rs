//! Start-time and duration normalization for the schedule form.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// The en-US date/time/meridiem triple the schedule form expects, rendered in
/// the meeting's own timezone rather than the process default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTriple {
    pub date: String,
    pub time: String,
    pub meridiem: String,
}

/// Resolves a raw `when` value to an instant.
///
/// Accepts an unset value (meaning now), a numeric Unix timestamp, or an
/// ISO-like string. A bare number smaller than twice the current Unix-seconds
/// value is taken as seconds, anything larger as milliseconds.
pub fn resolve_start(when: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let raw = match when {
        None => return Ok(now),
        Some(raw) if raw.trim().is_empty() => return Ok(now),
        Some(raw) => raw.trim(),
    };

    if let Ok(value) = raw.parse::<f64>() {
        let threshold = (now.timestamp() * 2) as f64;
        let millis = if value < threshold { value * 1000.0 } else { value };
        return Utc
            .timestamp_millis_opt(millis as i64)
            .single()
            .ok_or_else(|| Error::Validation(format!("invalid date: {}", raw)));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(Error::Validation(format!("invalid date: {}", raw)))
}

/// Parses a duration-in-minutes field, rejecting non-numeric and negative
/// values before any network call is made.
pub fn parse_duration(raw: &str) -> Result<u32> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("invalid duration: {}", raw)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!("invalid duration: {}", raw)));
    }
    Ok(value as u32)
}

/// Looks up an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| Error::Validation(format!("invalid timezone: {}", name)))
}

/// Renders the instant in `tz` as the schedule form's locale triple, e.g.
/// `3/4/2021` / `10:30` / `AM`.
pub fn format_start(start: DateTime<Utc>, tz: Tz) -> StartTriple {
    let local = start.with_timezone(&tz);
    StartTriple {
        date: local.format("%-m/%-d/%Y").to_string(),
        time: local.format("%-I:%M").to_string(),
        meridiem: local.format("%p").to_string(),
    }
}

/// Renders an epoch-milliseconds value the way the portal's recording
/// listing timestamps are exported: ISO-8601 with millisecond precision.
pub fn iso_from_epoch_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|instant| instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}
