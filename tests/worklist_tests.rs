// Integration tests for worklist loading and option merging.
//
// These cover header normalization against realistic roster files and the
// merge of global scheduling options with per-row overrides.

use std::io::Write;

use anyhow::Result;
use bulk_meetings::batch::flows::meeting_request_for_row;
use bulk_meetings::batch::worklist;
use bulk_meetings::{Error, ScheduleDefaults};
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_headers_normalize_to_lower_camel() -> Result<()> {
    let file = write_csv("Email,Internal Meeting ID,Topic\na@x.edu,abc==,Office hours\n")?;
    let rows = worklist::load_rows(file.path())?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("email"), Some("a@x.edu"));
    assert_eq!(rows[0].get("internalMeetingID"), Some("abc=="));
    assert_eq!(rows[0].get("topic"), Some("Office hours"));
    Ok(())
}

#[test]
fn test_provisioning_rows_require_email() -> Result<()> {
    let file = write_csv("Email,Duration\na@x.edu,30\n,60\n")?;
    let err = worklist::load_provisioning_rows(file.path()).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("row: 1"));
    Ok(())
}

#[test]
fn test_missing_input_file_is_config_error() {
    let err = worklist::load_rows(std::path::Path::new("/nonexistent/roster.csv")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_row_overrides_win_over_defaults() -> Result<()> {
    let file = write_csv(
        "Email,Duration,Cohost,Timezone\n\
         a@x.edu,45,true,America/New_York\n\
         b@x.edu,,,\n",
    )?;
    let rows = worklist::load_provisioning_rows(file.path())?;
    let defaults = ScheduleDefaults {
        duration_minutes: 30,
        ..Default::default()
    };

    let first = meeting_request_for_row(&defaults, &rows[0])?;
    assert_eq!(first.duration_minutes, 45);
    assert_eq!(first.timezone, "America/New_York");
    assert_eq!(first.alt_hosts, vec!["a@x.edu".to_string()]);

    let second = meeting_request_for_row(&defaults, &rows[1])?;
    assert_eq!(second.duration_minutes, 30);
    assert_eq!(second.timezone, "UTC");
    assert!(second.alt_hosts.is_empty());
    Ok(())
}

#[test]
fn test_templates_substitute_email() -> Result<()> {
    let file = write_csv("Email\na@x.edu\n")?;
    let rows = worklist::load_provisioning_rows(file.path())?;
    let defaults = ScheduleDefaults {
        topic: "Meeting (@)".to_string(),
        description: Some("1:1 for @".to_string()),
        ..Default::default()
    };

    let request = meeting_request_for_row(&defaults, &rows[0])?;
    assert_eq!(request.topic, "Meeting (a@x.edu)");
    assert_eq!(request.description, "1:1 for a@x.edu");
    Ok(())
}

#[test]
fn test_enum_overrides_parse_from_row_values() -> Result<()> {
    let file = write_csv(
        "Email,Auto Record Mode,Audio Type\n\
         a@x.edu,cloud,voip\n",
    )?;
    let rows = worklist::load_provisioning_rows(file.path())?;

    let request = meeting_request_for_row(&ScheduleDefaults::default(), &rows[0])?;
    assert_eq!(request.auto_record, bulk_meetings::meeting::AutoRecord::Cloud);
    assert_eq!(request.audio_type, bulk_meetings::meeting::AudioType::Voip);
    Ok(())
}

#[test]
fn test_non_numeric_duration_override_is_validation_error() -> Result<()> {
    let file = write_csv("Email,Duration\na@x.edu,soon\n")?;
    let rows = worklist::load_provisioning_rows(file.path())?;

    let err = meeting_request_for_row(&ScheduleDefaults::default(), &rows[0]).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    Ok(())
}
