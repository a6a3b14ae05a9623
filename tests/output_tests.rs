// Integration tests for output files and resume-set loading.

use std::fs;
use std::io::Write;

use anyhow::Result;
use bulk_meetings::batch::output::{self, OutputTarget, ResumeSet};
use tempfile::tempdir;

const HEADER: [&str; 2] = ["Email", "Meeting"];

#[test]
fn test_new_file_gets_header() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("meetings.csv");

    let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;
    assert!(resume.is_empty());

    sink.append(&["a@x.edu", "https://origin.example/j/123"])?;
    drop(sink);

    let contents = fs::read_to_string(&path)?;
    assert_eq!(contents, "Email,Meeting\na@x.edu,https://origin.example/j/123\n");
    Ok(())
}

#[test]
fn test_existing_file_seeds_resume_set_and_appends() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("meetings.csv");
    fs::write(&path, "Email,Meeting\na@x.edu,https://origin.example/j/123\n")?;

    let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;
    assert!(resume.contains("a@x.edu"));
    assert!(!resume.contains("b@x.edu"));

    sink.append(&["b@x.edu", "https://origin.example/j/456"])?;
    drop(sink);

    // Prior contents are never rewritten; the file only grows
    let contents = fs::read_to_string(&path)?;
    assert_eq!(
        contents,
        "Email,Meeting\n\
         a@x.edu,https://origin.example/j/123\n\
         b@x.edu,https://origin.example/j/456\n"
    );
    Ok(())
}

#[test]
fn test_resume_set_ignores_blank_keys() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("meetings.csv");
    fs::write(&path, "Email,Meeting\na@x.edu,ERROR\n,stray\n")?;

    let resume = ResumeSet::from_output_file(&path, "email")?;
    assert_eq!(resume.len(), 1);
    assert!(resume.contains("a@x.edu"));
    Ok(())
}

#[test]
fn test_resume_keys_match_normalized_columns() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("recordings.csv");
    let mut file = fs::File::create(&path)?;
    writeln!(file, "Meeting ID,Timestamp,Internal Meeting ID,Topic,Recording Link")?;
    writeln!(file, "123456789,2021-03-04T10:00:00.000Z,aBcD==,Office hours,link")?;

    let resume = ResumeSet::from_output_file(&path, "internalMeetingID")?;
    assert!(resume.contains("aBcD=="));
    Ok(())
}

#[test]
fn test_quoted_fields_survive_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("recordings.csv");

    let header = ["Internal Meeting ID", "Topic"];
    let (mut sink, _) = output::open(&OutputTarget::File(path.clone()), &header, "internalMeetingID")?;
    sink.append(&["aBcD==", r#"Reading group, "advanced""#])?;
    drop(sink);

    let resume = ResumeSet::from_output_file(&path, "internalMeetingID")?;
    assert!(resume.contains("aBcD=="));
    Ok(())
}

#[test]
fn test_discard_sink_writes_nothing() -> Result<()> {
    let mut sink = output::OutputSink::discard();
    sink.append(&["anything"])?;
    Ok(())
}
