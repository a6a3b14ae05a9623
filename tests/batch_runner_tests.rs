// Integration tests for the batch runner's per-row state machine: failure
// isolation, resume skipping, and the fixed inter-row throttle.

use std::fs;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bulk_meetings::batch::output::{self, OutputTarget};
use bulk_meetings::{BatchRunner, Error, ResumeSet, RowOperation, RowOutcome, ERROR_MARKER};
use tempfile::tempdir;

const HEADER: [&str; 2] = ["Email", "Meeting"];

/// Scripted stand-in for an operation protocol: rows prefixed `fail` error
/// out, rows prefixed `skip` have nothing to do, everything else succeeds.
struct StubOp {
    calls: Vec<String>,
}

impl StubOp {
    fn new() -> Self {
        Self { calls: Vec::new() }
    }
}

#[async_trait]
impl RowOperation for StubOp {
    type Row = String;

    fn identity(&self, row: &String, _index: usize) -> String {
        row.clone()
    }

    fn resume_key(&self, row: &String) -> Option<String> {
        Some(row.clone())
    }

    async fn process(&mut self, row: &String, _index: usize) -> bulk_meetings::Result<RowOutcome> {
        self.calls.push(row.clone());
        if row.starts_with("fail") {
            return Err(Error::Api {
                code: 1,
                message: "backend said no".to_string(),
            });
        }
        if row.starts_with("skip") {
            return Ok(RowOutcome::Skipped);
        }
        Ok(RowOutcome::Record(vec![
            row.clone(),
            format!("https://origin.example/j/{}", row.len()),
        ]))
    }

    fn failure_record(&self, row: &String) -> Option<Vec<String>> {
        Some(vec![row.clone(), ERROR_MARKER.to_string()])
    }
}

#[tokio::test]
async fn test_failure_writes_error_line_and_continues() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");
    let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;

    let rows = vec![
        "a@x.edu".to_string(),
        "fail@x.edu".to_string(),
        "c@x.edu".to_string(),
    ];
    let mut op = StubOp::new();
    let summary = BatchRunner::new(Duration::ZERO)
        .run(&rows, &mut op, &mut sink, &resume)
        .await?;
    drop(sink);

    // Every row was attempted despite the failure in the middle
    assert_eq!(op.calls, rows);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);

    let contents = fs::read_to_string(&path)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "fail@x.edu,ERROR");
    Ok(())
}

#[tokio::test]
async fn test_resume_skips_rows_already_in_output() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");
    fs::write(&path, "Email,Meeting\na@x.edu,https://origin.example/j/7\n")?;

    let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;
    let rows = vec!["a@x.edu".to_string(), "b@x.edu".to_string()];
    let mut op = StubOp::new();
    let summary = BatchRunner::new(Duration::ZERO)
        .run(&rows, &mut op, &mut sink, &resume)
        .await?;
    drop(sink);

    // The already-processed key is never re-attempted and never re-written
    assert_eq!(op.calls, vec!["b@x.edu".to_string()]);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);

    let contents = fs::read_to_string(&path)?;
    assert_eq!(contents.matches("a@x.edu").count(), 1);
    assert!(contents.ends_with("b@x.edu,https://origin.example/j/7\n"));
    Ok(())
}

#[tokio::test]
async fn test_rerun_of_same_input_adds_no_duplicates() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");
    let rows = vec!["a@x.edu".to_string(), "b@x.edu".to_string()];

    for _ in 0..2 {
        let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;
        let mut op = StubOp::new();
        BatchRunner::new(Duration::ZERO)
            .run(&rows, &mut op, &mut sink, &resume)
            .await?;
    }

    let contents = fs::read_to_string(&path)?;
    assert_eq!(contents.matches("a@x.edu").count(), 1);
    assert_eq!(contents.matches("b@x.edu").count(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_throttle_separates_rows_but_not_after_last() -> Result<()> {
    let mut sink = output::OutputSink::discard();
    let rows = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let mut op = StubOp::new();

    let started = tokio::time::Instant::now();
    BatchRunner::new(Duration::from_secs(2))
        .run(&rows, &mut op, &mut sink, &ResumeSet::empty())
        .await?;

    // Two gaps between three rows; no trailing sleep
    assert_eq!(started.elapsed(), Duration::from_secs(4));
    Ok(())
}

#[tokio::test]
async fn test_skipped_outcome_produces_no_record() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.csv");
    let (mut sink, resume) = output::open(&OutputTarget::File(path.clone()), &HEADER, "email")?;

    let rows = vec!["skip-me".to_string(), "a@x.edu".to_string()];
    let mut op = StubOp::new();
    let summary = BatchRunner::new(Duration::ZERO)
        .run(&rows, &mut op, &mut sink, &resume)
        .await?;
    drop(sink);

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.processed, 1);
    let contents = fs::read_to_string(&path)?;
    assert!(!contents.contains("skip-me"));
    Ok(())
}

#[test]
fn test_session_expired_message_prompts_credential_refresh() {
    assert_eq!(
        Error::SessionExpired.to_string(),
        "session expired, log in and update your cookies"
    );
}
