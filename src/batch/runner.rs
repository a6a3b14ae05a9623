use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::Result;

use super::output::{OutputSink, ResumeSet};

/// What one row's operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Success, with one output record to append
    Record(Vec<String>),
    /// Success with nothing to write (flows without data output)
    Done,
    /// Nothing to do for this row
    Skipped,
}

/// One operation protocol driven once per worklist row.
#[async_trait]
pub trait RowOperation {
    type Row: Sync;

    /// Label for log lines about this row.
    fn identity(&self, row: &Self::Row, index: usize) -> String;

    /// Key matched against the resume set, for flows that resume.
    fn resume_key(&self, row: &Self::Row) -> Option<String>;

    /// Runs the protocol for one row.
    async fn process(&mut self, row: &Self::Row, index: usize) -> Result<RowOutcome>;

    /// Record written when the row fails: the identity plus the failure
    /// marker in the result column, or `None` for flows without data output.
    fn failure_record(&self, row: &Self::Row) -> Option<Vec<String>>;
}

/// Outcome counts for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Drives an ordered worklist through one operation, strictly sequentially.
///
/// Failures are isolated to the row that raised them; rows whose identity key
/// already appears in the resume set are skipped without output; a fixed
/// throttle separates consecutive operations (never trailing the last one).
pub struct BatchRunner {
    interval: Duration,
}

impl BatchRunner {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub async fn run<Op>(
        &self,
        rows: &[Op::Row],
        op: &mut Op,
        sink: &mut OutputSink,
        resume: &ResumeSet,
    ) -> Result<RunSummary>
    where
        Op: RowOperation + Send,
    {
        let mut summary = RunSummary::default();
        let mut throttle = false;

        for (index, row) in rows.iter().enumerate() {
            let identity = op.identity(row, index);

            if let Some(key) = op.resume_key(row) {
                if resume.contains(&key) {
                    info!("[{}] found in output, skipping", identity);
                    summary.skipped += 1;
                    continue;
                }
            }

            if throttle {
                tokio::time::sleep(self.interval).await;
            }
            throttle = true;

            match op.process(row, index).await {
                Ok(RowOutcome::Record(record)) => {
                    sink.append(&record)?;
                    summary.processed += 1;
                }
                Ok(RowOutcome::Done) => {
                    summary.processed += 1;
                }
                Ok(RowOutcome::Skipped) => {
                    summary.skipped += 1;
                }
                Err(err) => {
                    error!("[{}] {}", identity, err);
                    if let Some(record) = op.failure_record(row) {
                        sink.append(&record)?;
                    }
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
