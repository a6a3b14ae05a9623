use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;

use super::worklist;

/// Literal token written in the result column of a failed row.
pub const ERROR_MARKER: &str = "ERROR";

/// Sentinel output value selecting the console instead of a file.
pub const STDOUT_TARGET: &str = "stdout";

/// Where a flow's data records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Console: records to stdout, resume behavior disabled
    Stdout,
    /// Append-only file; pre-existing contents seed the resume set
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(raw: &str) -> Self {
        if raw == STDOUT_TARGET {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(raw))
        }
    }
}

/// Identity keys already processed by a previous run against the same output
/// file. Used only as a skip filter.
#[derive(Debug, Default)]
pub struct ResumeSet(HashSet<String>);

impl ResumeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads a previous run's output and collects the non-empty values of
    /// the identity column (normalized header name, e.g. `email` or
    /// `internalMeetingID`).
    pub fn from_output_file(path: &Path, key_column: &str) -> Result<Self> {
        let rows = worklist::load_rows(path)?;
        let keys = rows
            .iter()
            .filter_map(|row| row.get_non_empty(key_column))
            .map(str::to_string)
            .collect();
        Ok(Self(keys))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Append-only writer for result records. Records are flushed as they are
/// written so a partially-completed run still seeds the next resume.
pub struct OutputSink {
    writer: Option<csv::Writer<Box<dyn io::Write + Send>>>,
}

impl OutputSink {
    /// A sink that drops every record, for flows without a data output.
    pub fn discard() -> Self {
        Self { writer: None }
    }

    pub fn append<S: AsRef<str>>(&mut self, record: &[S]) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.write_record(record.iter().map(|field| field.as_ref()))?;
            writer.flush()?;
        }
        Ok(())
    }
}

/// Resolves an output target: existing files are read back into a resume set
/// keyed on `key_column`; new files and the console get the header record.
pub fn open(
    target: &OutputTarget,
    header: &[&str],
    key_column: &str,
) -> Result<(OutputSink, ResumeSet)> {
    match target {
        OutputTarget::Stdout => {
            let mut writer =
                csv::Writer::from_writer(Box::new(io::stdout()) as Box<dyn io::Write + Send>);
            writer.write_record(header)?;
            writer.flush()?;
            Ok((
                OutputSink {
                    writer: Some(writer),
                },
                ResumeSet::empty(),
            ))
        }
        OutputTarget::File(path) => {
            let existing = path.exists();
            let resume = if existing {
                let resume = ResumeSet::from_output_file(path, key_column)?;
                info!(
                    "appending to existing output file {} ({} keys already present)",
                    path.display(),
                    resume.len()
                );
                resume
            } else {
                info!("creating new output file {}", path.display());
                ResumeSet::empty()
            };

            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut writer =
                csv::Writer::from_writer(Box::new(file) as Box<dyn io::Write + Send>);
            if !existing {
                writer.write_record(header)?;
                writer.flush()?;
            }

            Ok((
                OutputSink {
                    writer: Some(writer),
                },
                resume,
            ))
        }
    }
}
