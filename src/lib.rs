pub mod batch;
pub mod config;
pub mod error;
pub mod meeting;
pub mod portal;
pub mod recording;
pub mod session;

pub use batch::{
    BatchRunner, OutputSink, OutputTarget, ResumeSet, Row, RowOperation, RowOutcome, RunSummary,
    ERROR_MARKER,
};
pub use config::{PortalSettings, ScheduleDefaults};
pub use error::{Error, Result};
pub use meeting::{CreatedMeeting, MeetingRequest};
pub use portal::{ApiEnvelope, CsrfPolicy, PortalClient, RequestOptions};
pub use recording::RecordingDescriptor;
pub use session::SessionContext;
