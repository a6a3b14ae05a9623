//! Meeting provisioning and deprovisioning protocols
//!
//! Each protocol is a form-body builder plus one or two `PortalClient` calls:
//! - `create_meeting`: schedule form POST, then a page fetch for the public
//!   join link
//! - `delete_meeting`: deletion POST for a meeting recovered from a recorded
//!   join link

mod create;
mod delete;
pub mod schedule;

pub use create::{create_meeting, AudioType, AutoRecord, CreatedMeeting, MeetingRequest};
pub use delete::{deletable_meeting_id, delete_meeting};
