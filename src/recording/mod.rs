//! Cloud recording protocols
//!
//! - `list_recordings`: walks the paginated listing endpoint and maps its
//!   entries to `RecordingDescriptor`s, preserving backend order
//! - `fetch_share_link`: sets (or clears) a recording's passcode, then
//!   resolves its public share link

mod list;
mod share;

pub use list::{list_recordings, RecordingDescriptor};
pub use share::fetch_share_link;
