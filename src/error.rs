use std::io;

use thiserror::Error;

/// Error type for portal-driven batch runs.
///
/// `Config` variants are fatal and abort a run before any row is processed;
/// every other variant is scoped to the row (or page) that raised it and is
/// caught at the batch runner's per-row boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid field: {0}")]
    Validation(String),
    #[error("HTTP {status} ({url})")]
    Http { status: u16, url: String },
    #[error("portal error: {message} (code: {code})")]
    Api { code: i64, message: String },
    #[error("session expired, log in and update your cookies")]
    SessionExpired,
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
