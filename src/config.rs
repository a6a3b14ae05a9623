use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Origin used when none is configured.
pub const DEFAULT_ORIGIN: &str = "https://berkeley.zoom.us";

/// User agent presented to the portal by default. The portal serves
/// different markup to unrecognized agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.131 Safari/537.36";

/// Default delay between consecutive portal requests, in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Portal connection settings shared by every flow.
///
/// Layered from an optional `bulk-meetings.toml` over the defaults above;
/// command-line flags are applied on top by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Portal origin requests are resolved against
    pub origin: String,

    /// Browser user agent presented on every request
    pub user_agent: String,

    /// Fixed delay between consecutive requests, in milliseconds
    pub interval_ms: u64,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl PortalSettings {
    /// Loads settings, reading `<name>.toml` when it exists.
    pub fn load(name: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Global scheduling knobs, merged with per-row overrides by the generate
/// flow.
#[derive(Debug, Clone)]
pub struct ScheduleDefaults {
    /// Topic template; `@` is replaced with the row's email
    pub topic: String,

    /// Agenda template; `@` is replaced with the row's email
    pub description: Option<String>,

    /// Raw start value, resolved per row (unset means now)
    pub when: Option<String>,

    /// Minutes; 0 schedules the meeting without a fixed date/time
    pub duration_minutes: u32,

    /// IANA timezone the schedule is rendered in
    pub timezone: String,

    /// Add each row's email as an alternate host
    pub cohost: bool,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            topic: "Meeting (@)".to_string(),
            description: None,
            when: None,
            duration_minutes: 0,
            timezone: "UTC".to_string(),
            cohost: false,
        }
    }
}
