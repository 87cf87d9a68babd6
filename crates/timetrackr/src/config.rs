//! Default timezone configuration.
//!
//! Values created without an explicit timezone use the process-wide default
//! installed here. The default is written at most once, normally at startup,
//! and read without locking afterwards. Until [`init`] is called the default
//! is UTC.
//!
//! ```
//! use timetrackr::config::Config;
//!
//! let config = Config::from_json(r#"{"timezone": "Asia/Kuala_Lumpur"}"#).unwrap();
//! assert_eq!(config.timezone, "Asia/Kuala_Lumpur");
//! ```

use std::sync::OnceLock;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeTrackrError};

/// Environment variable read by [`Config::from_env`].
pub const TIMEZONE_ENV: &str = "TIMETRACKR_TIMEZONE";

/// Timezone used when nothing has been configured.
pub const DEFAULT_TIMEZONE: &str = "UTC";

static DEFAULT: OnceLock<Config> = OnceLock::new();

/// Library configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone name (e.g., `"Europe/Paris"`).
    #[serde(default = "default_timezone_name")]
    pub timezone: String,
}

fn default_timezone_name() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone_name(),
        }
    }
}

impl Config {
    /// Build a configuration for the given IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackrError::InvalidTimezone`] if the name is unknown.
    pub fn new(timezone: &str) -> Result<Self> {
        parse_timezone(timezone)?;
        Ok(Self {
            timezone: timezone.to_string(),
        })
    }

    /// Read a configuration from a JSON document such as
    /// `{"timezone": "America/New_York"}`. A missing `timezone` key means UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackrError::InvalidConfig`] for malformed JSON and
    /// [`TimeTrackrError::InvalidTimezone`] for an unknown timezone.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| TimeTrackrError::InvalidConfig(e.to_string()))?;
        parse_timezone(&config.timezone)?;
        Ok(config)
    }

    /// Read the timezone from `TIMETRACKR_TIMEZONE`, falling back to UTC when
    /// the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        match std::env::var(TIMEZONE_ENV) {
            Ok(name) if !name.trim().is_empty() => Self::new(name.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// The configured timezone.
    pub fn tz(&self) -> Tz {
        // Validated by the constructors and by `init`; a hand-built Config
        // with a bad name degrades to UTC.
        self.timezone.parse().unwrap_or(Tz::UTC)
    }
}

/// Install the process-wide default timezone.
///
/// # Errors
///
/// Returns [`TimeTrackrError::InvalidTimezone`] if `config.timezone` is not
/// an IANA name, and [`TimeTrackrError::AlreadyConfigured`] if a default was
/// already installed.
pub fn init(config: Config) -> Result<()> {
    let timezone = parse_timezone(&config.timezone)?;
    DEFAULT
        .set(config)
        .map_err(|_| TimeTrackrError::AlreadyConfigured)?;
    log::info!("default timezone set to {}", timezone.name());
    Ok(())
}

/// The installed default timezone, or UTC.
pub fn default_timezone() -> Tz {
    DEFAULT.get().map(Config::tz).unwrap_or(Tz::UTC)
}

/// Resolve an optional timezone name, falling back to the default.
pub(crate) fn resolve_timezone(timezone: Option<&str>) -> Result<Tz> {
    match timezone {
        Some(name) => parse_timezone(name),
        None => Ok(default_timezone()),
    }
}

/// Parse an IANA timezone string into `Tz`.
pub(crate) fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| TimeTrackrError::InvalidTimezone(format!("'{}'", s)))
}
