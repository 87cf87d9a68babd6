//! # timetrackr
//!
//! Timezone-bound datetime values with fluent calendar arithmetic and
//! human-readable relative intervals.
//!
//! A [`CalendarValue`] is built from the current instant or from a string
//! and a format pattern. Unparseable strings never fail: they produce the
//! current instant instead. Values are moved with the `add_*` family and
//! compared against a reference to render text such as
//! `"1 month, 12 days, 2 minutes ago"`, `"3 hours from now"` or `"just now"`.
//!
//! ## Modules
//!
//! - [`calendar`]: `CalendarValue` construction, arithmetic and comparison
//! - [`interval`]: Calendar-field difference between two instants
//! - [`humanize`]: Rendering intervals as English text
//! - [`format`]: Date format patterns for parsing and rendering
//! - [`config`]: Process-wide default timezone
//! - [`error`]: Error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod format;
pub mod humanize;
pub mod interval;

pub use calendar::{CalendarValue, ParseOutcome, Unit};
pub use config::Config;
pub use error::TimeTrackrError;
pub use humanize::{HumanizedResult, Humanizer};
pub use interval::{CalendarInterval, Direction, Field};
