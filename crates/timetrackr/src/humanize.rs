//! Human-readable rendering of a [`CalendarInterval`].
//!
//! Non-zero fields are written largest to smallest (`"1 month, 12 days,
//! 2 minutes ago"`), followed by "ago" or "from now". Two cases collapse to
//! the "just now" text instead:
//!
//! - every field is zero (the instants are equal to the second);
//! - the subject is in the past and seconds is the only non-zero field, with
//!   a magnitude at or below the threshold.
//!
//! The threshold only ever applies to a bare seconds count. `"1 minute,
//! 2 seconds ago"` is rendered as is, and so is anything "from now".

use std::fmt;

use serde::Serialize;

use crate::interval::{CalendarInterval, Direction, Field};

/// Default "just now" threshold, in seconds.
pub const DEFAULT_JUST_NOW_SECONDS: i64 = 5;

/// Default text for intervals that read as "just now".
pub const DEFAULT_JUST_NOW_TEXT: &str = "just now";

/// Renders intervals with a configurable "just now" threshold and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Humanizer {
    just_now_seconds: i64,
    just_now_text: String,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self {
            just_now_seconds: DEFAULT_JUST_NOW_SECONDS,
            just_now_text: DEFAULT_JUST_NOW_TEXT.to_string(),
        }
    }
}

impl Humanizer {
    /// A humanizer with the given threshold (in seconds) and "just now" text.
    pub fn new(just_now_seconds: i64, just_now_text: impl Into<String>) -> Self {
        Self {
            just_now_seconds,
            just_now_text: just_now_text.into(),
        }
    }

    /// Seconds-only intervals up to this many seconds read as "just now".
    /// A negative value disables the threshold.
    pub fn with_just_now_seconds(mut self, seconds: i64) -> Self {
        self.just_now_seconds = seconds;
        self
    }

    /// Replace the "just now" text.
    pub fn with_just_now_text(mut self, text: impl Into<String>) -> Self {
        self.just_now_text = text.into();
        self
    }

    /// The "just now" threshold, in seconds.
    pub fn just_now_seconds(&self) -> i64 {
        self.just_now_seconds
    }

    /// The text returned for intervals that read as "just now".
    pub fn just_now_text(&self) -> &str {
        &self.just_now_text
    }

    /// Render an interval.
    ///
    /// ```
    /// use timetrackr::{CalendarInterval, Humanizer};
    ///
    /// let interval = CalendarInterval {
    ///     months: 1,
    ///     days: 12,
    ///     minutes: 2,
    ///     delta_seconds: 3_456_120,
    ///     ..Default::default()
    /// };
    /// let result = Humanizer::default().humanize(&interval);
    /// assert_eq!(result.to_string(), "1 month, 12 days, 2 minutes ago");
    /// ```
    pub fn humanize(&self, interval: &CalendarInterval) -> HumanizedResult {
        let parts: Vec<(Field, u32)> = interval
            .fields()
            .into_iter()
            .filter(|&(_, n)| n != 0)
            .collect();

        if parts.is_empty() {
            return self.just_now(interval);
        }

        let direction = interval.direction();
        if direction == Direction::Ago {
            if let [(Field::Second, seconds)] = parts.as_slice() {
                if i64::from(*seconds) <= self.just_now_seconds {
                    return self.just_now(interval);
                }
            }
        }

        let joined = parts
            .iter()
            .map(|&(field, n)| format!("{} {}", n, field.label(n == 1)))
            .collect::<Vec<_>>()
            .join(", ");

        HumanizedResult {
            text: format!("{} {}", joined, direction.suffix()),
            suffix: Some(direction),
            interval: *interval,
        }
    }

    fn just_now(&self, interval: &CalendarInterval) -> HumanizedResult {
        HumanizedResult {
            text: self.just_now_text.clone(),
            suffix: None,
            interval: *interval,
        }
    }
}

/// A rendered interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HumanizedResult {
    /// The rendered text (e.g., "3 hours from now").
    pub text: String,
    /// The suffix used, or `None` when the "just now" text was returned.
    pub suffix: Option<Direction>,
    /// The interval the text was rendered from.
    pub interval: CalendarInterval,
}

impl fmt::Display for HumanizedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
