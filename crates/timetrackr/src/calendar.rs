//! Timezone-bound datetime values.
//!
//! A [`CalendarValue`] is created from the current instant or by parsing a
//! string with a [format pattern](crate::format), moved around with the
//! `add_*` mutators, and compared against a reference to get a
//! [`CalendarInterval`] and its human-readable rendering.
//!
//! # Parse fallback
//!
//! Construction never fails because of the text being parsed: if the text
//! does not match the pattern the value is "now" in the requested timezone.
//! A wrong date is visible in the output but does not abort a render.
//! [`CalendarValue::parse_outcome`] reports which of the two happened. Only
//! an unknown timezone name is an error.
//!
//! ```
//! use timetrackr::CalendarValue;
//!
//! let mut value = CalendarValue::on("Y-m-d H:i:s", "2021-03-14 00:02:00", Some("UTC")).unwrap();
//! value.compare_with("Y-m-d", "2021-01-01", Some("UTC")).unwrap();
//! assert_eq!(value.diff_in_human().unwrap(), "2 months, 13 days, 2 minutes ago");
//!
//! value.add_days(1).add_hours(1.5);
//! assert_eq!(value.to_string(), "2021-03-15 01:32:00");
//! ```

use std::fmt;

use chrono::{DateTime, Months, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;

use crate::config::resolve_timezone;
use crate::error::Result;
use crate::format::{self, ARRAY_SYMBOLS, DEFAULT_FORMAT};
use crate::humanize::{HumanizedResult, Humanizer};
use crate::interval::CalendarInterval;

/// A unit accepted by [`CalendarValue::add_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
    Decade,
    Century,
    Millennium,
}

impl Unit {
    /// Length in months for calendar units, `None` for fixed-length units.
    fn months(self) -> Option<f64> {
        match self {
            Unit::Month => Some(1.0),
            Unit::Year => Some(12.0),
            Unit::Decade => Some(120.0),
            Unit::Century => Some(1_200.0),
            Unit::Millennium => Some(12_000.0),
            _ => None,
        }
    }
}

/// How a parsed value came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The text matched the pattern.
    Parsed(DateTime<Tz>),
    /// The text did not match; the value is the current instant.
    FallbackToNow(DateTime<Tz>),
}

impl ParseOutcome {
    /// The resulting datetime, parsed or not.
    pub fn datetime(&self) -> DateTime<Tz> {
        match self {
            ParseOutcome::Parsed(dt) | ParseOutcome::FallbackToNow(dt) => *dt,
        }
    }

    /// True when the text did not match and the value is "now".
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::FallbackToNow(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Comparison {
    reference: DateTime<Tz>,
    interval: CalendarInterval,
}

/// A datetime bound to a timezone.
///
/// The last comparison made with [`compare_with`](Self::compare_with) is
/// kept alongside the value. It is a snapshot: moving the value afterwards
/// does not update it, compare again to refresh it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarValue {
    datetime: DateTime<Tz>,
    comparison: Option<Comparison>,
}

impl CalendarValue {
    // ── Construction ────────────────────────────────────────────────────

    /// The current instant in `timezone`, or in the configured default
    /// timezone when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackrError::InvalidTimezone`](crate::TimeTrackrError::InvalidTimezone)
    /// if the timezone name is unknown.
    pub fn now(timezone: Option<&str>) -> Result<Self> {
        Ok(Self::now_in(resolve_timezone(timezone)?))
    }

    /// The current instant in `tz`.
    pub fn now_in(tz: Tz) -> Self {
        Self::from(Utc::now().with_timezone(&tz))
    }

    /// Parse `text` with a format pattern (e.g., `"d/m/Y"`), in `timezone` or
    /// the configured default. Unparseable text gives the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackrError::InvalidTimezone`](crate::TimeTrackrError::InvalidTimezone)
    /// if the timezone name is unknown. Parse failures are not errors.
    pub fn on(format: &str, text: &str, timezone: Option<&str>) -> Result<Self> {
        Ok(Self::on_in(format, text, resolve_timezone(timezone)?))
    }

    /// [`on`](Self::on) with a resolved timezone.
    pub fn on_in(format: &str, text: &str, tz: Tz) -> Self {
        Self::from(Self::parse_outcome(format, text, tz, Utc::now()).datetime())
    }

    /// Parse `text`, falling back to `now` (viewed in `tz`) when it does not
    /// match `format`.
    pub fn parse_outcome(format: &str, text: &str, tz: Tz, now: DateTime<Utc>) -> ParseOutcome {
        match format::parse(format, text, tz, now) {
            Ok(dt) => ParseOutcome::Parsed(dt),
            Err(e) => {
                log::debug!("falling back to now: {e}");
                ParseOutcome::FallbackToNow(now.with_timezone(&tz))
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The underlying chrono datetime.
    pub fn datetime(&self) -> DateTime<Tz> {
        self.datetime
    }

    /// The timezone the value is bound to.
    pub fn timezone(&self) -> Tz {
        self.datetime.timezone()
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.datetime.timestamp()
    }

    /// Render with a format pattern.
    pub fn format(&self, pattern: &str) -> String {
        format::format(pattern, &self.datetime)
    }

    /// Every field of [`ARRAY_SYMBOLS`], keyed by symbol, in that order.
    pub fn to_array(&self) -> IndexMap<char, String> {
        ARRAY_SYMBOLS
            .iter()
            .filter_map(|&symbol| {
                format::render_symbol(symbol, &self.datetime).map(|field| (symbol, field))
            })
            .collect()
    }

    // ── Arithmetic ──────────────────────────────────────────────────────

    /// Add a signed, possibly fractional, amount of `unit`.
    ///
    /// Seconds, minutes and hours are elapsed time. Days and weeks move the
    /// calendar date and keep the time of day; a fractional day is elapsed
    /// time. Months and larger units are rounded to whole months and follow
    /// chrono's month arithmetic, so the day is clamped to the end of a
    /// shorter month (Jan 31 + 1 month = Feb 28).
    ///
    /// A result outside chrono's range leaves the value unchanged.
    pub fn add_unit(&mut self, amount: f64, unit: Unit) -> &mut Self {
        match shift(&self.datetime, amount, unit) {
            Some(dt) => self.datetime = dt,
            None => log::warn!(
                "adding {amount} {unit:?} to {} is out of range, value unchanged",
                self.datetime
            ),
        }
        self
    }

    /// Add one second.
    pub fn add_second(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Second)
    }

    /// Add elapsed seconds. Fractions are kept to the nanosecond.
    pub fn add_seconds(&mut self, seconds: impl Into<f64>) -> &mut Self {
        self.add_unit(seconds.into(), Unit::Second)
    }

    /// Add one minute.
    pub fn add_minute(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Minute)
    }

    /// Add elapsed minutes.
    pub fn add_minutes(&mut self, minutes: impl Into<f64>) -> &mut Self {
        self.add_unit(minutes.into(), Unit::Minute)
    }

    /// Add one hour.
    pub fn add_hour(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Hour)
    }

    /// Add elapsed hours; across a DST change the wall clock moves by one
    /// hour more or less.
    pub fn add_hours(&mut self, hours: impl Into<f64>) -> &mut Self {
        self.add_unit(hours.into(), Unit::Hour)
    }

    /// Move to the same time of day tomorrow.
    pub fn add_day(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Day)
    }

    /// Move by calendar days, keeping the time of day.
    ///
    /// ```
    /// use timetrackr::CalendarValue;
    ///
    /// let mut value = CalendarValue::on("Y-m-d H:i", "2021-03-14 10:00", Some("UTC")).unwrap();
    /// value.add_days(-14);
    /// assert_eq!(value.to_string(), "2021-02-28 10:00:00");
    /// ```
    pub fn add_days(&mut self, days: impl Into<f64>) -> &mut Self {
        self.add_unit(days.into(), Unit::Day)
    }

    /// Add seven days.
    pub fn add_week(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Week)
    }

    /// Move by weeks of seven calendar days.
    pub fn add_weeks(&mut self, weeks: impl Into<f64>) -> &mut Self {
        self.add_unit(weeks.into(), Unit::Week)
    }

    /// Add one month, clamping the day to the end of a shorter month.
    pub fn add_month(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Month)
    }

    /// Add months, rounded to a whole number.
    pub fn add_months(&mut self, months: impl Into<f64>) -> &mut Self {
        self.add_unit(months.into(), Unit::Month)
    }

    /// Add twelve months. Feb 29 becomes Feb 28 in a common year.
    pub fn add_year(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Year)
    }

    /// Add years, rounded to whole months (`1.5` is 18 months).
    pub fn add_years(&mut self, years: impl Into<f64>) -> &mut Self {
        self.add_unit(years.into(), Unit::Year)
    }

    /// Add ten years.
    pub fn add_decade(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Decade)
    }

    /// Add `decades * 10` years.
    pub fn add_decades(&mut self, decades: impl Into<f64>) -> &mut Self {
        self.add_unit(decades.into(), Unit::Decade)
    }

    /// Add a hundred years.
    pub fn add_century(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Century)
    }

    /// Add `centuries * 100` years.
    pub fn add_centuries(&mut self, centuries: impl Into<f64>) -> &mut Self {
        self.add_unit(centuries.into(), Unit::Century)
    }

    /// Add a thousand years.
    pub fn add_millennium(&mut self) -> &mut Self {
        self.add_unit(1.0, Unit::Millennium)
    }

    /// Add `millennia * 1000` years.
    pub fn add_millennia(&mut self, millennia: impl Into<f64>) -> &mut Self {
        self.add_unit(millennia.into(), Unit::Millennium)
    }

    // ── Comparison ──────────────────────────────────────────────────────

    /// Parse a reference with the same fallback as [`on`](Self::on) and
    /// store this value's interval against it, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`TimeTrackrError::InvalidTimezone`](crate::TimeTrackrError::InvalidTimezone)
    /// if the timezone name is unknown.
    pub fn compare_with(
        &mut self,
        format: &str,
        text: &str,
        timezone: Option<&str>,
    ) -> Result<&mut Self> {
        let reference = Self::on(format, text, timezone)?;
        Ok(self.compare_with_value(&reference))
    }

    /// Store this value's interval against another value.
    pub fn compare_with_value(&mut self, reference: &CalendarValue) -> &mut Self {
        self.comparison = Some(Comparison {
            reference: reference.datetime,
            interval: CalendarInterval::between(&self.datetime, &reference.datetime),
        });
        self
    }

    /// The interval from the last comparison.
    pub fn interval(&self) -> Option<&CalendarInterval> {
        self.comparison.as_ref().map(|c| &c.interval)
    }

    /// The reference instant of the last comparison.
    pub fn reference(&self) -> Option<DateTime<Tz>> {
        self.comparison.map(|c| c.reference)
    }

    /// Render the last comparison with a 5 second "just now" threshold.
    /// `None` until [`compare_with`](Self::compare_with) has been called.
    pub fn diff_in_human(&self) -> Option<String> {
        self.diff_in_human_with(&Humanizer::default())
    }

    /// Render the last comparison with a custom [`Humanizer`].
    pub fn diff_in_human_with(&self, humanizer: &Humanizer) -> Option<String> {
        self.humanized(humanizer).map(|result| result.text)
    }

    /// The full rendering of the last comparison.
    pub fn humanized(&self, humanizer: &Humanizer) -> Option<HumanizedResult> {
        self.interval().map(|interval| humanizer.humanize(interval))
    }
}

impl From<DateTime<Tz>> for CalendarValue {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self {
            datetime,
            comparison: None,
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` in the value's timezone.
impl fmt::Display for CalendarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_FORMAT))
    }
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn shift(dt: &DateTime<Tz>, amount: f64, unit: Unit) -> Option<DateTime<Tz>> {
    if !amount.is_finite() {
        return None;
    }
    match unit {
        Unit::Second => add_elapsed(dt, amount),
        Unit::Minute => add_elapsed(dt, amount * 60.0),
        Unit::Hour => add_elapsed(dt, amount * 3_600.0),
        Unit::Day => add_days(dt, amount),
        Unit::Week => add_days(dt, amount * 7.0),
        _ => add_months(dt, amount * unit.months()?),
    }
}

/// Add elapsed seconds, keeping nanosecond precision of the fraction.
fn add_elapsed(dt: &DateTime<Tz>, seconds: f64) -> Option<DateTime<Tz>> {
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round() as i64;
    let delta = TimeDelta::try_seconds(whole as i64)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    dt.checked_add_signed(delta)
}

fn add_days(dt: &DateTime<Tz>, days: f64) -> Option<DateTime<Tz>> {
    let whole = days.trunc();
    let date = dt
        .date_naive()
        .checked_add_signed(TimeDelta::try_days(whole as i64)?)?;
    let moved = resolve_local(dt, date.and_time(dt.time()))?;
    add_elapsed(&moved, (days - whole) * 86_400.0)
}

fn add_months(dt: &DateTime<Tz>, months: f64) -> Option<DateTime<Tz>> {
    let months = months.round();
    let count = Months::new(u32::try_from(months.abs() as i64).ok()?);
    let naive = dt.naive_local();
    let shifted = if months >= 0.0 {
        naive.checked_add_months(count)?
    } else {
        naive.checked_sub_months(count)?
    };
    resolve_local(dt, shifted)
}

/// Place a wall-clock time in `dt`'s timezone. Ambiguous times take the
/// earlier instant; a time inside a DST gap keeps `dt`'s UTC offset.
fn resolve_local(dt: &DateTime<Tz>, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    let tz = dt.timezone();
    tz.from_local_datetime(&local).earliest().or_else(|| {
        let offset = i64::from(dt.offset().fix().local_minus_utc());
        let utc = local.checked_sub_signed(TimeDelta::try_seconds(offset)?)?;
        Some(tz.from_utc_datetime(&utc))
    })
}
