//! Calendar-field difference between two instants.
//!
//! An interval is not a flat division of elapsed seconds: "1 month, 3 days"
//! means one calendar month and three days on the subject's wall clock, so
//! its length depends on which months it spans.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDateTime, SubsecRound};
use chrono_tz::Tz;
use serde::Serialize;

/// Whether the subject lies after ("ago") or before ("from now") the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The subject is at or after the reference.
    Ago,
    /// The subject is before the reference.
    FromNow,
}

impl Direction {
    /// The suffix appended to a rendered interval.
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Ago => "ago",
            Direction::FromNow => "from now",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One of the six interval fields, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Field {
    /// All fields, largest to smallest.
    pub const ALL: [Field; 6] = [
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Hour,
        Field::Minute,
        Field::Second,
    ];

    /// English label for a magnitude of this field.
    pub fn label(self, singular: bool) -> &'static str {
        match (self, singular) {
            (Field::Year, true) => "year",
            (Field::Year, false) => "years",
            (Field::Month, true) => "month",
            (Field::Month, false) => "months",
            (Field::Day, true) => "day",
            (Field::Day, false) => "days",
            (Field::Hour, true) => "hour",
            (Field::Hour, false) => "hours",
            (Field::Minute, true) => "minute",
            (Field::Minute, false) => "minutes",
            (Field::Second, true) => "second",
            (Field::Second, false) => "seconds",
        }
    }

    /// The interval format symbol for this field (`y m d h i s`).
    pub fn symbol(self) -> char {
        match self {
            Field::Year => 'y',
            Field::Month => 'm',
            Field::Day => 'd',
            Field::Hour => 'h',
            Field::Minute => 'i',
            Field::Second => 's',
        }
    }

    /// Look a field up by its interval format symbol.
    pub fn from_symbol(symbol: char) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.symbol() == symbol)
    }
}

/// The calendar difference between a subject and a reference instant.
///
/// Magnitudes are never negative; the sign lives in [`delta_seconds`]
/// (`subject - reference` in whole seconds).
///
/// [`delta_seconds`]: CalendarInterval::delta_seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalendarInterval {
    pub years: u32,
    /// 0-11
    pub months: u32,
    /// 0-30
    pub days: u32,
    /// 0-23
    pub hours: u32,
    /// 0-59
    pub minutes: u32,
    /// 0-59
    pub seconds: u32,
    /// Signed elapsed seconds from the reference to the subject.
    pub delta_seconds: i64,
}

impl CalendarInterval {
    /// Compute the interval of `subject` relative to `reference`.
    ///
    /// The reference is viewed in the subject's timezone and both are
    /// truncated to whole seconds. The difference is measured on that wall
    /// clock, from the earlier of the two to the later: whole calendar months
    /// first, then days, hours, minutes and seconds. When the wall clocks
    /// disagree with the instants (two readings of a repeated hour after a
    /// DST fall-back), the difference is measured on UTC instead.
    ///
    /// ```
    /// use chrono::TimeZone;
    /// use chrono_tz::Tz;
    /// use timetrackr::{CalendarInterval, Direction};
    ///
    /// let subject = Tz::UTC.with_ymd_and_hms(2021, 3, 14, 0, 2, 0).unwrap();
    /// let reference = Tz::UTC.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    /// let interval = CalendarInterval::between(&subject, &reference);
    /// assert_eq!((interval.months, interval.days, interval.minutes), (2, 13, 2));
    /// assert_eq!(interval.direction(), Direction::Ago);
    /// ```
    pub fn between(subject: &DateTime<Tz>, reference: &DateTime<Tz>) -> Self {
        let tz = subject.timezone();
        let delta_seconds = subject.timestamp() - reference.timestamp();
        let subject_local = subject.naive_local().trunc_subsecs(0);
        let reference_local = reference.with_timezone(&tz).naive_local().trunc_subsecs(0);

        // Across a DST fall-back the wall clocks can tie or run backwards.
        let (subject_clock, reference_clock) =
            if subject_local.cmp(&reference_local) == delta_seconds.cmp(&0) {
                (subject_local, reference_local)
            } else {
                (
                    subject.naive_utc().trunc_subsecs(0),
                    reference.naive_utc().trunc_subsecs(0),
                )
            };

        let (earlier, later) = if delta_seconds >= 0 {
            (reference_clock, subject_clock)
        } else {
            (subject_clock, reference_clock)
        };

        let mut interval = decompose(&earlier, &later);
        interval.delta_seconds = delta_seconds;
        interval
    }

    /// `Ago` when the subject is at or after the reference.
    pub fn direction(&self) -> Direction {
        if self.delta_seconds >= 0 {
            Direction::Ago
        } else {
            Direction::FromNow
        }
    }

    /// Magnitude of one field.
    pub fn get(&self, field: Field) -> u32 {
        match field {
            Field::Year => self.years,
            Field::Month => self.months,
            Field::Day => self.days,
            Field::Hour => self.hours,
            Field::Minute => self.minutes,
            Field::Second => self.seconds,
        }
    }

    /// All six fields, largest to smallest.
    pub fn fields(&self) -> [(Field, u32); 6] {
        Field::ALL.map(|field| (field, self.get(field)))
    }

    /// True when every field is zero (equal to the second).
    pub fn is_zero(&self) -> bool {
        self.fields().iter().all(|&(_, n)| n == 0)
    }
}

/// Calendar difference of two wall clocks, `earlier <= later`.
///
/// Whole months come first: the largest `n` with `earlier + n months <=
/// later` under chrono's month arithmetic (day clamped to the month's last
/// day). The rest is split into days, hours, minutes and seconds.
fn decompose(earlier: &NaiveDateTime, later: &NaiveDateTime) -> CalendarInterval {
    let estimate = (i64::from(later.year()) - i64::from(earlier.year())) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());

    let mut total_months = u32::try_from(estimate.max(0)).unwrap_or(u32::MAX);
    let anchor = loop {
        match earlier.checked_add_months(Months::new(total_months)) {
            Some(anchor) if anchor <= *later => break anchor,
            _ if total_months > 0 => total_months -= 1,
            _ => break *earlier,
        }
    };

    let rest = (*later - anchor).num_seconds();
    let clamp = |n: i64| u32::try_from(n.max(0)).unwrap_or(u32::MAX);

    CalendarInterval {
        years: total_months / 12,
        months: total_months % 12,
        days: clamp(rest / 86_400),
        hours: clamp(rest % 86_400 / 3_600),
        minutes: clamp(rest % 3_600 / 60),
        seconds: clamp(rest % 60),
        delta_seconds: 0,
    }
}
