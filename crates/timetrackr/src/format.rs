//! Date format patterns.
//!
//! Patterns are written with single-letter symbols (`"Y-m-d H:i:s"`,
//! `"d/m/Y"`, `"D, jS F Y"`). Every character that is not a symbol is copied
//! or matched literally, and `\` escapes the character after it.
//!
//! Parsing translates a pattern into chrono strftime items. Rendering maps
//! each symbol directly onto the datetime's fields.
//!
//! # Symbols
//!
//! | Symbol | Field | Parse |
//! |---|---|---|
//! | `d` `j` | day of month, padded / unpadded | yes |
//! | `D` `l` | weekday, short / full | yes |
//! | `N` | ISO weekday, 1 (Monday) to 7 | no |
//! | `S` | English ordinal suffix of the day | no |
//! | `m` `n` | month number, padded / unpadded | yes |
//! | `M` `F` | month name, short / full | yes |
//! | `Y` `y` | year, 4 / 2 digits | yes |
//! | `H` `G` | 24-hour clock, padded / unpadded | yes |
//! | `h` `g` | 12-hour clock, padded / unpadded | yes |
//! | `i` `s` | minutes, seconds | yes |
//! | `v` `u` | milliseconds (3 digits), microseconds (6 digits) | yes |
//! | `A` `a` | `AM`/`PM`, `am`/`pm` | yes |
//! | `e` `T` `P` | timezone name, abbreviation, offset | no |
//! | `U` | seconds since the Unix epoch | yes |
//! | `r` `c` | RFC 2822 / ISO 8601 datetime | no |
//! | `!` `\|` | take missing date fields from the Unix epoch | yes |
//!
//! A two-digit `y` is read with a pivot at 70: `69` is 2069, `70` is 1970.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, TimeTrackrError};

/// The canonical pattern used by `Display`: `YYYY-MM-DD HH:MM:SS`.
pub const DEFAULT_FORMAT: &str = "Y-m-d H:i:s";

/// Symbols exposed by [`CalendarValue::to_array`](crate::CalendarValue::to_array),
/// in order.
pub const ARRAY_SYMBOLS: [char; 15] = [
    'r', 'D', 'd', 'S', 'm', 'M', 'F', 'y', 'Y', 'h', 'H', 'i', 's', 'A', 'a',
];

// ── Parsing ─────────────────────────────────────────────────────────────────

/// A pattern translated into a chrono strftime string, plus which fields it
/// supplies.
#[derive(Debug, Default)]
struct Translated {
    strftime: String,
    has_day: bool,
    has_month: bool,
    has_year: bool,
    has_hour: bool,
    has_minute: bool,
    twelve_hour: bool,
    has_meridiem: bool,
    has_timestamp: bool,
    /// `!` or `|`: missing date fields come from the Unix epoch, not today.
    reset: bool,
}

fn translate(pattern: &str) -> Result<Translated> {
    let mut out = Translated::default();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        let item = match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_literal(&mut out.strftime, escaped);
                }
                continue;
            }
            '!' | '|' => {
                out.reset = true;
                continue;
            }
            'd' | 'j' => {
                out.has_day = true;
                "%d"
            }
            'm' | 'n' => {
                out.has_month = true;
                "%m"
            }
            'M' => {
                out.has_month = true;
                "%b"
            }
            'F' => {
                out.has_month = true;
                "%B"
            }
            'Y' => {
                out.has_year = true;
                "%Y"
            }
            'y' => {
                out.has_year = true;
                "%y"
            }
            'D' => "%a",
            'l' => "%A",
            'H' | 'G' => {
                out.has_hour = true;
                "%H"
            }
            'h' | 'g' => {
                out.has_hour = true;
                out.twelve_hour = true;
                "%I"
            }
            'i' => {
                out.has_minute = true;
                "%M"
            }
            's' => "%S",
            'v' => "%3f",
            'u' => "%6f",
            'A' | 'a' => {
                out.has_meridiem = true;
                "%p"
            }
            'U' => {
                out.has_timestamp = true;
                "%s"
            }
            c if c.is_ascii_alphabetic() => {
                return Err(TimeTrackrError::InvalidDatetime(format!(
                    "format symbol '{c}' is not supported for parsing in '{pattern}'"
                )));
            }
            c => {
                push_literal(&mut out.strftime, c);
                continue;
            }
        };
        out.strftime.push_str(item);
    }

    Ok(out)
}

fn push_literal(buf: &mut String, ch: char) {
    if ch == '%' {
        buf.push_str("%%");
    } else {
        buf.push(ch);
    }
}

/// Parse `text` according to `pattern`, interpreting wall-clock fields in `tz`.
///
/// Fields the pattern does not mention are filled in: the time of day
/// defaults to midnight, and missing year, month or day fields are taken
/// from today's date (in `tz`, from `now`). A `!` or `|` anywhere in the
/// pattern takes them from the Unix epoch instead (1970-01-01). A 12-hour
/// clock without `A`/`a` reads as AM. Two-digit years 00-69 are 2000-2069,
/// 70-99 are 1970-1999. A pattern of `U` reads seconds since the Unix epoch.
///
/// # Errors
///
/// Returns [`TimeTrackrError::InvalidDatetime`] if the pattern uses a symbol
/// that cannot be parsed, the text does not match the pattern, a field is
/// out of range, or the local time does not exist in `tz` (DST gap).
/// Ambiguous local times resolve to the earlier instant.
pub fn parse(pattern: &str, text: &str, tz: Tz, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
    let translated = translate(pattern)?;
    let mismatch = |e: chrono::ParseError| {
        TimeTrackrError::InvalidDatetime(format!("'{text}' does not match '{pattern}': {e}"))
    };

    if translated.has_timestamp {
        let naive = NaiveDateTime::parse_from_str(text, &translated.strftime).map_err(mismatch)?;
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(&tz));
    }

    let base = if translated.reset {
        DateTime::<Utc>::UNIX_EPOCH.date_naive()
    } else {
        now.with_timezone(&tz).date_naive()
    };

    let mut strftime = String::new();
    let mut input = String::new();
    if !translated.has_year {
        strftime.push_str("%Y ");
        input.push_str(&format!("{:04} ", base.year()));
    }
    if !translated.has_month {
        strftime.push_str("%m ");
        input.push_str(&format!("{:02} ", base.month()));
    }
    if !translated.has_day {
        strftime.push_str("%d ");
        input.push_str(&format!("{:02} ", base.day()));
    }
    strftime.push_str(&translated.strftime);
    input.push_str(text);

    if !translated.has_hour {
        strftime.push_str(" %H");
        input.push_str(" 00");
    }
    if !translated.has_minute {
        strftime.push_str(" %M");
        input.push_str(" 00");
    }
    if translated.twelve_hour && !translated.has_meridiem {
        strftime.push_str(" %p");
        input.push_str(" AM");
    }

    let naive = NaiveDateTime::parse_from_str(&input, &strftime).map_err(mismatch)?;
    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        TimeTrackrError::InvalidDatetime(format!(
            "'{text}' does not exist in {} (DST gap)",
            tz.name()
        ))
    })
}

// ── Rendering ───────────────────────────────────────────────────────────────

/// Render a single format symbol, or `None` if `symbol` is not one.
pub fn render_symbol(symbol: char, dt: &DateTime<Tz>) -> Option<String> {
    let rendered = match symbol {
        'd' => format!("{:02}", dt.day()),
        'j' => dt.day().to_string(),
        'D' => dt.format("%a").to_string(),
        'l' => dt.format("%A").to_string(),
        'N' => dt.weekday().number_from_monday().to_string(),
        'S' => ordinal_suffix(dt.day()).to_string(),
        'm' => format!("{:02}", dt.month()),
        'n' => dt.month().to_string(),
        'M' => dt.format("%b").to_string(),
        'F' => dt.format("%B").to_string(),
        'Y' => format!("{:04}", dt.year()),
        'y' => format!("{:02}", dt.year().rem_euclid(100)),
        'H' => format!("{:02}", dt.hour()),
        'G' => dt.hour().to_string(),
        'h' => format!("{:02}", dt.hour12().1),
        'g' => dt.hour12().1.to_string(),
        'i' => format!("{:02}", dt.minute()),
        's' => format!("{:02}", dt.second()),
        'v' => format!("{:03}", dt.nanosecond() % 1_000_000_000 / 1_000_000),
        'u' => format!("{:06}", dt.nanosecond() % 1_000_000_000 / 1_000),
        'A' => meridiem(dt).to_string(),
        'a' => meridiem(dt).to_lowercase(),
        'e' => dt.timezone().name().to_string(),
        'T' => dt.format("%Z").to_string(),
        'P' => dt.format("%:z").to_string(),
        'U' => dt.timestamp().to_string(),
        'r' => dt.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
        'c' => dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        _ => return None,
    };
    Some(rendered)
}

/// Render a datetime with a pattern.
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Tz;
/// use timetrackr::format::format;
///
/// let dt = Tz::UTC.with_ymd_and_hms(2021, 3, 1, 14, 5, 0).unwrap();
/// assert_eq!(format("D, jS F Y g:i a", &dt), "Mon, 1st March 2021 2:05 pm");
/// ```
pub fn format(pattern: &str, dt: &DateTime<Tz>) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        match render_symbol(ch, dt) {
            Some(rendered) => out.push_str(&rendered),
            None => out.push(ch),
        }
    }

    out
}

fn meridiem(dt: &DateTime<Tz>) -> &'static str {
    if dt.hour12().0 {
        "PM"
    } else {
        "AM"
    }
}

/// English ordinal suffix for a day of month (1st, 2nd, 3rd, 11th, 22nd).
fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 17, 9, 30, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    // ── parse ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_default_format() {
        let dt = parse(DEFAULT_FORMAT, "2021-03-14 00:02:00", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 2, 0));
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let dt = parse("d/m/Y", "14/03/2021", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 0, 0));
    }

    #[test]
    fn test_parse_unpadded_fields() {
        let dt = parse("j/n/Y G:i", "4/7/2021 9:05", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 7, 4, 9, 5, 0));
    }

    #[test]
    fn test_parse_time_only_uses_today() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        // 09:30 UTC on Feb 17 is 18:30 on Feb 17 in Tokyo.
        let dt = parse("H:i", "07:15", tz, anchor()).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert_eq!((dt.hour(), dt.minute()), (7, 15));
    }

    #[test]
    fn test_parse_twelve_hour_clock() {
        let dt = parse("Y-m-d h:i A", "2021-03-14 02:30 PM", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 14, 30, 0));

        let dt = parse("Y-m-d g:ia", "2021-03-14 12:10am", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 10, 0));
    }

    #[test]
    fn test_parse_month_names() {
        let dt = parse("d M Y", "01 Feb 2020", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2020, 2, 1, 0, 0, 0));

        let dt = parse("F j, Y", "December 25, 2020", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2020, 12, 25, 0, 0, 0));
    }

    #[test]
    fn test_parse_epoch_timestamp() {
        let dt = parse("U", "1609459200", Tz::America__New_York, anchor()).unwrap();
        assert_eq!(dt.timestamp(), 1_609_459_200);
        assert_eq!(dt.timezone(), Tz::America__New_York);
    }

    #[test]
    fn test_parse_wall_clock_in_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = parse(DEFAULT_FORMAT, "2026-01-15 09:00:00", tz, anchor()).unwrap();
        // EST is UTC-5
        assert_eq!(dt.with_timezone(&Utc), Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_escaped_literal() {
        let dt = parse("Y-m-d\\TH:i", "2021-03-14T10:00", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 10, 0, 0));
    }

    #[test]
    fn test_parse_mismatch_is_error() {
        let err = parse("d/m/Y", "not-a-date", Tz::UTC, anchor()).unwrap_err();
        assert!(matches!(err, TimeTrackrError::InvalidDatetime(_)));
    }

    #[test]
    fn test_parse_out_of_range_is_error() {
        assert!(parse("d/m/Y", "31/02/2021", Tz::UTC, anchor()).is_err());
        assert!(parse(DEFAULT_FORMAT, "2021-01-01 25:00:00", Tz::UTC, anchor()).is_err());
    }

    #[test]
    fn test_parse_unsupported_symbol_is_error() {
        let err = parse("jS F Y", "1st March 2021", Tz::UTC, anchor()).unwrap_err();
        assert!(err.to_string().contains("'S'"));
    }

    #[test]
    fn test_parse_dst_gap_is_error() {
        // March 8, 2026: New York skips from 02:00 to 03:00.
        let tz: Tz = "America/New_York".parse().unwrap();
        assert!(parse(DEFAULT_FORMAT, "2026-03-08 02:30:00", tz, anchor()).is_err());
    }

    #[test]
    fn test_parse_dst_overlap_takes_earlier() {
        // November 1, 2026: 01:30 happens twice in New York.
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = parse(DEFAULT_FORMAT, "2026-11-01 01:30:00", tz, anchor()).unwrap();
        assert_eq!(dt.format("%:z").to_string(), "-04:00");
    }

    #[test]
    fn test_parse_twelve_hour_without_meridiem_is_am() {
        let dt = parse("Y-m-d h:i", "2021-03-14 02:30", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 2, 30, 0));

        let dt = parse("Y-m-d g", "2021-03-14 12", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 0, 0));
    }

    #[test]
    fn test_parse_reset_takes_epoch_date() {
        let dt = parse("!d/m/Y", "14/03/2021", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 0, 0));

        let dt = parse("!H:i", "07:15", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(1970, 1, 1, 7, 15, 0));

        let dt = parse("Y-m|", "2021-05", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 5, 1, 0, 0, 0));
    }

    #[test]
    fn test_parse_partial_date_uses_today() {
        let dt = parse("d/m", "04/07", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2026, 7, 4, 0, 0, 0));
    }

    #[test]
    fn test_parse_escaped_reset_is_literal() {
        let dt = parse("\\!d/m/Y", "!14/03/2021", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt, utc(2021, 3, 14, 0, 0, 0));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let dt = parse("Y-m-d H:i:s.u", "2021-03-14 10:00:05.123456", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt.nanosecond(), 123_456_000);

        let dt = parse("Y-m-d H:i:s.v", "2021-03-14 10:00:05.250", Tz::UTC, anchor()).unwrap();
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_two_digit_year_pivot() {
        let year = |text: &str| parse("d/m/y", text, Tz::UTC, anchor()).unwrap().year();
        assert_eq!(year("01/01/00"), 2000);
        assert_eq!(year("01/01/68"), 2068);
        assert_eq!(year("01/01/69"), 2069);
        assert_eq!(year("01/01/70"), 1970);
        assert_eq!(year("01/01/99"), 1999);
    }

    // ── render ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_default() {
        assert_eq!(format(DEFAULT_FORMAT, &utc(2021, 3, 4, 5, 6, 7)), "2021-03-04 05:06:07");
    }

    #[test]
    fn test_render_symbols() {
        let dt = utc(2000, 12, 21, 16, 1, 7);
        assert_eq!(render_symbol('r', &dt).unwrap(), "Thu, 21 Dec 2000 16:01:07 +0000");
        assert_eq!(render_symbol('D', &dt).unwrap(), "Thu");
        assert_eq!(render_symbol('l', &dt).unwrap(), "Thursday");
        assert_eq!(render_symbol('N', &dt).unwrap(), "4");
        assert_eq!(render_symbol('S', &dt).unwrap(), "st");
        assert_eq!(render_symbol('M', &dt).unwrap(), "Dec");
        assert_eq!(render_symbol('F', &dt).unwrap(), "December");
        assert_eq!(render_symbol('y', &dt).unwrap(), "00");
        assert_eq!(render_symbol('h', &dt).unwrap(), "04");
        assert_eq!(render_symbol('g', &dt).unwrap(), "4");
        assert_eq!(render_symbol('H', &dt).unwrap(), "16");
        assert_eq!(render_symbol('A', &dt).unwrap(), "PM");
        assert_eq!(render_symbol('a', &dt).unwrap(), "pm");
        assert_eq!(render_symbol('c', &dt).unwrap(), "2000-12-21T16:01:07+00:00");
        assert_eq!(render_symbol('U', &dt).unwrap(), "977414467");
        assert_eq!(render_symbol('u', &dt).unwrap(), "000000");
        assert_eq!(render_symbol('v', &dt).unwrap(), "000");
        assert!(render_symbol('-', &dt).is_none());
    }

    #[test]
    fn test_render_timezone_symbols() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = tz.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        assert_eq!(render_symbol('e', &dt).unwrap(), "America/New_York");
        assert_eq!(render_symbol('T', &dt).unwrap(), "EST");
        assert_eq!(render_symbol('P', &dt).unwrap(), "-05:00");
    }

    #[test]
    fn test_midnight_and_noon_twelve_hour() {
        let midnight = utc(2021, 1, 1, 0, 0, 0);
        assert_eq!(format("h A", &midnight), "12 AM");
        let noon = utc(2021, 1, 1, 12, 0, 0);
        assert_eq!(format("g a", &noon), "12 pm");
    }

    #[test]
    fn test_ordinal_suffixes() {
        let suffixes: Vec<&str> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .iter()
            .map(|&d| ordinal_suffix(d))
            .collect();
        assert_eq!(
            suffixes,
            ["st", "nd", "rd", "th", "th", "th", "th", "st", "nd", "rd", "st"]
        );
    }

    #[test]
    fn test_format_escapes() {
        let dt = utc(2021, 3, 14, 10, 0, 0);
        assert_eq!(format("\\D\\a\\y: j", &dt), "Day: 14");
    }
}
