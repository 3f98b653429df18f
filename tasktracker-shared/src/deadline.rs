/// Deadline string grammar
///
/// Both front doors accept deadlines as `D.M.YYYY H:MM`:
///
/// ```text
/// deadline = day "." month "." year " " hour ":" minute
/// day      = 1*2DIGIT          ; 1-31, calendar checked
/// month    = 1*2DIGIT          ; 1-12
/// year     = 4DIGIT
/// hour     = 1*2DIGIT          ; 0-23
/// minute   = 2DIGIT            ; 00-59
/// ```
///
/// Anything else is a [`ValidationError`]. Deadlines are read in the fixed
/// service calendar (UTC).
///
/// # Example
///
/// ```
/// use tasktracker_shared::deadline::{format_deadline, parse_deadline};
///
/// let deadline = parse_deadline("2.1.2026 15:04").unwrap();
/// assert_eq!(format_deadline(deadline), "02.01.2026 15:04");
/// ```

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Example shown to users in hints and error messages
pub const DEADLINE_EXAMPLE: &str = "20.1.2026 15:00";

const RENDER_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Parses a deadline string
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || {
        ValidationError::new(format!(
            "Invalid deadline \"{}\". Use D.M.YYYY HH:MM, e.g. {}",
            input, DEADLINE_EXAMPLE
        ))
    };

    let (date, time) = input.split_once(' ').ok_or_else(invalid)?;

    let mut date_parts = date.split('.');
    let day = date_parts.next().and_then(|s| number(s, 1, 2)).ok_or_else(invalid)?;
    let month = date_parts.next().and_then(|s| number(s, 1, 2)).ok_or_else(invalid)?;
    let year = date_parts.next().and_then(|s| number(s, 4, 4)).ok_or_else(invalid)?;
    if date_parts.next().is_some() {
        return Err(invalid());
    }

    let (hour, minute) = time.split_once(':').ok_or_else(invalid)?;
    let hour = number(hour, 1, 2).ok_or_else(invalid)?;
    let minute = number(minute, 2, 2).ok_or_else(invalid)?;

    let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)?;

    Ok(Utc.from_utc_datetime(&naive))
}

/// Renders a deadline the way task lists show it (`DD.MM.YYYY HH:MM`)
pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    deadline.format(RENDER_FORMAT).to_string()
}

/// ASCII digits only, length within bounds
fn number(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parts(input: &str) -> (i32, u32, u32, u32, u32) {
        let d = parse_deadline(input).expect("should parse");
        (d.year(), d.month(), d.day(), d.hour(), d.minute())
    }

    #[test]
    fn test_parses_unpadded_day_and_month() {
        assert_eq!(parts("2.1.2026 15:04"), (2026, 1, 2, 15, 4));
        assert_eq!(parts("15.02.2026 11:20"), (2026, 2, 15, 11, 20));
        assert_eq!(parts("31.12.2030 0:00"), (2030, 12, 31, 0, 0));
        assert_eq!(parts("1.1.2027 9:05"), (2027, 1, 1, 9, 5));
    }

    #[test]
    fn test_every_day_month_hour_minute_parses_back() {
        for (day, month) in [(1, 1), (9, 9), (10, 10), (28, 2), (29, 2), (30, 4), (31, 12)] {
            for (hour, minute) in [(0, 0), (7, 30), (12, 5), (23, 59)] {
                let padded = format!("{:02}.{:02}.2028 {:02}:{:02}", day, month, hour, minute);
                let bare = format!("{}.{}.2028 {}:{:02}", day, month, hour, minute);
                let expected = (2028, month, day, hour, minute);
                assert_eq!(parts(&padded), expected, "input {}", padded);
                assert_eq!(parts(&bare), expected, "input {}", bare);
            }
        }
    }

    #[test]
    fn test_format_is_accepted_by_parser() {
        let deadline = parse_deadline("2.1.2026 15:04").unwrap();
        let rendered = format_deadline(deadline);
        assert_eq!(rendered, "02.01.2026 15:04");
        assert_eq!(parse_deadline(&rendered).unwrap(), deadline);
    }

    #[test]
    fn test_rejects_other_shapes() {
        for input in [
            "",
            "apple-pie",
            "2026-02-15 11:20",
            "15.02.2026",
            "15.02.2026 11",
            "15.02.26 11:20",
            "15.02.02026 11:20",
            "15.02.2026 11:2",
            "15.02.2026 11:200",
            "15.02.2026 111:20",
            "15.02.2026  11:20",
            " 15.02.2026 11:20",
            "15.02.2026 11:20 ",
            "15/02/2026 11:20",
            "15.02.2026T11:20",
            "15.02.2026.1 11:20",
            "+5.02.2026 11:20",
            "15.02.2026 -1:20",
            "١٥.02.2026 11:20",
        ] {
            assert!(parse_deadline(input).is_err(), "should reject {:?}", input);
        }
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        for input in [
            "0.1.2026 10:00",
            "32.1.2026 10:00",
            "1.0.2026 10:00",
            "1.13.2026 10:00",
            "31.2.2026 10:00",
            "29.2.2027 10:00",
            "1.1.2026 24:00",
            "1.1.2026 10:60",
        ] {
            assert!(parse_deadline(input).is_err(), "should reject {:?}", input);
        }
    }

    #[test]
    fn test_error_mentions_expected_format() {
        let err = parse_deadline("tomorrow").unwrap_err();
        assert!(err.message().contains("D.M.YYYY HH:MM"));
    }
}
