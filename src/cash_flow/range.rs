//! Date-range helpers for the cash flow report.
//!
//! Turns the requested months into a concrete [DateRange] and generates the
//! dense sequence of bucket dates for a [Granularity].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Month, macros::format_description};

use crate::Error;

/// The size of each bucket in the cash flow report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// One bucket per calendar day, keyed `YYYY-MM-DD`.
    Daily,
    /// One bucket per calendar month, keyed `YYYY-MM`.
    #[default]
    Monthly,
}

impl Granularity {
    /// The value used for this granularity in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::InvalidGranularity(other.to_owned())),
        }
    }
}

/// An inclusive range of dates.
///
/// Ranges produced by [resolve_date_range] always satisfy `start <= end` and
/// never extend past the `today` they were resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range.
    pub end: Date,
}

/// Resolves a month range into concrete start and end dates.
///
/// `start` is the first day of `start_month` and `end` is the last day of
/// `end_month`, clamped to `today`. Months are written as `YYYY-MM`; a full
/// `YYYY-MM-DD` date is also accepted and refers to the month containing it.
///
/// The granularity does not change the resolved range, whole months are
/// always requested. It is accepted so callers resolve and accumulate with
/// the same arguments.
///
/// # Errors
/// Returns [Error::InvalidRange] if either month cannot be parsed or if the
/// start is after the clamped end, e.g. when `start_month` is in the future.
pub fn resolve_date_range(
    start_month: &str,
    end_month: &str,
    _granularity: Granularity,
    today: Date,
) -> Result<DateRange, Error> {
    let (start_year, start_month_value) = parse_month(start_month)
        .ok_or_else(|| Error::InvalidRange(format!("invalid start month \"{start_month}\"")))?;
    let (end_year, end_month_value) = parse_month(end_month)
        .ok_or_else(|| Error::InvalidRange(format!("invalid end month \"{end_month}\"")))?;

    let start = month_bounds(start_year, start_month_value)?.start;
    let nominal_end = month_bounds(end_year, end_month_value)?.end;
    let end = nominal_end.min(today);

    if start > end {
        return Err(Error::InvalidRange(format!(
            "start {start} is after end {end}"
        )));
    }

    Ok(DateRange { start, end })
}

/// Generates every bucket date in `range`, in ascending order.
///
/// For [Granularity::Monthly] this is the first day of each month from the
/// month containing `range.start` to the month containing `range.end`. For
/// [Granularity::Daily] it is every day from `range.start` to `range.end`
/// inclusive.
pub fn bucket_dates(range: DateRange, granularity: Granularity) -> Vec<Date> {
    let mut dates = Vec::new();

    if range.start > range.end {
        return dates;
    }

    match granularity {
        Granularity::Daily => {
            let mut current = Some(range.start);

            while let Some(date) = current.filter(|date| *date <= range.end) {
                dates.push(date);
                current = date.next_day();
            }
        }
        Granularity::Monthly => {
            let last = first_of_month(range.end);
            let mut current = Some(first_of_month(range.start));

            while let Some(date) = current.filter(|date| *date <= last) {
                dates.push(date);
                current = next_month_start(date);
            }
        }
    }

    dates
}

/// Formats `date` as the canonical bucket key for `granularity`.
pub fn bucket_key(date: Date, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date.to_string(),
        Granularity::Monthly => format!("{:04}-{:02}", date.year(), u8::from(date.month())),
    }
}

/// Parses a bucket key produced by [bucket_key] back into a date.
///
/// Monthly keys resolve to the first day of the month.
///
/// # Errors
/// Returns [Error::InvalidRange] if `key` is not a valid key for `granularity`.
pub fn parse_bucket_key(key: &str, granularity: Granularity) -> Result<Date, Error> {
    let invalid_key = || Error::InvalidRange(format!("invalid bucket key \"{key}\""));

    match granularity {
        Granularity::Daily => Date::parse(key, format_description!("[year]-[month]-[day]"))
            .map_err(|_| invalid_key()),
        Granularity::Monthly => {
            if key.len() != 7 {
                return Err(invalid_key());
            }

            let (year, month) = parse_month(key).ok_or_else(invalid_key)?;
            Date::from_calendar_date(year, month, 1).map_err(|_| invalid_key())
        }
    }
}

/// Parses `YYYY-MM` or `YYYY-MM-DD` into a year and month.
fn parse_month(text: &str) -> Option<(i32, Month)> {
    let mut parts = text.trim().split('-');

    let year_part = parts.next()?;
    let month_part = parts.next()?;
    let day_part = parts.next();

    let is_digits = |part: &str, len: usize| {
        part.len() == len && part.bytes().all(|byte| byte.is_ascii_digit())
    };

    if parts.next().is_some()
        || !is_digits(year_part, 4)
        || !is_digits(month_part, 2)
        || day_part.is_some_and(|day_part| !is_digits(day_part, 2))
    {
        return None;
    }

    let year: i32 = year_part.parse().ok()?;
    let month = Month::try_from(month_part.parse::<u8>().ok()?).ok()?;

    if let Some(day_part) = day_part {
        let day: u8 = day_part.parse().ok()?;
        Date::from_calendar_date(year, month, day).ok()?;
    }

    Some((year, month))
}

fn month_bounds(year: i32, month: Month) -> Result<DateRange, Error> {
    let out_of_range = |_| Error::InvalidRange(format!("{year}-{month} is out of range"));

    let start = Date::from_calendar_date(year, month, 1).map_err(out_of_range)?;
    let end = Date::from_calendar_date(year, month, last_day_of_month(year, month))
        .map_err(out_of_range)?;

    Ok(DateRange { start, end })
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1)
        .unwrap_or_else(|_| unreachable!("every month has a first day"))
}

fn next_month_start(date: Date) -> Option<Date> {
    let (year, month) = match date.month() {
        Month::December => (date.year().checked_add(1)?, Month::January),
        month => (date.year(), month.next()),
    };

    Date::from_calendar_date(year, month, 1).ok()
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{
        DateRange, Granularity, bucket_dates, bucket_key, parse_bucket_key, resolve_date_range,
    };

    #[test]
    fn resolves_whole_months() {
        let range = resolve_date_range(
            "2024-01",
            "2024-02",
            Granularity::Monthly,
            date!(2025 - 06 - 01),
        )
        .unwrap();

        assert_eq!(
            range,
            DateRange {
                start: date!(2024 - 01 - 01),
                end: date!(2024 - 02 - 29),
            }
        );
    }

    #[test]
    fn clamps_end_to_today() {
        let range = resolve_date_range(
            "2024-03",
            "2024-12",
            Granularity::Daily,
            date!(2024 - 03 - 15),
        )
        .unwrap();

        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 03 - 15));
    }

    #[test]
    fn accepts_full_dates_as_months() {
        let range = resolve_date_range(
            "2024-03-17",
            "2024-04-02",
            Granularity::Monthly,
            date!(2025 - 01 - 01),
        )
        .unwrap();

        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 04 - 30));
    }

    #[test]
    fn rejects_unparseable_start_month() {
        for month in ["", "2024", "2024-13", "2024-00", "24-01", "2024-1", "march"] {
            let result =
                resolve_date_range(month, "2024-03", Granularity::Monthly, date!(2025 - 01 - 01));

            assert!(
                matches!(result, Err(Error::InvalidRange(_))),
                "expected {month:?} to be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn rejects_invalid_day_in_full_date() {
        let result = resolve_date_range(
            "2023-02-29",
            "2023-03",
            Granularity::Daily,
            date!(2025 - 01 - 01),
        );

        assert!(matches!(result, Err(Error::InvalidRange(_))));
    }

    #[test]
    fn rejects_inverted_range() {
        let result = resolve_date_range(
            "2024-05",
            "2024-04",
            Granularity::Monthly,
            date!(2025 - 01 - 01),
        );

        assert!(matches!(result, Err(Error::InvalidRange(_))));
    }

    #[test]
    fn rejects_range_that_starts_after_today() {
        let result = resolve_date_range(
            "2024-05",
            "2024-06",
            Granularity::Daily,
            date!(2024 - 04 - 30),
        );

        assert!(matches!(result, Err(Error::InvalidRange(_))));
    }

    #[test]
    fn daily_sequence_covers_every_day() {
        let range = DateRange {
            start: date!(2024 - 02 - 27),
            end: date!(2024 - 03 - 02),
        };

        let dates = bucket_dates(range, Granularity::Daily);

        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 27),
                date!(2024 - 02 - 28),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 01),
                date!(2024 - 03 - 02),
            ]
        );
    }

    #[test]
    fn monthly_sequence_crosses_year_boundary() {
        let range = DateRange {
            start: date!(2023 - 11 - 01),
            end: date!(2024 - 02 - 10),
        };

        let dates = bucket_dates(range, Granularity::Monthly);

        assert_eq!(
            dates,
            vec![
                date!(2023 - 11 - 01),
                date!(2023 - 12 - 01),
                date!(2024 - 01 - 01),
                date!(2024 - 02 - 01),
            ]
        );
    }

    #[test]
    fn daily_sequence_for_full_year_has_no_gaps_or_duplicates() {
        let range = DateRange {
            start: date!(2024 - 01 - 01),
            end: date!(2024 - 12 - 31),
        };

        let dates = bucket_dates(range, Granularity::Daily);

        assert_eq!(dates.len(), 366);
        assert!(dates.windows(2).all(|pair| pair[0].next_day() == Some(pair[1])));
    }

    #[test]
    fn inverted_range_has_no_dates() {
        let range = DateRange {
            start: date!(2024 - 02 - 01),
            end: date!(2024 - 01 - 01),
        };

        assert!(bucket_dates(range, Granularity::Daily).is_empty());
        assert!(bucket_dates(range, Granularity::Monthly).is_empty());
    }

    #[test]
    fn bucket_keys_use_canonical_formats() {
        assert_eq!(bucket_key(date!(2024 - 03 - 05), Granularity::Daily), "2024-03-05");
        assert_eq!(bucket_key(date!(2024 - 03 - 05), Granularity::Monthly), "2024-03");
    }

    #[test]
    fn parses_bucket_keys() {
        assert_eq!(
            parse_bucket_key("2024-03-05", Granularity::Daily),
            Ok(date!(2024 - 03 - 05))
        );
        assert_eq!(
            parse_bucket_key("2024-03", Granularity::Monthly),
            Ok(date!(2024 - 03 - 01))
        );
        assert!(parse_bucket_key("2024-03", Granularity::Daily).is_err());
        assert!(parse_bucket_key("2024-03-05", Granularity::Monthly).is_err());
    }

    #[test]
    fn parses_granularity_names() {
        assert_eq!("daily".parse::<Granularity>(), Ok(Granularity::Daily));
        assert_eq!("monthly".parse::<Granularity>(), Ok(Granularity::Monthly));
        assert_eq!(
            "weekly".parse::<Granularity>(),
            Err(Error::InvalidGranularity("weekly".to_owned()))
        );
    }

    #[test]
    fn rejects_signed_months_and_years() {
        for (start, end) in [
            ("2024-+3", "2024-04"),
            ("+999-03", "2024-04"),
            ("2024-03", "2024-04-+1"),
        ] {
            assert!(
                matches!(
                    resolve_date_range(start, end, Granularity::Monthly, date!(2025 - 01 - 01)),
                    Err(Error::InvalidRange(_))
                ),
                "accepted {start} to {end}"
            );
        }
    }
}
