use chrono::{DateTime, Datelike, LocalResult, Month, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Timelike, Utc};

use crate::error::{DecodeError, EncodeError, Protocol};


/// Clock used for all timestamps.
pub type Clock = chrono::Utc;


/// Type for all timestamps.
pub type Timestamp = chrono::DateTime<Clock>;


/// Nanoseconds in one second.
pub(crate) const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Nanoseconds in one minute.
const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;

/// Nanoseconds in one hour.
const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;

/// Nanoseconds in one day.
const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Unix time of January 1, year 1, 00:00:00 UTC.
const ZERO_INSTANT_UNIX_SECONDS: i64 = -62_135_596_800;

/// Years RFC 3339 can express with its four-digit year field.
const RFC3339_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Byte offset of the date and time separator in RFC 3339 text.
const RFC3339_SEPARATOR_POS: usize = 10;

/// Months in calendar order, indexed by month number minus one.
const MONTHS: [Month; 12] = [
    Month::January, Month::February, Month::March, Month::April,
    Month::May, Month::June, Month::July, Month::August,
    Month::September, Month::October, Month::November, Month::December,
];


/// The zero instant: January 1, year 1, 00:00:00 UTC.
///
/// Null values carry this instant, and [`crate::Time::is_zero`]
/// checks against it.
pub fn zero_instant() -> Timestamp {
    Timestamp::from_timestamp(ZERO_INSTANT_UNIX_SECONDS, 0)
        .unwrap_or(Timestamp::MIN_UTC)
}


/// Builds a naive date-time from possibly out-of-range civil fields.
///
/// Fields outside their usual ranges carry into the next larger unit,
/// so month 13 is January of the next year and January 32 is February 1.
/// Negative fields borrow the same way. Results outside the representable
/// range saturate.
///
/// * `year` - calendar year
/// * `month` - month number, 1-based
/// * `day` - day of month, 1-based
/// * `hour`, `minute`, `second`, `nanosecond` - wall clock fields
#[allow(clippy::too_many_arguments)]
pub(crate) fn civil(year: i64, month: i64, day: i64, hour: i64, minute: i64, second: i64, nanosecond: i64) -> NaiveDateTime {
    //
    // Months are folded into the year first, because their length
    // depends on the year. Everything smaller is a plain offset from
    // the first day of the resulting month.
    //

    let months = month - 1;
    let year = year.saturating_add(months.div_euclid(12));
    let month = (months.rem_euclid(12) + 1) as u32;

    let first_of_month = i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .and_then(|date| date.and_hms_opt(0, 0, 0));

    let first_of_month = match first_of_month {
        Some(midnight) => midnight,
        None if year > 0 => return NaiveDateTime::MAX,
        None => return NaiveDateTime::MIN,
    };

    let offset = (i128::from(day) - 1) * NANOS_PER_DAY
        + i128::from(hour) * NANOS_PER_HOUR
        + i128::from(minute) * NANOS_PER_MINUTE
        + i128::from(second) * NANOS_PER_SECOND
        + i128::from(nanosecond);

    shift_naive(first_of_month, offset)
}


/// Interprets a naive wall clock time in a zone and converts it to UTC.
///
/// Ambiguous local times resolve to the earlier instant. Local times
/// skipped by a transition use the offset the zone has at the same
/// wall clock reading taken as UTC.
///
/// * `naive` - wall clock time
/// * `tz` - zone the wall clock belongs to
pub(crate) fn localize<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Timestamp {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let offset = tz
                .offset_from_utc_datetime(&naive)
                .fix()
                .local_minus_utc();

            shift(Utc.from_utc_datetime(&naive), -i128::from(offset) * NANOS_PER_SECOND)
        }
    }
}


/// Moves an instant by a signed amount of nanoseconds, saturating
/// at the representable range.
pub(crate) fn shift(instant: Timestamp, nanos: i128) -> Timestamp {
    Utc.from_utc_datetime(&shift_naive(instant.naive_utc(), nanos))
}


/// Signed nanoseconds from `since` to `instant`.
pub(crate) fn nanos_between(instant: Timestamp, since: Timestamp) -> i128 {
    let delta = instant.signed_duration_since(since);
    i128::from(delta.num_seconds()) * NANOS_PER_SECOND + i128::from(delta.subsec_nanos())
}


/// Converts a month number into [`Month`].
///
/// * `number` - month number in `1..=12`
pub(crate) fn month_from_number(number: u32) -> Month {
    MONTHS[(number.clamp(1, 12) - 1) as usize]
}


/// Formats an instant as RFC 3339 in UTC, e.g. `2021-01-01T00:00:00.5Z`.
///
/// Fractional seconds are printed only when present, with trailing zeros
/// removed. Instants outside years 0 to 9999 have no RFC 3339 form and
/// fail.
pub fn format_rfc3339(instant: &Timestamp) -> Result<String, EncodeError> {
    if !RFC3339_YEARS.contains(&instant.year()) {
        return Err(EncodeError::new(Protocol::Text, "year outside of range [0,9999]",
            instant.year().to_string()));
    }

    Ok(format!("{}{}Z",
        instant.format("%Y-%m-%dT%H:%M:%S"),
        format_fraction(instant.nanosecond())))
}


/// Formats an instant for humans, e.g. `2021-01-01 00:00:00 +0000 UTC`.
pub fn format_display(instant: &Timestamp) -> String {
    format!("{}{} +0000 UTC",
        instant.format("%Y-%m-%d %H:%M:%S"),
        format_fraction(instant.nanosecond()))
}


/// Parses an RFC 3339 timestamp with any offset and converts it to UTC.
///
/// Only the uppercase `T` separator and `Z` designator are accepted.
/// Errors are reported for [`Protocol::Text`].
///
/// * `input` - text such as `2021-01-01T09:00:00+09:00`
pub fn parse_rfc3339(input: &str) -> Result<Timestamp, DecodeError> {
    let instant = DateTime::parse_from_rfc3339(input)?;

    let strict = input.as_bytes().get(RFC3339_SEPARATOR_POS) == Some(&b'T')
        && !input.ends_with('z');

    if !strict {
        return Err(DecodeError::new(Protocol::Text,
            "timestamp must use 'T' separator and 'Z' designator", input));
    }

    Ok(instant.with_timezone(&Utc))
}


fn format_fraction(nanos: u32) -> String {
    // Leap seconds are stored as nanoseconds past one billion
    let nanos = nanos % 1_000_000_000;
    if nanos == 0 {
        return String::new();
    }

    let digits = format!("{:09}", nanos);
    format!(".{}", digits.trim_end_matches('0'))
}


fn shift_naive(base: NaiveDateTime, nanos: i128) -> NaiveDateTime {
    let seconds = nanos.div_euclid(NANOS_PER_SECOND);
    let subsec = nanos.rem_euclid(NANOS_PER_SECOND) as u32;

    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| TimeDelta::new(seconds, subsec))
        .and_then(|delta| base.checked_add_signed(delta))
        .unwrap_or(if nanos < 0 { NaiveDateTime::MIN } else { NaiveDateTime::MAX })
}
