use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Month, TimeDelta, TimeZone, Timelike, Utc, Weekday};

use crate::datetime::{self, Clock, Timestamp};


/// Name of the only zone values are reported in.
const UTC_ZONE_NAME: &str = "UTC";


/// Timestamp, that may be absent.
///
/// A valid value always holds an instant in UTC: inputs with any other
/// offset are converted when the value is built or decoded, and the
/// offset is dropped.
///
/// [`Time::Null`] is "no timestamp". It is not the same thing as a valid
/// value at the zero instant, even though both report
/// [`Time::is_zero`].
///
/// Comparisons and arithmetic never fail. A null operand behaves as if
/// it held the zero instant, so callers that care must check
/// [`Time::is_null`] first or use [`Time::checked_compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Time {
    /// No timestamp
    #[default]
    Null,

    /// Timestamp in UTC
    Valid(Timestamp),
}


impl Time {
    /// The null value.
    pub const NULL: Time = Time::Null;

    /// Current instant.
    pub fn now() -> Self {
        Time::Valid(Clock::now())
    }

    /// Builds a valid value from wall clock fields in some zone.
    ///
    /// Fields outside their usual ranges are normalized, e.g. October 32
    /// becomes November 1. The result is converted to UTC.
    ///
    /// * `year` - calendar year
    /// * `month` - month number, 1-based
    /// * `day` - day of month, 1-based
    /// * `hour`, `min`, `sec`, `nsec` - wall clock fields
    /// * `tz` - zone the wall clock fields are read in
    #[allow(clippy::too_many_arguments)]
    pub fn date<Tz: TimeZone>(year: i32, month: i32, day: i32, hour: i32, min: i32, sec: i32, nsec: i64, tz: &Tz) -> Self {
        let naive = datetime::civil(year.into(), month.into(), day.into(),
            hour.into(), min.into(), sec.into(), nsec);

        Time::Valid(datetime::localize(naive, tz))
    }

    /// Builds a valid value from a date-time in any zone.
    ///
    /// * `instant` - point in time to wrap
    pub fn from_datetime<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Time::Valid(instant.with_timezone(&Utc))
    }

    /// Builds a value from an instant and a validity flag.
    ///
    /// The instant is dropped when `valid` is false.
    ///
    /// * `instant` - point in time
    /// * `valid` - whether the instant is meaningful
    pub fn from_parts<Tz: TimeZone>(instant: DateTime<Tz>, valid: bool) -> Self {
        if valid {
            Self::from_datetime(instant)
        } else {
            Time::Null
        }
    }

    /// Checks if there is no timestamp.
    pub fn is_null(&self) -> bool {
        matches!(self, Time::Null)
    }

    /// Checks if there is a timestamp.
    pub fn is_valid(&self) -> bool {
        !self.is_null()
    }

    /// Checks if the instant is the zero instant.
    ///
    /// Validity is not considered: the null value reports `true` too.
    pub fn is_zero(&self) -> bool {
        self.instant_or_zero() == datetime::zero_instant()
    }

    /// Instant of a valid value.
    pub fn instant(&self) -> Option<Timestamp> {
        match self {
            Time::Null => None,
            Time::Valid(instant) => Some(*instant),
        }
    }

    /// Instant of a valid value, or the zero instant for null.
    pub fn instant_or_zero(&self) -> Timestamp {
        self.instant()
            .unwrap_or_else(datetime::zero_instant)
    }

    /// Reports whether this instant is after `other`.
    pub fn after(&self, other: &Time) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Reports whether this instant is before `other`.
    pub fn before(&self, other: &Time) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Reports whether both values hold the same instant.
    ///
    /// Unlike `==`, validity is not considered.
    pub fn equal(&self, other: &Time) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Orders two values by instant.
    pub fn compare(&self, other: &Time) -> Ordering {
        self.instant_or_zero()
            .cmp(&other.instant_or_zero())
    }

    /// Orders two values by instant, if both are valid.
    pub fn checked_compare(&self, other: &Time) -> Option<Ordering> {
        match (self, other) {
            (Time::Valid(lhs), Time::Valid(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.instant_or_zero().year()
    }

    /// Month of the year.
    pub fn month(&self) -> Month {
        datetime::month_from_number(self.instant_or_zero().month())
    }

    /// Day of the month, starting from 1.
    pub fn day(&self) -> u32 {
        self.instant_or_zero().day()
    }

    pub fn hour(&self) -> u32 {
        self.instant_or_zero().hour()
    }

    pub fn minute(&self) -> u32 {
        self.instant_or_zero().minute()
    }

    pub fn second(&self) -> u32 {
        self.instant_or_zero().second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.instant_or_zero().nanosecond()
    }

    pub fn weekday(&self) -> Weekday {
        self.instant_or_zero().weekday()
    }

    /// Day of the year, starting from 1.
    pub fn year_day(&self) -> u32 {
        self.instant_or_zero().ordinal()
    }

    /// ISO 8601 year and week number.
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.instant_or_zero().iso_week();
        (week.year(), week.week())
    }

    /// Year, month and day.
    pub fn date_parts(&self) -> (i32, Month, u32) {
        (self.year(), self.month(), self.day())
    }

    /// Hour, minute and second.
    pub fn clock(&self) -> (u32, u32, u32) {
        let instant = self.instant_or_zero();
        (instant.hour(), instant.minute(), instant.second())
    }

    /// Zone name and offset in seconds east of UTC.
    ///
    /// Always `("UTC", 0)`.
    pub fn zone(&self) -> (&'static str, i32) {
        (UTC_ZONE_NAME, 0)
    }

    /// Returns the value moved by `duration`.
    ///
    /// Saturates at the representable range. Null stays null.
    ///
    /// * `duration` - signed amount of time to add
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, duration: TimeDelta) -> Time {
        self.map(|instant| {
            instant
                .checked_add_signed(duration)
                .unwrap_or(if duration < TimeDelta::zero() { Timestamp::MIN_UTC } else { Timestamp::MAX_UTC })
        })
    }

    /// Time elapsed from `other` to this value.
    ///
    /// * `other` - starting point
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, other: &Time) -> TimeDelta {
        self.instant_or_zero()
            .signed_duration_since(other.instant_or_zero())
    }

    /// Returns the value shifted by calendar fields.
    ///
    /// Overflow is normalized as in [`Time::date`], so adding one month
    /// to October 31 yields December 1.
    ///
    /// * `years` - years to add
    /// * `months` - months to add
    /// * `days` - days to add
    pub fn add_date(&self, years: i32, months: i32, days: i32) -> Time {
        self.map(|instant| {
            let naive = datetime::civil(
                i64::from(instant.year()) + i64::from(years),
                i64::from(instant.month()) + i64::from(months),
                i64::from(instant.day()) + i64::from(days),
                instant.hour().into(),
                instant.minute().into(),
                instant.second().into(),
                instant.nanosecond().into());

            Utc.from_utc_datetime(&naive)
        })
    }

    /// Rounds down to a multiple of `unit` since the zero instant.
    ///
    /// A non-positive `unit` returns the value unchanged.
    ///
    /// * `unit` - rounding granularity
    pub fn truncate(&self, unit: TimeDelta) -> Time {
        let Some(unit) = Self::unit_nanos(unit) else {
            return *self;
        };

        self.map(|instant| {
            let remainder = Self::nanos_since_zero(instant).rem_euclid(unit);
            datetime::shift(instant, -remainder)
        })
    }

    /// Rounds to the nearest multiple of `unit` since the zero instant.
    ///
    /// Halfway values round up. A non-positive `unit` returns the value
    /// unchanged.
    ///
    /// * `unit` - rounding granularity
    pub fn round(&self, unit: TimeDelta) -> Time {
        let Some(unit) = Self::unit_nanos(unit) else {
            return *self;
        };

        self.map(|instant| {
            let remainder = Self::nanos_since_zero(instant).rem_euclid(unit);
            if remainder + remainder < unit {
                datetime::shift(instant, -remainder)
            } else {
                datetime::shift(instant, unit - remainder)
            }
        })
    }

    /// Seconds since the unix epoch.
    pub fn unix(&self) -> i64 {
        self.instant_or_zero().timestamp()
    }

    /// Milliseconds since the unix epoch.
    pub fn unix_milli(&self) -> i64 {
        self.instant_or_zero().timestamp_millis()
    }

    /// Microseconds since the unix epoch.
    pub fn unix_micro(&self) -> i64 {
        self.instant_or_zero().timestamp_micros()
    }

    /// Nanoseconds since the unix epoch.
    ///
    /// Wraps for instants further than ~292 years from 1970.
    pub fn unix_nano(&self) -> i64 {
        let instant = self.instant_or_zero();
        let nanos = i128::from(instant.timestamp()) * datetime::NANOS_PER_SECOND
            + i128::from(instant.timestamp_subsec_nanos());

        nanos as i64
    }
}


impl Time {
    fn map<F>(&self, f: F) -> Time
    where
        F: FnOnce(Timestamp) -> Timestamp
    {
        match self {
            Time::Null => Time::Null,
            Time::Valid(instant) => Time::Valid(f(*instant)),
        }
    }

    fn unit_nanos(unit: TimeDelta) -> Option<i128> {
        let nanos = i128::from(unit.num_seconds()) * datetime::NANOS_PER_SECOND
            + i128::from(unit.subsec_nanos());

        (nanos > 0).then_some(nanos)
    }

    fn nanos_since_zero(instant: Timestamp) -> i128 {
        datetime::nanos_between(instant, datetime::zero_instant())
    }
}


impl<Tz: TimeZone> From<DateTime<Tz>> for Time {
    fn from(value: DateTime<Tz>) -> Self {
        Time::from_datetime(value)
    }
}


impl<Tz: TimeZone> From<Option<DateTime<Tz>>> for Time {
    fn from(value: Option<DateTime<Tz>>) -> Self {
        value.map_or(Time::Null, Time::from_datetime)
    }
}


impl From<Time> for Option<Timestamp> {
    fn from(value: Time) -> Self {
        value.instant()
    }
}


impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.write_str(&datetime::format_display(&self.instant_or_zero()))
    }
}


#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn date_matches_chrono_construction() {
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Time::date(2021, 1, 1, 0, 0, 0, 0, &Utc), Time::Valid(expected));
    }

    #[test]
    fn display_mimics_utc_wall_clock() {
        let time = Time::date(2021, 1, 1, 0, 0, 0, 0, &Utc);
        assert_eq!(time.to_string(), "2021-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn null_displays_zero_instant() {
        assert_eq!(Time::NULL.to_string(), "0001-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn from_parts_drops_invalid_instant() {
        let instant = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();

        assert!(Time::from_parts(instant, false).is_null());
        assert_eq!(Time::from_parts(instant, true), Time::Valid(instant));
    }

    #[test]
    fn zero_instant_is_zero_but_not_null() {
        let zero = Time::from_parts(datetime::zero_instant(), true);

        assert!(zero.is_zero());
        assert!(!zero.is_null());
        assert!(Time::NULL.is_zero());
        assert_ne!(zero, Time::NULL);
    }

    #[test]
    fn option_conversions_keep_null() {
        let none: Option<DateTime<FixedOffset>> = None;

        assert!(Time::from(none).is_null());
        assert_eq!(Option::<Timestamp>::from(Time::NULL), None);
    }

    #[test]
    fn arithmetic_keeps_null() {
        assert!(Time::NULL.add(TimeDelta::hours(1)).is_null());
        assert!(Time::NULL.add_date(1, 0, 0).is_null());
        assert!(Time::NULL.truncate(TimeDelta::hours(1)).is_null());
        assert!(Time::NULL.round(TimeDelta::hours(1)).is_null());
    }

    #[test]
    fn add_saturates() {
        let far = Time::date(2021, 1, 1, 0, 0, 0, 0, &Utc).add(TimeDelta::max_value());
        assert_eq!(far, Time::Valid(Timestamp::MAX_UTC));
    }

    #[test]
    fn non_positive_unit_is_identity() {
        let time = Time::date(2024, 3, 15, 14, 30, 45, 123_456_789, &Utc);

        assert_eq!(time.truncate(TimeDelta::zero()), time);
        assert_eq!(time.round(TimeDelta::seconds(-1)), time);
    }
}
