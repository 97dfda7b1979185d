use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};

use crate::datetime::{self, Timestamp};
use crate::error::{DecodeError, Protocol, Result};
use crate::time::Time;


impl Time {
    /// Decodes a driver value.
    ///
    /// `NULL` yields the null value. Text goes to the `chrono` decoder of
    /// `rusqlite`, which understands timestamps with and without offsets.
    /// Integers and reals are read as seconds since the unix epoch.
    ///
    /// * `value` - raw column value
    pub fn scan(value: ValueRef<'_>) -> Result<Time> {
        let instant = match value {
            ValueRef::Null => {
                log::trace!("event=decode module=sql status=ok value=null");
                return Ok(Time::NULL);
            },

            ValueRef::Integer(seconds) => Self::from_unix_seconds(seconds, 0),
            ValueRef::Real(seconds) => Self::from_fractional_seconds(seconds),

            // Everything else is up to the generic timestamp decoder
            other => Timestamp::column_result(other)
                .map_err(DecodeError::from),
        };

        instant
            .map(Time::Valid)
            .inspect_err(|err| log::debug!("event=decode module=sql status=error reason={}", err))
    }

    /// Encodes the value for the driver.
    ///
    /// Null becomes `NULL`, a valid value becomes whatever `rusqlite`
    /// writes for [`chrono::DateTime`] in UTC.
    pub fn value(&self) -> Value {
        match self.to_sql() {
            Ok(ToSqlOutput::Owned(value)) => value,
            Ok(ToSqlOutput::Borrowed(value)) => value.into(),

            // The chrono encoder always yields owned text
            _ => Value::Null,
        }
    }
}


impl Time {
    fn from_unix_seconds(seconds: i64, nanos: u32) -> Result<Timestamp> {
        Timestamp::from_timestamp(seconds, nanos)
            .ok_or_else(|| DecodeError::new(Protocol::Sql, "unix timestamp out of range", seconds.to_string()))
    }

    fn from_fractional_seconds(seconds: f64) -> Result<Timestamp> {
        if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
            return Err(DecodeError::new(Protocol::Sql, "unix timestamp out of range", seconds.to_string()));
        }

        let whole = seconds.floor();
        let nanos = ((seconds - whole) * datetime::NANOS_PER_SECOND as f64).round() as u32;

        //
        // Rounding can push the fraction up to a whole second
        //

        let (whole, nanos) = if nanos >= 1_000_000_000 {
            (whole as i64 + 1, 0)
        } else {
            (whole as i64, nanos)
        };

        Self::from_unix_seconds(whole, nanos)
    }
}


/// Implementation of [`rusqlite::types::ToSql`] trait for [`Time`].
///
/// Null translates into `NULL`, a valid value goes to the
/// [`chrono::DateTime`] encoder of `rusqlite`.
impl ToSql for Time {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Time::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            Time::Valid(instant) => instant.to_sql(),
        }
    }
}


/// Implementation of [`rusqlite::types::FromSql`] for [`Time`].
///
/// Accepts `NULL` and whatever [`Time::scan`] accepts.
impl FromSql for Time {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Time::scan(value)
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}


#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn null_round_trips_as_sql_null() {
        assert_eq!(Time::NULL.value(), Value::Null);
        assert_eq!(Time::scan(ValueRef::Null), Ok(Time::NULL));
    }

    #[test]
    fn value_is_written_in_utc() {
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");
        let time = Time::date(2024, 6, 15, 21, 0, 0, 0, &tokyo);

        assert_eq!(time.value(), Value::Text("2024-06-15 12:00:00+00:00".to_owned()));
    }

    #[test]
    fn valid_value_matches_chrono_encoder() {
        let time = Time::date(2024, 3, 15, 14, 30, 45, 123_456_789, &Utc);
        let instant = time.instant().expect("valid value");

        assert_eq!(time.to_sql().expect("encodes"), instant.to_sql().expect("encodes"));
        assert_eq!(time.value(), Value::Text("2024-03-15 14:30:45.123456789+00:00".to_owned()));
    }

    #[test]
    fn scan_normalizes_offset_text() {
        let time = Time::scan(ValueRef::Text(b"2024-06-15 21:00:00+09:00")).expect("valid text");
        assert_eq!(time, Time::date(2024, 6, 15, 12, 0, 0, 0, &Utc));
    }

    #[test]
    fn scan_reads_unix_seconds() {
        assert_eq!(Time::scan(ValueRef::Integer(0)), Ok(Time::date(1970, 1, 1, 0, 0, 0, 0, &Utc)));
        assert_eq!(Time::scan(ValueRef::Real(1.5)), Ok(Time::date(1970, 1, 1, 0, 0, 1, 500_000_000, &Utc)));
    }

    #[test]
    fn scan_rejects_blobs_and_garbage() {
        let blob = Time::scan(ValueRef::Blob(&[1, 2, 3])).expect_err("blob is not a timestamp");
        assert_eq!(blob.protocol(), Protocol::Sql);

        assert!(Time::scan(ValueRef::Text(b"yesterday")).is_err());
        assert!(Time::scan(ValueRef::Real(f64::NAN)).is_err());
    }
}
