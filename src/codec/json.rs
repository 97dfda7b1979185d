use serde::de::{self, Deserializer, Visitor};
use serde::{ser, Deserialize, Serialize, Serializer};

use crate::datetime;
use crate::error::Protocol;
use crate::time::Time;


/// Null serializes as none, so `serde_json` writes `null`. Valid values
/// serialize as RFC 3339 strings in UTC, and fail for years outside
/// 0 to 9999.
impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        match self {
            Time::Null => serializer.serialize_none(),
            Time::Valid(instant) => {
                let text = datetime::format_rfc3339(instant)
                    .map_err(|err| {
                        let err = err.within(Protocol::Json);

                        log::debug!("event=encode module=json status=error reason={}", err);
                        <S::Error as ser::Error>::custom(err)
                    })?;

                serializer.serialize_str(&text)
            },
        }
    }
}


/// Accepts null (or a missing field) and RFC 3339 strings.
///
/// Strings are never treated as null: `""` and `"null"` fail.
impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        deserializer.deserialize_option(TimeVisitor)
    }
}


struct TimeVisitor;


impl<'de> Visitor<'de> for TimeVisitor {
    type Value = Time;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("null or an RFC 3339 timestamp string")
    }

    fn visit_none<E>(self) -> Result<Time, E>
    where
        E: de::Error
    {
        Ok(Time::NULL)
    }

    fn visit_unit<E>(self) -> Result<Time, E>
    where
        E: de::Error
    {
        Ok(Time::NULL)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Time, D::Error>
    where
        D: Deserializer<'de>
    {
        deserializer.deserialize_str(self)
    }

    fn visit_str<E>(self, value: &str) -> Result<Time, E>
    where
        E: de::Error
    {
        //
        // Strings always go through the parser, so a quoted "null"
        // is a malformed timestamp rather than a null
        //

        datetime::parse_rfc3339(value)
            .map(Time::Valid)
            .map_err(|err| {
                let err = err.within(Protocol::Json);

                log::debug!("event=decode module=json status=error reason={}", err);
                E::custom(err)
            })
    }
}
