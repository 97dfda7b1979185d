//! BSON conversions for [`Time`].
//!
//! Null maps to the BSON null type, a valid value to a BSON datetime.
//! BSON datetimes hold milliseconds, so anything finer is truncated on
//! the way out.

use bson::spec::ElementType;
use bson::{Bson, RawBson, RawBsonRef, RawDocument, RawDocumentBuf};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::datetime::Timestamp;
use crate::error::{DecodeError, Protocol, Result};
use crate::time::Time;


/// Key of the single element in scratch documents used to reach the
/// raw BSON codec.
const ELEMENT_KEY: &str = "v";

/// Bytes before the payload of the scratch element: document length,
/// element type, key and its terminator.
const ELEMENT_HEADER_LEN: usize = 4 + 1 + ELEMENT_KEY.len() + 1;


impl Time {
    /// Encodes the value as a BSON type tag and payload.
    ///
    /// Null yields [`ElementType::Null`] with an empty payload. A valid
    /// value yields [`ElementType::DateTime`] with its 8-byte payload.
    pub fn marshal_bson_value(&self) -> (ElementType, Vec<u8>) {
        let instant = match self {
            Time::Null => return (ElementType::Null, Vec::new()),
            Time::Valid(instant) => *instant,
        };

        let mut document = RawDocumentBuf::new();
        document.append(ELEMENT_KEY, RawBson::DateTime(to_bson_datetime(instant)));

        //
        // Scratch document is laid out as header, payload and the
        // document terminator. The payload is all I need.
        //

        let bytes = document.as_bytes();
        let payload = bytes
            .get(ELEMENT_HEADER_LEN..bytes.len() - 1)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        (ElementType::DateTime, payload)
    }

    /// Decodes a BSON type tag and payload.
    ///
    /// An empty payload or the null tag yield the null value. Otherwise
    /// the payload must hold a BSON datetime.
    ///
    /// * `element_type` - declared BSON type
    /// * `payload` - raw value bytes, without type tag and key
    pub fn unmarshal_bson_value(element_type: ElementType, payload: &[u8]) -> Result<Time> {
        if payload.is_empty() || element_type == ElementType::Null {
            log::trace!("event=decode module=bson status=ok value=null");
            return Ok(Time::NULL);
        }

        let bytes = scratch_document(element_type, payload)?;
        let decoded = RawDocument::from_bytes(&bytes)
            .and_then(|document| document.get(ELEMENT_KEY))
            .map_err(DecodeError::from)
            .and_then(|value| {
                value.ok_or_else(|| DecodeError::new(Protocol::Bson, "BSON value is missing", ELEMENT_KEY))
            })
            .and_then(Time::try_from);

        if let Err(err) = &decoded {
            log::debug!("event=decode module=bson status=error reason={}", err);
        }

        decoded
    }
}


impl From<Time> for Bson {
    fn from(value: Time) -> Self {
        match value {
            Time::Null => Bson::Null,
            Time::Valid(instant) => Bson::DateTime(to_bson_datetime(instant)),
        }
    }
}


impl TryFrom<Bson> for Time {
    type Error = DecodeError;

    fn try_from(value: Bson) -> Result<Self> {
        match value {
            Bson::Null => Ok(Time::NULL),
            Bson::DateTime(instant) => Ok(Time::Valid(from_bson_datetime(instant))),
            other => Err(unexpected_type(other.element_type())),
        }
    }
}


impl TryFrom<RawBsonRef<'_>> for Time {
    type Error = DecodeError;

    fn try_from(value: RawBsonRef<'_>) -> Result<Self> {
        match value {
            RawBsonRef::Null => Ok(Time::NULL),
            RawBsonRef::DateTime(instant) => Ok(Time::Valid(from_bson_datetime(instant))),
            other => Err(unexpected_type(other.element_type())),
        }
    }
}


/// Wrapper, that serializes [`Time`] as a BSON datetime or null.
///
/// Plain [`Time`] serializes as an RFC 3339 string, which is what JSON
/// wants. Use this wrapper (or [`as_bson_datetime`]) for fields of
/// documents stored in BSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BsonTime(pub Time);


impl From<Time> for BsonTime {
    fn from(value: Time) -> Self {
        BsonTime(value)
    }
}


impl From<BsonTime> for Time {
    fn from(value: BsonTime) -> Self {
        value.0
    }
}


impl Serialize for BsonTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        as_bson_datetime::serialize(&self.0, serializer)
    }
}


impl<'de> Deserialize<'de> for BsonTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        as_bson_datetime::deserialize(deserializer)
            .map(BsonTime)
    }
}


/// Serde helpers for `#[serde(with = "timi::storage::document::as_bson_datetime")]`.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Event {
///     #[serde(with = "timi::storage::document::as_bson_datetime")]
///     happened_at: Time,
/// }
/// ```
pub mod as_bson_datetime {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::time::Time;

    /// Serializes null as none and a valid value as [`bson::DateTime`].
    pub fn serialize<S>(time: &Time, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer
    {
        match time {
            Time::Null => serializer.serialize_none(),
            Time::Valid(instant) => super::to_bson_datetime(*instant).serialize(serializer),
        }
    }

    /// Deserializes null or a [`bson::DateTime`].
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: Deserializer<'de>
    {
        let instant = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(instant.map_or(Time::NULL, |instant| Time::Valid(super::from_bson_datetime(instant))))
    }
}


fn to_bson_datetime(instant: Timestamp) -> bson::DateTime {
    bson::DateTime::from_millis(instant.timestamp_millis())
}


fn from_bson_datetime(instant: bson::DateTime) -> Timestamp {
    let millis = instant.timestamp_millis();

    Timestamp::from_timestamp_millis(millis)
        .unwrap_or(if millis < 0 { Timestamp::MIN_UTC } else { Timestamp::MAX_UTC })
}


fn unexpected_type(element_type: ElementType) -> DecodeError {
    DecodeError::new(Protocol::Bson, "BSON value is neither a datetime nor null",
        format!("{:?}", element_type))
}


fn scratch_document(element_type: ElementType, payload: &[u8]) -> Result<Vec<u8>> {
    let length = ELEMENT_HEADER_LEN + payload.len() + 1;
    let length = i32::try_from(length)
        .map_err(|_| DecodeError::new(Protocol::Bson, "BSON payload is too large", length.to_string()))?;

    let mut bytes = Vec::with_capacity(length as usize);
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.push(element_type as u8);
    bytes.extend_from_slice(ELEMENT_KEY.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(payload);
    bytes.push(0);

    Ok(bytes)
}


#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn null_has_empty_payload() {
        assert_eq!(Time::NULL.marshal_bson_value(), (ElementType::Null, Vec::new()));
        assert_eq!(Time::unmarshal_bson_value(ElementType::Null, &[]), Ok(Time::NULL));
    }

    #[test]
    fn datetime_payload_is_little_endian_millis() {
        let time = Time::date(2021, 1, 1, 12, 30, 45, 0, &Utc);
        let (element_type, payload) = time.marshal_bson_value();

        assert_eq!(element_type, ElementType::DateTime);
        assert_eq!(payload, time.unix_milli().to_le_bytes().to_vec());
    }

    #[test]
    fn empty_payload_is_null_regardless_of_type() {
        assert_eq!(Time::unmarshal_bson_value(ElementType::DateTime, &[]), Ok(Time::NULL));
    }

    #[test]
    fn other_types_are_rejected() {
        let payload = [4, 0, 0, 0, b'a', b'b', b'c', 0];
        let error = Time::unmarshal_bson_value(ElementType::String, &payload).expect_err("string is not a datetime");

        assert_eq!(error.protocol(), Protocol::Bson);
        assert!(Time::try_from(Bson::Int32(7)).is_err());
    }
}
