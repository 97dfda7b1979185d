use std::str::FromStr;

use log::{debug, trace};

use crate::datetime::{self, Timestamp};
use crate::error::{DecodeError, EncodeError, Protocol, Result};
use crate::time::Time;


/// Literal used for null in both JSON and plain text.
pub const NULL_LITERAL: &[u8] = b"null";


impl Time {
    /// Encodes the value as a JSON token.
    ///
    /// Null becomes the bare literal `null`, a valid value becomes a quoted
    /// RFC 3339 string in UTC, e.g. `"2021-01-01T00:00:00Z"`. Fails for
    /// years outside 0 to 9999.
    pub fn marshal_json(&self) -> std::result::Result<Vec<u8>, EncodeError> {
        match self {
            Time::Null => Ok(NULL_LITERAL.to_vec()),
            Time::Valid(instant) => Self::format_valid(instant, Protocol::Json)
                .map(|text| format!(r#""{}""#, text).into_bytes()),
        }
    }

    /// Decodes a JSON token.
    ///
    /// Only the bare literal `null` yields null. Anything else must be a
    /// quoted RFC 3339 timestamp: `""` and `"null"` are errors.
    ///
    /// * `data` - raw JSON token
    pub fn unmarshal_json(data: &[u8]) -> Result<Time> {
        if data == NULL_LITERAL {
            trace!("event=decode module=json status=ok value=null");
            return Ok(Time::NULL);
        }

        let decoded = Self::strip_quotes(data)
            .and_then(|inner| Self::parse_valid(inner, Protocol::Json));

        if let Err(err) = &decoded {
            debug!("event=decode module=json status=error reason={}", err);
        }

        decoded
    }

    /// Encodes the value as plain text, without quotes.
    ///
    /// Null becomes `null`. Fails for years outside 0 to 9999.
    pub fn marshal_text(&self) -> std::result::Result<String, EncodeError> {
        match self {
            Time::Null => Ok(String::from_utf8_lossy(NULL_LITERAL).into_owned()),
            Time::Valid(instant) => Self::format_valid(instant, Protocol::Text),
        }
    }

    /// Decodes plain text, without quotes.
    ///
    /// * `data` - either `null` or an RFC 3339 timestamp
    pub fn unmarshal_text(data: &[u8]) -> Result<Time> {
        if data == NULL_LITERAL {
            trace!("event=decode module=text status=ok value=null");
            return Ok(Time::NULL);
        }

        let decoded = Self::parse_valid(data, Protocol::Text);

        if let Err(err) = &decoded {
            debug!("event=decode module=text status=error reason={}", err);
        }

        decoded
    }
}


impl Time {
    fn format_valid(instant: &Timestamp, protocol: Protocol) -> std::result::Result<String, EncodeError> {
        datetime::format_rfc3339(instant)
            .map_err(|err| {
                let err = err.within(protocol);
                debug!("event=encode module={} status=error reason={}", protocol, err);
                err
            })
    }

    fn strip_quotes(data: &[u8]) -> Result<&[u8]> {
        match data {
            [b'"', inner @ .., b'"'] => Ok(inner),
            _ => Err(DecodeError::new(Protocol::Json, "timestamp must be a JSON string",
                String::from_utf8_lossy(data)))
        }
    }

    fn parse_valid(data: &[u8], protocol: Protocol) -> Result<Time> {
        let text = std::str::from_utf8(data)
            .map_err(|err| DecodeError::new(protocol, "timestamp is not valid UTF-8", err.to_string()))?;

        datetime::parse_rfc3339(text)
            .map(Time::Valid)
            .map_err(|err| err.within(protocol))
    }
}


impl FromStr for Time {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Time::unmarshal_text(s.as_bytes())
    }
}
