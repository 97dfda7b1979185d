/// Serialization protocol an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Row storage (SQL driver values)
    Sql,

    /// JSON text
    Json,

    /// Plain text without quotes
    Text,

    /// BSON documents
    Bson,
}


impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        let name = match self {
            Protocol::Sql  => "sql",
            Protocol::Json => "json",
            Protocol::Text => "text",
            Protocol::Bson => "bson",
        };

        f.write_str(name)
    }
}


/// Input could be interpreted neither as a null marker nor as a
/// timestamp of the expected format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    protocol: Protocol,
    msg: String,
    extra: String
}


impl DecodeError {
    /// Creates a new error.
    ///
    /// * `protocol` - protocol, that failed to decode
    /// * `msg` - what went wrong
    /// * `extra` - offending input or underlying cause
    pub(crate) fn new<M, E>(protocol: Protocol, msg: M, extra: E) -> Self
    where
        M: Into<String>,
        E: Into<String>
    {
        DecodeError {
            protocol: protocol,
            msg: msg.into(),
            extra: extra.into()
        }
    }

    /// Reassigns the error to another protocol.
    ///
    /// Used when a shared parser fails on behalf of a specific adapter.
    pub(crate) fn within(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Protocol, that failed to decode.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Additional details: the offending input or the underlying cause.
    pub fn extra(&self) -> &str {
        &self.extra
    }
}


impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, r#"{} decode error. Message: "{}" (extra: "{}")"#, self.protocol, self.msg, self.extra)
    }
}


impl std::error::Error for DecodeError {}


/// Value has no representation in the target format, e.g. a year
/// RFC 3339 cannot express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError {
    protocol: Protocol,
    msg: String,
    extra: String
}


impl EncodeError {
    /// Creates a new error.
    ///
    /// * `protocol` - protocol, that failed to encode
    /// * `msg` - what went wrong
    /// * `extra` - offending value
    pub(crate) fn new<M, E>(protocol: Protocol, msg: M, extra: E) -> Self
    where
        M: Into<String>,
        E: Into<String>
    {
        EncodeError {
            protocol: protocol,
            msg: msg.into(),
            extra: extra.into()
        }
    }

    /// Reassigns the error to another protocol.
    pub(crate) fn within(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn message(&self) -> &str {
        &self.msg
    }

    pub fn extra(&self) -> &str {
        &self.extra
    }
}


impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, r#"{} encode error. Message: "{}" (extra: "{}")"#, self.protocol, self.msg, self.extra)
    }
}


impl std::error::Error for EncodeError {}


impl From<chrono::ParseError> for DecodeError {
    fn from(value: chrono::ParseError) -> Self {
        DecodeError::new(Protocol::Text, "cannot parse RFC 3339 timestamp", value.to_string())
    }
}


#[cfg(feature = "rusqlite")]
impl From<rusqlite::types::FromSqlError> for DecodeError {
    fn from(value: rusqlite::types::FromSqlError) -> Self {
        DecodeError::new(Protocol::Sql, "cannot decode timestamp column", value.to_string())
    }
}


#[cfg(feature = "bson")]
impl From<bson::raw::Error> for DecodeError {
    fn from(value: bson::raw::Error) -> Self {
        DecodeError::new(Protocol::Bson, "malformed BSON value", value.to_string())
    }
}


/// Crate-specific alias for [`std::result::Result`] instantiated
/// with [`crate::error::DecodeError`].
pub type Result<T> = std::result::Result<T, DecodeError>;
