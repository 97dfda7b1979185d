//! # timi
//!
//! `timi` provides [`Time`], a timestamp, that may be absent, stored
//! and transmitted in UTC.
//!
//! Null stays distinct from a zero timestamp on every backend:
//!
//! * SQL rows via `rusqlite` (`NULL` or UTC text), feature `rusqlite`
//! * JSON via `serde` (`null` or an RFC 3339 string), feature `serde`
//! * BSON documents (null or a BSON datetime), feature `bson`

extern crate chrono;
extern crate log;

//
// Public modules
//

pub mod codec;
pub mod datetime;
pub mod error;
pub mod storage;

//
// Private modules
//

mod time;

pub use self::error::{DecodeError, EncodeError, Protocol, Result};
pub use self::time::Time;
