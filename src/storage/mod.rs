//! Storage adapters for [`crate::Time`].
//!
//! Row storage goes through `rusqlite` driver values, document storage
//! through BSON.

#[cfg(feature = "rusqlite")]
mod sql;

#[cfg(feature = "bson")]
pub mod document;

#[cfg(feature = "bson")]
pub use self::document::BsonTime;
