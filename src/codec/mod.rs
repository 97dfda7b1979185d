//! Text serialization of [`crate::Time`].
//!
//! Byte-level JSON and plain text codecs live in `text`, serde
//! integration in `json`.

mod text;

#[cfg(feature = "serde")]
mod json;

pub use self::text::NULL_LITERAL;
