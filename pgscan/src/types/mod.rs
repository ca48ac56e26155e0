//! Type integration with external types
//!
//! Implementation [`Decode`][d] for external types.
//!
//! Available for:
//!
//! - [`serde`]'s [`Deserialize`][sd] via [`Json`], requires `json` feature
//! - [`time`][::time]'s [`Date`][td], [`PrimitiveDateTime`][tp], [`UtcDateTime`][tu], requires
//!   `time` feature
//!
//! [d]: crate::Decode
//! [sd]: serde::Deserialize
//! [td]: ::time::Date
//! [tp]: ::time::PrimitiveDateTime
//! [tu]: ::time::UtcDateTime

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::Json;

#[cfg(feature = "time")]
mod time;
