//! Timestamp column encoding.
//!
//! Timestamps are stored as RFC 3339 text in UTC with a fixed six-digit
//! fraction (`2025-03-01T12:00:00.000000Z`), so lexical order in SQL matches
//! chronological order.

use chrono::{DateTime, SecondsFormat};
use quotebook_domain::time::Timestamp;

use crate::error::StorageError;

pub(crate) fn encode(value: Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(value: &str) -> Result<Timestamp, StorageError> {
    Ok(DateTime::parse_from_rfc3339(value)?.to_utc())
}

/// Decode a timestamp column inside a `FromRow` implementation.
pub(crate) fn decode_column(value: &str) -> Result<Timestamp, sqlx::Error> {
    decode(value).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
