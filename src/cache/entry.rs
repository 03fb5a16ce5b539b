// Cache entry envelope.
// The record written to disk around a cached value, with its timestamps.

use chrono::{Duration, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// On-disk timestamp layout, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wrapper for cached data with its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// When the entry was written.
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    /// When the entry stops being served.
    #[serde(with = "timestamp")]
    pub expires_in: NaiveDateTime,
    /// The cached value.
    pub content: T,
}

impl<T> CacheEntry<T> {
    /// Create an entry written at `now` that lives for `ttl_minutes`.
    pub fn new(content: T, now: NaiveDateTime, ttl_minutes: u32) -> Self {
        let created_at = now.trunc_subsecs(0);
        Self {
            created_at,
            expires_in: created_at + Duration::minutes(i64::from(ttl_minutes)),
            content,
        }
    }

    /// An entry is expired once `now` reaches `expires_in`.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        is_expired_at(self.expires_in, now)
    }
}

pub(crate) fn is_expired_at(expires_in: NaiveDateTime, now: NaiveDateTime) -> bool {
    expires_in <= now.trunc_subsecs(0)
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(*at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {text}")))
    }
}
