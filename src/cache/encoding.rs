// Payload encodings.
// Turns values into file bytes and file bytes back into an envelope-or-document view.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::entry::{CacheEntry, parse_timestamp};
use crate::error::{CacheError, Result};

/// How entry files are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Envelope as a CBOR record.
    #[default]
    #[serde(alias = "serialize")]
    Structured,
    /// Envelope as JSON text.
    Json,
    /// The value itself, no envelope and no expiry.
    #[serde(alias = "document")]
    Raw,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Structured => "structured",
            Encoding::Json => "json",
            Encoding::Raw => "raw",
        }
    }

    /// Whether written files carry `created_at`/`expires_in`.
    pub fn has_envelope(&self) -> bool {
        !matches!(self, Encoding::Raw)
    }

    pub(crate) fn encode<T: Serialize + ?Sized>(
        &self,
        value: &T,
        now: NaiveDateTime,
        ttl_minutes: u32,
    ) -> Result<Vec<u8>> {
        match self {
            Encoding::Structured => {
                let entry = CacheEntry::new(value, now, ttl_minutes);
                let mut bytes = Vec::new();
                ciborium::into_writer(&entry, &mut bytes)
                    .map_err(|e| CacheError::Encode(e.to_string()))?;
                Ok(bytes)
            }
            Encoding::Json => {
                let entry = CacheEntry::new(value, now, ttl_minutes);
                serde_json::to_vec(&entry).map_err(|e| CacheError::Encode(e.to_string()))
            }
            Encoding::Raw => {
                match serde_json::to_value(value).map_err(|e| CacheError::Encode(e.to_string()))? {
                    serde_json::Value::String(text) => Ok(text.into_bytes()),
                    document => {
                        serde_json::to_vec(&document).map_err(|e| CacheError::Encode(e.to_string()))
                    }
                }
            }
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Decoded> {
        match self {
            Encoding::Structured => {
                let document: ciborium::Value =
                    ciborium::from_reader(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;
                decode_cbor(document)
            }
            Encoding::Json => {
                let document: serde_json::Value = serde_json::from_slice(bytes)
                    .map_err(|e| CacheError::Decode(e.to_string()))?;
                decode_json(document, None)
            }
            Encoding::Raw => {
                let text = String::from_utf8(bytes.to_vec())
                    .map_err(|e| CacheError::Decode(e.to_string()))?;
                match serde_json::from_str::<serde_json::Value>(&text) {
                    Ok(document) => decode_json(document, Some(text)),
                    Err(_) => Ok(Decoded {
                        expires_in: None,
                        created_at: None,
                        payload: Payload::Text(text),
                    }),
                }
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "serialize" => Ok(Encoding::Structured),
            "json" => Ok(Encoding::Json),
            "raw" | "document" => Ok(Encoding::Raw),
            other => Err(CacheError::UnknownEncoding(other.to_string())),
        }
    }
}

/// A decoded file: the envelope timestamps when present, and the value to hand back.
#[derive(Debug)]
pub(crate) struct Decoded {
    pub created_at: Option<NaiveDateTime>,
    pub expires_in: Option<NaiveDateTime>,
    pub payload: Payload,
}

#[derive(Debug)]
pub(crate) enum Payload {
    Cbor(ciborium::Value),
    Json(serde_json::Value),
    /// Raw file text that also parsed as JSON; either reading may be the intended one.
    Document {
        text: String,
        document: serde_json::Value,
    },
    Text(String),
}

impl Payload {
    pub fn into_value<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Payload::Cbor(value) => value
                .deserialized()
                .map_err(|e| CacheError::Decode(e.to_string())),
            Payload::Json(value) => {
                serde_json::from_value(value).map_err(|e| CacheError::Decode(e.to_string()))
            }
            Payload::Document { text, document } => serde_json::from_value(document)
                .or_else(|_| serde_json::from_value(serde_json::Value::String(text)))
                .map_err(|e| CacheError::Decode(e.to_string())),
            Payload::Text(text) => serde_json::from_value(serde_json::Value::String(text))
                .map_err(|e| CacheError::Decode(e.to_string())),
        }
    }
}

fn decode_cbor(document: ciborium::Value) -> Result<Decoded> {
    let ciborium::Value::Map(fields) = document else {
        return Err(CacheError::InvalidContent("entry is not a record".to_string()));
    };

    let mut created_at = None;
    let mut expires_in = None;
    let mut content = None;
    for (key, value) in fields {
        match key.as_text() {
            Some("created_at") => created_at = cbor_timestamp(&value).ok(),
            Some("expires_in") => expires_in = Some(cbor_timestamp(&value)?),
            Some("content") => content = Some(value),
            _ => {}
        }
    }

    let content = content
        .filter(|value| !value.is_null())
        .ok_or_else(|| CacheError::InvalidContent("entry has no content".to_string()))?;

    Ok(Decoded {
        created_at,
        expires_in,
        payload: Payload::Cbor(content),
    })
}

fn cbor_timestamp(value: &ciborium::Value) -> Result<NaiveDateTime> {
    value
        .as_text()
        .and_then(parse_timestamp)
        .ok_or_else(|| CacheError::InvalidContent(format!("invalid timestamp: {value:?}")))
}

fn decode_json(document: serde_json::Value, raw_text: Option<String>) -> Result<Decoded> {
    let mut fields = match document {
        serde_json::Value::Object(fields) => fields,
        other => {
            return Ok(Decoded {
                created_at: None,
                expires_in: None,
                payload: json_payload(other, raw_text),
            });
        }
    };

    let expires_in = match fields.get("expires_in").map(json_timestamp) {
        None => None,
        Some(Some(at)) => Some(at),
        // A raw document whose own expires_in is not an envelope timestamp is plain user data
        Some(None) if raw_text.is_some() => {
            return Ok(Decoded {
                created_at: None,
                expires_in: None,
                payload: json_payload(serde_json::Value::Object(fields), raw_text),
            });
        }
        Some(None) => {
            return Err(CacheError::InvalidContent(
                "invalid expires_in timestamp".to_string(),
            ));
        }
    };
    let created_at = fields.get("created_at").and_then(json_timestamp);
    let payload = match fields.remove("content") {
        Some(content) => Payload::Json(content),
        None => json_payload(serde_json::Value::Object(fields), raw_text),
    };

    Ok(Decoded {
        created_at,
        expires_in,
        payload,
    })
}

fn json_payload(document: serde_json::Value, raw_text: Option<String>) -> Payload {
    match raw_text {
        Some(text) => Payload::Document { text, document },
        None => Payload::Json(document),
    }
}

fn json_timestamp(value: &serde_json::Value) -> Option<NaiveDateTime> {
    value.as_str().and_then(parse_timestamp)
}
