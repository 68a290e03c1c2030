use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

/// One data point as returned by `GET /{username}/feeds/{feed_key}/data`.
///
/// The service sends more fields (`feed_id`, `expiration`, location data, ...)
/// which are ignored. `created_at` and `value` are optional here so that a
/// single malformed entry is rejected by the normalizer instead of failing the
/// decode of the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

impl RawRecord {
    /// Read one element of a feed response. Elements that are not JSON objects
    /// (null, numbers, strings) give an empty record.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => RawRecord::default(),
        }
    }

    #[cfg(test)]
    pub fn new(created_at: &str, value: &str) -> Self {
        RawRecord {
            id: None,
            created_at: Some(created_at.to_string()),
            value: Some(value.to_string()),
        }
    }
}

impl fmt::Display for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| match v {
            Some(s) => format!("'{}'", s),
            None => "None".to_string(),
        };
        write!(f, "{{")?;
        if let Some(id) = &self.id {
            write!(f, "id: '{}', ", id)?;
        }
        write!(
            f,
            "created_at: {}, value: {}}}",
            show(&self.created_at),
            show(&self.value)
        )
    }
}

/// Accepts strings as-is and numbers in their textual form; anything else
/// (null, bool, objects) becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Failure of a single feed request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid API key header: {0}")]
    InvalidCredential(String),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Decode(#[source] reqwest::Error),
}
