use chrono::{DateTime, NaiveDateTime, Utc};
use std::num::ParseFloatError;
use thiserror::Error;
use crate::api::adafruit::RawRecord;
use crate::models::{NormalizedPoint, Series};

/// Why a single raw record was left out of a series
#[derive(Debug, Error, PartialEq)]
pub enum RecordParseError {
    #[error("Skipping invalid entry: {record} (missing {field})")]
    MissingField { record: String, field: &'static str },
    #[error("Skipping invalid entry: {record} (invalid timestamp: {source})")]
    Timestamp {
        record: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Skipping invalid entry: {record} (invalid value: {source})")]
    Value {
        record: String,
        #[source]
        source: ParseFloatError,
    },
}

/// A normalized series plus the records that had to be skipped
#[derive(Debug)]
pub struct Normalized {
    pub series: Series,
    pub skipped: Vec<RecordParseError>,
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// A trailing `Z` and explicit offsets are both accepted. Timestamps without
/// any offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

/// Parse a string-encoded reading. Surrounding whitespace is ignored.
pub fn parse_value(raw: &str) -> Result<f64, ParseFloatError> {
    raw.trim().parse::<f64>()
}

/// Convert one raw record into a point
pub fn normalize_record(record: &RawRecord) -> Result<NormalizedPoint, RecordParseError> {
    let created_at = record.created_at.as_deref().ok_or_else(|| RecordParseError::MissingField {
        record: record.to_string(),
        field: "created_at",
    })?;
    let value = record.value.as_deref().ok_or_else(|| RecordParseError::MissingField {
        record: record.to_string(),
        field: "value",
    })?;

    let timestamp = parse_timestamp(created_at).map_err(|source| RecordParseError::Timestamp {
        record: record.to_string(),
        source,
    })?;
    let value = parse_value(value).map_err(|source| RecordParseError::Value {
        record: record.to_string(),
        source,
    })?;

    Ok(NormalizedPoint { timestamp, value })
}

/// Normalize a feed's raw records into a time-ordered series.
///
/// Bad records are skipped and reported, never fatal. `None` (a failed fetch)
/// and an empty batch both give an empty series.
pub fn normalize(feed: &str, records: Option<&[RawRecord]>) -> Normalized {
    let mut points = Vec::new();
    let mut skipped = Vec::new();

    for record in records.unwrap_or_default() {
        match normalize_record(record) {
            Ok(point) => points.push(point),
            Err(e) => skipped.push(e),
        }
    }

    // stable, so equal timestamps keep their source order
    points.sort_by_key(|p| p.timestamp);

    Normalized {
        series: Series {
            feed: feed.to_string(),
            points,
        },
        skipped,
    }
}
