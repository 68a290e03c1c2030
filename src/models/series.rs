//! Normalized time series models

use chrono::{DateTime, Utc};

/// A single reading with an absolute timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Readings of one feed, sorted ascending by timestamp.
/// Duplicate timestamps are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub feed: String,
    pub points: Vec<NormalizedPoint>,
}

impl Series {
    pub fn empty(feed: &str) -> Self {
        Series {
            feed: feed.to_string(),
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Points newest first, for the raw data tables
    pub fn newest_first(&self) -> impl Iterator<Item = &NormalizedPoint> {
        self.points.iter().rev()
    }
}
