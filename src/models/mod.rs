//! Data models for the dashboard pipeline
//!
//! Normalized series, user-visible notices and the assembled page data.

pub mod series;
pub mod notice;
pub mod dashboard;

pub use series::{NormalizedPoint, Series};
pub use notice::{Notice, NoticeLevel};
pub use dashboard::{DashboardData, Theme};
