//! Dashboard page models

use super::{Notice, NoticeLevel, Series};

/// Chart color scheme selected on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse the `theme` query value, falling back to light
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub temperature: Series,
    pub humidity: Series,
    pub notices: Vec<Notice>,
}

impl DashboardData {
    /// True when at least one series has something to plot
    pub fn has_data(&self) -> bool {
        !self.temperature.is_empty() || !self.humidity.is_empty()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.iter().filter(|n| n.level == level).count()
    }
}
