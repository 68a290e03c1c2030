use tracing::{info, warn};
use crate::api::adafruit::AdafruitClient;
use crate::config::Config;
use crate::models::{DashboardData, Notice, NoticeLevel, Series};
use crate::services::{feed_service, normalize_service};
use crate::utils::FeedCache;

pub const TEMP_FEED_KEY: &str = "temperature";
pub const HUMID_FEED_KEY: &str = "humidity";

/// Holds the feed client and the memo cache between page loads
pub struct DashboardService {
    client: AdafruitClient,
    cache: FeedCache,
    feed_limit: u32,
    has_api_key: bool,
}

impl DashboardService {
    pub fn new(config: &Config) -> Self {
        Self::with_client(AdafruitClient::from_config(config), config)
    }

    pub fn with_client(client: AdafruitClient, config: &Config) -> Self {
        let cache = FeedCache::new(config.cache_ttl);
        info!(
            "Dashboard ready: limit {} records per feed, cache TTL {}s",
            config.feed_limit,
            cache.ttl().as_secs()
        );
        Self {
            client,
            cache,
            feed_limit: config.feed_limit,
            has_api_key: config.has_api_key(),
        }
    }

    /// Clear every memoized fetch so the next load goes to the network
    pub fn refresh(&mut self) {
        info!("Clearing feed cache ({} entries)", self.cache.len());
        self.cache.invalidate_all();
    }

    /// Fetch and normalize both feeds, one after the other.
    ///
    /// A feed that fails to fetch shows up as an empty series with an error
    /// notice; the other feed is still processed.
    pub async fn load(&mut self) -> DashboardData {
        let mut notices = Vec::new();

        if !self.has_api_key {
            notices.push(Notice::info(
                "AIO_KEY is not set; requesting feeds without an API key.",
            ));
        }

        let temperature = self.load_series(TEMP_FEED_KEY, &mut notices).await;
        let humidity = self.load_series(HUMID_FEED_KEY, &mut notices).await;

        let (temperature, humidity) = match (temperature, humidity) {
            (Some(t), Some(h)) => (t, h),
            (t, h) => {
                notices.push(Notice::error(
                    "Unable to fetch data from Adafruit IO. Check your credentials or network.",
                ));
                (
                    t.unwrap_or_else(|| Series::empty(TEMP_FEED_KEY)),
                    h.unwrap_or_else(|| Series::empty(HUMID_FEED_KEY)),
                )
            }
        };

        let mut data = DashboardData { temperature, humidity, notices };

        if !data.has_data() {
            let message = "No valid data available. Ensure your ESP32 is uploading to Adafruit IO.";
            warn!("{}", message);
            data.notices.push(Notice::warning(message));
            return data;
        }

        info!(
            "Loaded {} temperature and {} humidity points ({} errors, {} warnings)",
            data.temperature.len(),
            data.humidity.len(),
            data.count(NoticeLevel::Error),
            data.count(NoticeLevel::Warning)
        );
        data
    }

    /// `None` only when the fetch itself failed
    async fn load_series(&mut self, feed_key: &str, notices: &mut Vec<Notice>) -> Option<Series> {
        let raw = feed_service::get_feed_data(
            &self.client,
            &mut self.cache,
            feed_key,
            self.feed_limit,
            notices,
        )
        .await?;

        let normalized = normalize_service::normalize(feed_key, Some(raw.as_slice()));
        for skipped in normalized.skipped {
            let message = skipped.to_string();
            warn!("{}: {}", feed_key, message);
            notices.push(Notice::warning(message));
        }
        Some(normalized.series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{unreachable_base_url, StubServer};

    const TEMP_PATH: &str = "/api/v2/someone/feeds/temperature/data";
    const HUMID_PATH: &str = "/api/v2/someone/feeds/humidity/data";
    const TEMP_BODY: &str = r#"[
        {"created_at":"2024-01-01T00:00:02Z","value":"25.0"},
        {"created_at":"2024-01-01T00:00:01Z","value":"24.5"}
    ]"#;
    const HUMID_BODY: &str = r#"[
        {"created_at":"2024-01-01T00:00:01Z","value":"70"},
        {"created_at":"2024-01-01T00:00:02Z","value":"N/A"}
    ]"#;

    fn config(key: Option<&str>) -> Config {
        let key = key.map(|k| k.to_string());
        Config::from_lookup(|name| match name {
            "AIO_USERNAME" => Some("someone".to_string()),
            "AIO_KEY" => key.clone(),
            _ => None,
        })
        .unwrap()
    }

    fn service(base_url: &str, config: &Config) -> DashboardService {
        let client = AdafruitClient::with_base_url(
            config.username.clone(),
            config.api_key.clone(),
            base_url.to_string(),
        );
        DashboardService::with_client(client, config)
    }

    #[tokio::test]
    async fn test_load_both_feeds() {
        let stub = StubServer::start(&[(TEMP_PATH, 200, TEMP_BODY), (HUMID_PATH, 200, HUMID_BODY)]).await;
        let config = config(Some("key"));
        let mut dashboard = service(&stub.base_url, &config);

        let data = dashboard.load().await;

        assert_eq!(data.temperature.feed, "temperature");
        assert_eq!(
            data.temperature.points.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![24.5, 25.0]
        );
        assert_eq!(data.humidity.len(), 1);
        assert_eq!(data.count(NoticeLevel::Warning), 1);
        assert_eq!(data.count(NoticeLevel::Error), 0);
        assert!(data.has_data());
    }

    #[tokio::test]
    async fn test_reload_uses_cache_until_refresh() {
        let stub = StubServer::start(&[(TEMP_PATH, 200, TEMP_BODY), (HUMID_PATH, 200, HUMID_BODY)]).await;
        let config = config(Some("key"));
        let mut dashboard = service(&stub.base_url, &config);

        let first = dashboard.load().await;
        let second = dashboard.load().await;
        assert_eq!(stub.hits(), 2);
        assert_eq!(first.temperature, second.temperature);

        dashboard.refresh();
        dashboard.load().await;
        assert_eq!(stub.hits(), 4);
    }

    #[tokio::test]
    async fn test_failed_feed_does_not_block_sibling() {
        let stub = StubServer::start(&[(TEMP_PATH, 503, "down"), (HUMID_PATH, 200, HUMID_BODY)]).await;
        let config = config(Some("key"));
        let mut dashboard = service(&stub.base_url, &config);

        let data = dashboard.load().await;

        assert!(data.temperature.is_empty());
        assert_eq!(data.humidity.len(), 1);
        assert!(data.has_data());
        let errors: Vec<&str> = data
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Error fetching data for temperature"));
        assert!(errors[1].starts_with("Unable to fetch data from Adafruit IO"));
    }

    #[tokio::test]
    async fn test_non_object_entries_are_skipped_not_fatal() {
        let mixed = r#"[{"created_at":"2024-01-01T00:00:01Z","value":"24.5"}, null, 5]"#;
        let stub = StubServer::start(&[(TEMP_PATH, 200, mixed), (HUMID_PATH, 200, HUMID_BODY)]).await;
        let config = config(Some("key"));
        let mut dashboard = service(&stub.base_url, &config);

        let data = dashboard.load().await;

        assert_eq!(data.temperature.len(), 1);
        assert_eq!(data.temperature.points[0].value, 24.5);
        assert_eq!(data.count(NoticeLevel::Error), 0);
        // two skipped temperature entries plus the bad humidity value
        assert_eq!(data.count(NoticeLevel::Warning), 3);
    }

    #[tokio::test]
    async fn test_nothing_reachable() {
        let config = config(None);
        let mut dashboard = service(&unreachable_base_url().await, &config);

        let data = dashboard.load().await;

        assert!(!data.has_data());
        assert_eq!(data.count(NoticeLevel::Info), 1);
        assert_eq!(data.count(NoticeLevel::Error), 3);
        assert_eq!(data.count(NoticeLevel::Warning), 1);
        assert!(data
            .notices
            .last()
            .map(|n| n.message.starts_with("No valid data available"))
            .unwrap_or(false));
    }
}
