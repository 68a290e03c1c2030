use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue};
use super::models::{FetchError, RawRecord};
use crate::config::Config;
use tracing::debug;

/// Header Adafruit IO reads the account key from
const AIO_KEY_HEADER: &str = "x-aio-key";

/// Adafruit IO REST client, read-only access to feed data
pub struct AdafruitClient {
    http_client: HttpClient,
    username: String,
    api_key: Option<String>,
    base_url: String,
}

impl AdafruitClient {
    /// Create a client with custom base URL (for testing)
    pub fn with_base_url(username: String, api_key: Option<String>, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            username,
            api_key,
            base_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(
            config.username.clone(),
            config.api_key.clone(),
            config.base_url.clone(),
        )
    }

    fn feed_data_url(&self, feed_key: &str) -> String {
        format!(
            "{}/{}/feeds/{}/data",
            self.base_url,
            urlencoding::encode(&self.username),
            urlencoding::encode(feed_key)
        )
    }

    /// The key is passed through verbatim. Without one no header is sent and
    /// the service decides whether the feed is readable.
    fn create_headers(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| FetchError::InvalidCredential(e.to_string()))?;
            headers.insert(AIO_KEY_HEADER, value);
        }
        Ok(headers)
    }

    /// GET /{username}/feeds/{feed_key}/data?limit={limit}
    ///
    /// Returns the most recent `limit` data points of the feed in whatever order
    /// the service sends them.
    pub async fn get_feed_data(
        &self,
        feed_key: &str,
        limit: u32,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.feed_data_url(feed_key);
        let headers = self.create_headers()?;

        debug!("GET {} (limit {})", url, limit);
        let response = self.http_client
            .get(&url)
            .headers(headers)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(FetchError::Request)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        // Decoded element by element so one malformed entry is left to the normalizer
        let elements = response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(FetchError::Decode)?;
        Ok(elements.into_iter().map(RawRecord::from_json).collect())
    }
}
