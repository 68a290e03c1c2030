use tracing::{debug, error, info};
use crate::api::adafruit::{AdafruitClient, RawRecord};
use crate::models::Notice;
use crate::utils::FeedCache;

/// Fetch a feed's most recent `limit` records, memoized per feed key.
///
/// A fresh cached result is returned without touching the network. Failures
/// of any kind are reported as an error notice and give `None`; they are not
/// cached, so the next call tries again.
pub async fn get_feed_data(
    client: &AdafruitClient,
    cache: &mut FeedCache,
    feed_key: &str,
    limit: u32,
    notices: &mut Vec<Notice>,
) -> Option<Vec<RawRecord>> {
    if let Some(records) = cache.get(feed_key) {
        debug!("Cache hit for feed '{}' ({} records)", feed_key, records.len());
        return Some(records);
    }

    match client.get_feed_data(feed_key, limit).await {
        Ok(records) => {
            info!("Fetched {} records for feed '{}'", records.len(), feed_key);
            cache.insert(feed_key, records.clone());
            Some(records)
        }
        Err(e) => {
            let message = format!("Error fetching data for {}: {}", feed_key, e);
            error!("{}", message);
            notices.push(Notice::error(message));
            None
        }
    }
}
