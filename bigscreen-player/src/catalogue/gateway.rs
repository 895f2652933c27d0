//! Catalogue access with indefinite retry
//!
//! The gateway is the only component that performs network I/O. Transport
//! failures, unexpected statuses and unparseable bodies are all retried at a
//! fixed delay, forever: the caller always eventually gets an answer, and a
//! persistently unreachable service stalls playback rather than failing it.
//! A 404 resolves to `None` without retrying.

use crate::catalogue::client::{ApiResponse, MediaApi};
use crate::catalogue::models::{Envelope, MediaItem, MediaItemLookup, MediaItemsPage, Permissions};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Delay between retries of a failed request
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Page size when polling for live streams
const LIVE_CHECK_LIMIT: u32 = 10;

/// Page size for the most-recent-items listing
const RECENT_VOD_LIMIT: u32 = 25;

/// Retrying wrapper around the media service transport
pub struct Gateway {
    api: Arc<dyn MediaApi>,
    retry_delay: Duration,
}

impl Gateway {
    pub fn new(api: Arc<dyn MediaApi>) -> Self {
        Self::with_retry_delay(api, RETRY_DELAY)
    }

    /// Same as [`Gateway::new`] with a custom retry delay. Retries stay
    /// unbounded either way; tests shrink the delay and script the transport.
    pub fn with_retry_delay(api: Arc<dyn MediaApi>, retry_delay: Duration) -> Self {
        Self { api, retry_delay }
    }

    /// Fetch and deserialize `path`. Always eventually resolves; `None`
    /// means the resource does not exist.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        debug!(path, "making api request");
        loop {
            match self.api.get(path).await {
                Ok(ApiResponse::NotFound) => {
                    debug!(path, "api request completed with a 404");
                    return None;
                }
                Ok(ApiResponse::Body(body)) => match serde_json::from_str::<T>(&body) {
                    Ok(value) => {
                        debug!(path, "api request completed");
                        return Some(value);
                    }
                    Err(e) => {
                        warn!(path, error = %e, "api response unparseable, retrying shortly");
                    }
                },
                Err(e) => {
                    warn!(path, error = %e, "api request failed, retrying shortly");
                }
            }
            sleep(self.retry_delay).await;
        }
    }

    /// Capabilities granted to the presented API key
    pub async fn permissions(&self) -> Option<Permissions> {
        self.fetch::<Envelope<Permissions>>("permissions")
            .await
            .map(|envelope| envelope.data)
    }

    /// Look a single item up by id
    pub async fn media_item(&self, id: u64) -> Option<MediaItem> {
        self.fetch::<Envelope<MediaItemLookup>>(&format!("mediaItems/{}", id))
            .await
            .map(|envelope| envelope.data.media_item)
    }

    /// Most recently scheduled items with an available on-demand video
    pub async fn recent_vod_items(&self) -> Vec<MediaItem> {
        let path = format!(
            "mediaItems?sortMode=SCHEDULED_PUBLISH_TIME&sortDirection=DESC&vodIncludeSetting=HAS_AVAILABLE_VOD&limit={}",
            RECENT_VOD_LIMIT
        );
        self.fetch::<Envelope<MediaItemsPage>>(&path)
            .await
            .map(|envelope| envelope.data.media_items)
            .unwrap_or_default()
    }

    /// Most recently scheduled items carrying a live stream
    pub async fn live_items(&self) -> Vec<MediaItem> {
        let path = format!(
            "mediaItems?sortMode=SCHEDULED_PUBLISH_TIME&sortDirection=DESC&streamIncludeSetting=HAS_LIVE_STREAM&limit={}",
            LIVE_CHECK_LIMIT
        );
        self.fetch::<Envelope<MediaItemsPage>>(&path)
            .await
            .map(|envelope| envelope.data.media_items)
            .unwrap_or_default()
    }

    /// All items of one playlist, in playlist order
    pub async fn playlist_items(&self, playlist_id: u64) -> Vec<MediaItem> {
        self.fetch::<Envelope<Vec<MediaItem>>>(&format!("playlists/{}/mediaItems", playlist_id))
            .await
            .map(|envelope| envelope.data)
            .unwrap_or_default()
    }
}
