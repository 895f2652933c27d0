//! Queue refill from the configured catalogue sources
//!
//! Sources are additive and ordered: the most-recent-items listing (only when
//! nothing else is configured), then each configured playlist, then each
//! explicitly configured item. Requests go to the gateway one at a time to
//! bound load on the service, so refill results are deterministic before any
//! shuffling.

use crate::catalogue::gateway::Gateway;
use crate::catalogue::models::MediaItem;
use crate::playback::candidate::{Candidate, CandidateBuilder, PlayMode};
use crate::playback::queue::PlayQueue;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info};

/// Refills the play queue with on-demand candidates
pub struct QueueManager {
    gateway: Arc<Gateway>,
    builder: CandidateBuilder,
    playlist_ids: Vec<u64>,
    media_item_ids: Vec<u64>,
    randomise: bool,
    queue: PlayQueue,
}

impl QueueManager {
    pub fn new(
        gateway: Arc<Gateway>,
        builder: CandidateBuilder,
        playlist_ids: Vec<u64>,
        media_item_ids: Vec<u64>,
        randomise: bool,
        queue: PlayQueue,
    ) -> Self {
        Self {
            gateway,
            builder,
            playlist_ids,
            media_item_ids,
            randomise,
            queue,
        }
    }

    /// Fetch every configured source in order and append the candidates they
    /// yield to the queue. Returns how many were appended.
    pub async fn refill(&self) -> usize {
        debug!("refilling queue");
        let mut candidates: Vec<Arc<Candidate>> = Vec::new();

        if self.playlist_ids.is_empty() && self.media_item_ids.is_empty() {
            let items = self.gateway.recent_vod_items().await;
            self.collect(&mut candidates, items);
        }

        for &playlist_id in &self.playlist_ids {
            let items = self.gateway.playlist_items(playlist_id).await;
            self.collect(&mut candidates, items);
        }

        for &media_item_id in &self.media_item_ids {
            if let Some(item) = self.gateway.media_item(media_item_id).await {
                self.collect(&mut candidates, vec![item]);
            }
        }

        if self.randomise {
            candidates.shuffle(&mut rand::thread_rng());
        }

        let added = candidates.len();
        self.queue.append(candidates).await;
        info!(added, "queue refilled");
        added
    }

    fn collect(&self, out: &mut Vec<Arc<Candidate>>, items: Vec<MediaItem>) {
        for item in items {
            if let Some(candidate) = self.builder.build(item, PlayMode::Video) {
                out.push(Arc::new(candidate));
            }
        }
    }
}
