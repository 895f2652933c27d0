//! Live-stream polling and preemption
//!
//! Polls the catalogue for items currently on air and decides, once per
//! poll, whether live preemption starts, persists or ends. The monitor is
//! the sole authority for starting and ending live preemption: it only ever
//! inserts at the queue front or asks the controller to move on, never
//! touching queued on-demand entries.

use crate::catalogue::gateway::Gateway;
use crate::playback::candidate::{Candidate, CandidateBuilder, PlayMode};
use crate::playback::controller::PlaybackController;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Pause between live-stream polls
pub const LIVE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls for live streams and preempts the queue
pub struct LiveMonitor {
    gateway: Arc<Gateway>,
    builder: CandidateBuilder,
    allowlisted_stream_ids: Option<Vec<u64>>,
    controller: Arc<PlaybackController>,
}

impl LiveMonitor {
    pub fn new(
        gateway: Arc<Gateway>,
        builder: CandidateBuilder,
        allowlisted_stream_ids: Option<Vec<u64>>,
        controller: Arc<PlaybackController>,
    ) -> Self {
        Self {
            gateway,
            builder,
            allowlisted_stream_ids,
            controller,
        }
    }

    /// Poll for the lifetime of the process, rescheduling after each check
    pub async fn run(self) {
        loop {
            self.check().await;
            sleep(LIVE_POLL_INTERVAL).await;
        }
    }

    fn is_stream_allowed(&self, candidate: &Candidate) -> bool {
        let Some(allowed) = &self.allowlisted_stream_ids else {
            return true;
        };
        candidate
            .item
            .live_stream
            .as_ref()
            .map(|live| allowed.contains(&live.live_stream_id))
            .unwrap_or(false)
    }

    /// One poll: fetch what is on air and act on the change, if any
    pub async fn check(&self) {
        debug!("checking for live streams");
        let items = self.gateway.live_items().await;

        let intent = self.controller.current_intent().await;
        let recognised_url = intent
            .as_ref()
            .filter(|candidate| candidate.mode == PlayMode::Stream)
            .map(|candidate| candidate.url.clone());

        let mut recognised_still_live = false;
        let mut new_candidate: Option<Arc<Candidate>> = None;

        for item in items {
            let Some(candidate) = self.builder.build(item, PlayMode::Stream) else {
                continue;
            };
            if !self.is_stream_allowed(&candidate) {
                continue;
            }

            if recognised_url.as_deref() == Some(candidate.url.as_str()) {
                // still the same broadcast
                recognised_still_live = true;
                break;
            }
            if new_candidate.is_none() {
                new_candidate = Some(Arc::new(candidate));
            }
        }

        if recognised_still_live {
            return;
        }

        if let Some(candidate) = new_candidate {
            self.controller.preempt(candidate).await;
        } else if recognised_url.is_some() {
            info!("live stream has ended, loading next item");
            self.controller.advance().await;
        }
    }
}
