//! Ordered play queue
//!
//! Front = next to play. The queue manager appends on refill, the live
//! monitor inserts at the front on preemption, and the controller pops the
//! front when advancing. Nothing else touches the order.

use crate::playback::candidate::Candidate;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the play queue
#[derive(Clone, Default)]
pub struct PlayQueue {
    entries: Arc<Mutex<VecDeque<Arc<Candidate>>>>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next candidate to play
    pub async fn pop_front(&self) -> Option<Arc<Candidate>> {
        self.entries.lock().await.pop_front()
    }

    /// Insert a candidate ahead of everything queued
    pub async fn push_front(&self, candidate: Arc<Candidate>) {
        self.entries.lock().await.push_front(candidate);
    }

    /// Append candidates behind everything queued, preserving their order
    pub async fn append(&self, candidates: Vec<Arc<Candidate>>) {
        self.entries.lock().await.extend(candidates);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
