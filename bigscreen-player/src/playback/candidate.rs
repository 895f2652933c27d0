//! Candidate construction
//!
//! Turns a raw catalogue item into a playable candidate, or rejects it.
//! Pure; no I/O. Selection is a two-level walk: quality preference order
//! first, then URL-table order within the chosen quality — the first entry
//! matching the mode's content format wins.

use crate::catalogue::models::{LiveStreamState, MediaItem, Quality, QualityUrls};
use std::fmt;

/// Playback mode of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// On-demand video
    Video,
    /// Live stream
    Stream,
}

impl PlayMode {
    /// Content type a URL entry must carry to be playable in this mode:
    /// a progressive file for on-demand, a segmented stream for live.
    pub fn content_type(self) -> &'static str {
        match self {
            PlayMode::Video => "video/mp4",
            PlayMode::Stream => "application/x-mpegURL",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMode::Video => write!(f, "video"),
            PlayMode::Stream => write!(f, "stream"),
        }
    }
}

/// A fully resolved playable item. Immutable once built; shared as
/// `Arc<Candidate>` so staleness can be decided by identity rather than by
/// value (two different items may resolve to the same URL).
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The catalogue item this candidate was built from
    pub item: MediaItem,
    /// The one admissible URL for the item in this mode
    pub url: String,
    pub mode: PlayMode,
}

/// Builds playable candidates from raw catalogue items
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    quality_ids: Vec<u32>,
    denylisted_ids: Vec<u64>,
}

impl CandidateBuilder {
    pub fn new(quality_ids: Vec<u32>, denylisted_ids: Vec<u64>) -> Self {
        Self {
            quality_ids,
            denylisted_ids,
        }
    }

    /// Whether the item can be played in `mode` right now: an on-demand
    /// video must be marked available, a live stream must be on air.
    pub fn is_playable(item: &MediaItem, mode: PlayMode) -> bool {
        match mode {
            PlayMode::Video => item.vod.as_ref().map(|vod| vod.available).unwrap_or(false),
            PlayMode::Stream => item
                .live_stream
                .as_ref()
                .map(|live| live.state == LiveStreamState::Live)
                .unwrap_or(false),
        }
    }

    /// Build a candidate for `item` in `mode`, or reject it
    pub fn build(&self, item: MediaItem, mode: PlayMode) -> Option<Candidate> {
        if !Self::is_playable(&item, mode) {
            return None;
        }

        if self.denylisted_ids.contains(&item.id) {
            return None;
        }

        let url = {
            let (qualities, url_data) = match mode {
                PlayMode::Video => {
                    let vod = item.vod.as_ref()?;
                    (&vod.qualities, &vod.url_data)
                }
                PlayMode::Stream => {
                    let live = item.live_stream.as_ref()?;
                    (&live.qualities, &live.url_data)
                }
            };
            self.choose_url(qualities, url_data, mode)?
        };

        Some(Candidate { item, url, mode })
    }

    /// Walk the quality preference list in order; the first preference the
    /// item offers a format-matching URL for wins, URL-table order breaking
    /// ties within a level.
    fn choose_url(
        &self,
        qualities: &[Quality],
        url_data: &[QualityUrls],
        mode: PlayMode,
    ) -> Option<String> {
        let wanted = mode.content_type();
        for &preferred in &self.quality_ids {
            if !qualities.iter().any(|quality| quality.id == preferred) {
                continue;
            }
            for table in url_data.iter().filter(|table| table.quality.id == preferred) {
                if let Some(entry) = table.urls.iter().find(|entry| entry.content_type == wanted) {
                    return Some(entry.url.clone());
                }
            }
        }
        None
    }
}
