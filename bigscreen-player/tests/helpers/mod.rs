//! Shared test helpers: a scripted media service transport, a fake player
//! process, and catalogue fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use bigscreen_player::catalogue::models::{
    LiveStreamInfo, LiveStreamState, MediaItem, Quality, QualityUrls, UrlEntry, VodInfo,
};
use bigscreen_player::catalogue::{ApiResponse, Gateway, MediaApi};
use bigscreen_player::error::{Error, Result};
use bigscreen_player::playback::{
    Candidate, CandidateBuilder, PlaybackController, PlayerControl, PlayerExited, PlayMode,
    PlayQueue, QueueManager,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub const RECENT_VOD_PATH: &str =
    "mediaItems?sortMode=SCHEDULED_PUBLISH_TIME&sortDirection=DESC&vodIncludeSetting=HAS_AVAILABLE_VOD&limit=25";

pub const LIVE_ITEMS_PATH: &str =
    "mediaItems?sortMode=SCHEDULED_PUBLISH_TIME&sortDirection=DESC&streamIncludeSetting=HAS_LIVE_STREAM&limit=10";

pub fn item_path(id: u64) -> String {
    format!("mediaItems/{}", id)
}

pub fn playlist_path(id: u64) -> String {
    format!("playlists/{}/mediaItems", id)
}

#[derive(Clone)]
enum ScriptedResponse {
    Body(String),
    NotFound,
    TransportError,
}

/// Transport whose responses are scripted per path. Responses for a path are
/// consumed in order; the last one repeats. Unscripted paths answer 404.
pub struct ScriptedApi {
    responses: Mutex<HashMap<String, VecDeque<ScriptedResponse>>>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// Like [`ScriptedApi::new`], but every request suspends for `delay`
    /// before answering, opening a window for interleavings.
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn script_body(&self, path: &str, body: String) {
        self.push(path, ScriptedResponse::Body(body));
    }

    pub fn script_not_found(&self, path: &str) {
        self.push(path, ScriptedResponse::NotFound);
    }

    pub fn script_failure(&self, path: &str) {
        self.push(path, ScriptedResponse::TransportError);
    }

    fn push(&self, path: &str, response: ScriptedResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    /// Every requested path, in issue order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == path)
            .count()
    }
}

#[async_trait]
impl MediaApi for ScriptedApi {
    async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(path.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match response {
            Some(ScriptedResponse::Body(body)) => Ok(ApiResponse::Body(body)),
            Some(ScriptedResponse::NotFound) | None => Ok(ApiResponse::NotFound),
            Some(ScriptedResponse::TransportError) => {
                Err(Error::Transport("scripted failure".to_string()))
            }
        }
    }
}

#[derive(Default)]
struct FakePlayerState {
    running: Option<(String, PlayMode, u64)>,
    next_generation: u64,
    starts: Vec<(String, PlayMode)>,
}

/// Player stand-in that records starts and lets tests end the process.
/// Like the real supervisor it emits one exit event per started process and
/// refuses to run two processes at once.
pub struct FakePlayer {
    events: mpsc::UnboundedSender<PlayerExited>,
    state: Mutex<FakePlayerState>,
}

impl FakePlayer {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PlayerExited>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                events,
                state: Mutex::new(FakePlayerState::default()),
            }),
            events_rx,
        )
    }

    /// URLs handed to `start`, in order
    pub fn start_urls(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .starts
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn starts(&self) -> Vec<(String, PlayMode)> {
        self.state.lock().unwrap().starts.clone()
    }

    /// URL of the process currently running, if any
    pub fn running_url(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .running
            .as_ref()
            .map(|(url, _, _)| url.clone())
    }

    /// Simulate the running process ending on its own
    pub fn finish_current(&self) {
        let running = self
            .state
            .lock()
            .unwrap()
            .running
            .take()
            .expect("no player process to finish");
        let _ = self.events.send(PlayerExited {
            generation: running.2,
        });
    }
}

#[async_trait]
impl PlayerControl for FakePlayer {
    async fn start(&self, url: &str, mode: PlayMode) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        assert!(
            state.running.is_none(),
            "two player processes running at once"
        );
        state.next_generation += 1;
        let generation = state.next_generation;
        state.running = Some((url.to_string(), mode, generation));
        state.starts.push((url.to_string(), mode));
        Ok(generation)
    }

    async fn stop(&self) {
        let running = self.state.lock().unwrap().running.take();
        if let Some((_, _, generation)) = running {
            let _ = self.events.send(PlayerExited { generation });
        }
    }
}

/// A controller wired to a scripted transport and a fake player
pub struct Harness {
    pub api: Arc<ScriptedApi>,
    pub gateway: Arc<Gateway>,
    pub player: Arc<FakePlayer>,
    pub queue: PlayQueue,
    pub controller: Arc<PlaybackController>,
}

pub fn harness(
    api: Arc<ScriptedApi>,
    playlist_ids: Vec<u64>,
    media_item_ids: Vec<u64>,
    randomise: bool,
) -> Harness {
    let gateway = Arc::new(Gateway::with_retry_delay(
        api.clone(),
        Duration::from_millis(10),
    ));
    let queue = PlayQueue::new();
    let queue_manager = QueueManager::new(
        Arc::clone(&gateway),
        test_builder(),
        playlist_ids,
        media_item_ids,
        randomise,
        queue.clone(),
    );
    let (player, events) = FakePlayer::new();
    let player_control: Arc<dyn PlayerControl> = player.clone();
    let controller = PlaybackController::new(
        Arc::clone(&gateway),
        player_control,
        queue.clone(),
        queue_manager,
    );
    controller.start(events);
    Harness {
        api,
        gateway,
        player,
        queue,
        controller,
    }
}

/// Builder preferring quality 1 with nothing denylisted
pub fn test_builder() -> CandidateBuilder {
    CandidateBuilder::new(vec![1], vec![])
}

/// Let spawned tasks and timers shorter than the fixed delays run out
/// (paused-clock tests only)
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

pub fn vod_item(id: u64, url: &str) -> MediaItem {
    MediaItem {
        id,
        vod: Some(VodInfo {
            available: true,
            qualities: vec![Quality { id: 1, name: None }],
            url_data: vec![QualityUrls {
                quality: Quality { id: 1, name: None },
                urls: vec![UrlEntry {
                    content_type: "video/mp4".to_string(),
                    url: url.to_string(),
                }],
            }],
        }),
        live_stream: None,
    }
}

pub fn live_item(id: u64, stream_id: u64, url: &str) -> MediaItem {
    MediaItem {
        id,
        vod: None,
        live_stream: Some(LiveStreamInfo {
            state: LiveStreamState::Live,
            live_stream_id: stream_id,
            qualities: vec![Quality { id: 1, name: None }],
            url_data: vec![QualityUrls {
                quality: Quality { id: 1, name: None },
                urls: vec![UrlEntry {
                    content_type: "application/x-mpegURL".to_string(),
                    url: url.to_string(),
                }],
            }],
        }),
    }
}

pub fn video_candidate(item: &MediaItem) -> Arc<Candidate> {
    Arc::new(
        test_builder()
            .build(item.clone(), PlayMode::Video)
            .expect("fixture item should build"),
    )
}

pub fn stream_candidate(item: &MediaItem) -> Arc<Candidate> {
    Arc::new(
        test_builder()
            .build(item.clone(), PlayMode::Stream)
            .expect("fixture item should build"),
    )
}

pub fn listing_body(items: &[MediaItem]) -> String {
    serde_json::json!({ "data": { "mediaItems": items } }).to_string()
}

pub fn playlist_body(items: &[MediaItem]) -> String {
    serde_json::json!({ "data": items }).to_string()
}

pub fn item_body(item: &MediaItem) -> String {
    serde_json::json!({ "data": { "mediaItem": item } }).to_string()
}
