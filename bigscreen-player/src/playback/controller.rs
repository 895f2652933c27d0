//! Playback intent state machine
//!
//! The controller is the single writer of playback intent and the single
//! owner of the player process. Three event sources feed it — live-stream
//! polling, queue refills and player termination — and every state change is
//! serialised through one reconcile pass guarded by a single in-flight flag.
//! Staleness across awaited gaps is resolved by identity: after every
//! suspension point the captured candidate is compared against the current
//! intent, and the last-set intent always wins.

use crate::catalogue::gateway::Gateway;
use crate::playback::candidate::{Candidate, CandidateBuilder, PlayMode};
use crate::playback::queue::PlayQueue;
use crate::playback::queue_manager::QueueManager;
use crate::playback::supervisor::{PlayerControl, PlayerExited};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

/// Delay before retrying when a refill found nothing to play
pub const EMPTY_QUEUE_RETRY: Duration = Duration::from_secs(5);

/// A spawned player process and the candidate it is playing
struct PlayingProcess {
    candidate: Arc<Candidate>,
    generation: u64,
}

/// Owns "what should be playing now"
pub struct PlaybackController {
    gateway: Arc<Gateway>,
    player: Arc<dyn PlayerControl>,
    queue: PlayQueue,
    queue_manager: QueueManager,

    /// The candidate currently requested to play
    intent: Mutex<Option<Arc<Candidate>>>,

    /// The process currently believed to be running for the intent
    playing: Mutex<Option<PlayingProcess>>,

    /// Re-entrancy guard: one reconcile pass at a time, extra calls dropped
    updating: AtomicBool,

    /// Re-entrancy guard: one queue refill at a time
    refilling: AtomicBool,
}

impl PlaybackController {
    pub fn new(
        gateway: Arc<Gateway>,
        player: Arc<dyn PlayerControl>,
        queue: PlayQueue,
        queue_manager: QueueManager,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            player,
            queue,
            queue_manager,
            intent: Mutex::new(None),
            playing: Mutex::new(None),
            updating: AtomicBool::new(false),
            refilling: AtomicBool::new(false),
        })
    }

    /// Spawn the pump that feeds player exit events into the controller.
    /// Call once at startup.
    pub fn start(self: &Arc<Self>, mut events: mpsc::UnboundedReceiver<PlayerExited>) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                controller.handle_player_exit(event).await;
            }
        });
    }

    /// The candidate the controller currently intends to have playing
    pub async fn current_intent(&self) -> Option<Arc<Candidate>> {
        self.intent.lock().await.clone()
    }

    /// Put a live candidate at the front of the queue and switch to it,
    /// superseding whatever was playing.
    pub async fn preempt(self: &Arc<Self>, candidate: Arc<Candidate>) {
        info!(url = %candidate.url, "queueing live stream to play on next switch");
        self.queue.push_front(candidate).await;
        self.advance().await;
    }

    /// Take the next queue entry and make it the intent. On an empty queue:
    /// stop playback, refill, and try again when the refill lands.
    pub async fn advance(self: &Arc<Self>) {
        match self.queue.pop_front().await {
            Some(candidate) => self.set_intent(Some(candidate)).await,
            None => {
                self.set_intent(None).await;
                self.ensure_refill();
            }
        }
    }

    /// Record the new desired candidate, then reconcile the player with it
    pub async fn set_intent(self: &Arc<Self>, candidate: Option<Arc<Candidate>>) {
        self.store_intent(candidate).await;
        self.reconcile(None).await;
    }

    /// Reconcile the player process with the current intent.
    ///
    /// Exactly one pass holds the in-flight guard at a time; a call arriving
    /// while one is in flight is dropped, and the in-flight pass loops until
    /// the intent stabilises. After releasing the guard the pass re-checks
    /// that the intent still matches what it left playing — an update that
    /// was dropped in the gap between the last staleness check and the guard
    /// release is picked up here instead of getting lost.
    /// `reconnect` short-circuits re-validation for a stream whose process
    /// died mid-broadcast.
    async fn reconcile(self: &Arc<Self>, reconnect: Option<Arc<Candidate>>) {
        let mut reconnect = reconnect;
        loop {
            if self.updating.swap(true, Ordering::SeqCst) {
                return;
            }

            if reconnect.is_none() {
                // Tear down whatever is running before loading anything else;
                // two processes must never race for the output device.
                self.detach_player().await;
            }

            let mut refill_needed = false;
            loop {
                let candidate = match reconnect.take() {
                    Some(candidate) => {
                        if !self.is_current_intent(&candidate).await {
                            // superseded between the exit and this pass
                            continue;
                        }
                        candidate
                    }
                    None => {
                        let Some(candidate) = self.current_intent().await else {
                            debug!("no item to load");
                            break;
                        };

                        debug!(id = candidate.item.id, "checking item is still a valid option");
                        let fetched = self.gateway.media_item(candidate.item.id).await;

                        if !self.is_current_intent(&candidate).await {
                            // the intent changed while the lookup was in
                            // flight; validate the new one instead
                            continue;
                        }

                        let valid = fetched
                            .map(|item| CandidateBuilder::is_playable(&item, candidate.mode))
                            .unwrap_or(false);
                        if !valid {
                            info!(id = candidate.item.id, "item no longer valid");
                            match self.queue.pop_front().await {
                                Some(next) => {
                                    self.store_intent(Some(next)).await;
                                    continue;
                                }
                                None => {
                                    self.store_intent(None).await;
                                    refill_needed = true;
                                    break;
                                }
                            }
                        }

                        debug!(id = candidate.item.id, "item valid");
                        candidate
                    }
                };

                self.start_player(candidate.clone()).await;
                if self.is_current_intent(&candidate).await {
                    break;
                }
                // the intent moved while the player was spawning
                self.detach_player().await;
            }

            self.updating.store(false, Ordering::SeqCst);

            if refill_needed {
                self.ensure_refill();
            }

            if self.is_settled().await {
                return;
            }
        }
    }

    /// Whether the running process matches the current intent (or both are
    /// absent)
    async fn is_settled(&self) -> bool {
        let intent = self.intent.lock().await.clone();
        let playing = self
            .playing
            .lock()
            .await
            .as_ref()
            .map(|process| Arc::clone(&process.candidate));
        match (intent, playing) {
            (None, None) => true,
            (Some(intent), Some(playing)) => Arc::ptr_eq(&intent, &playing),
            _ => false,
        }
    }

    /// Trigger a queue refill unless one is already in flight; the in-flight
    /// refill notifies by advancing when it lands.
    fn ensure_refill(self: &Arc<Self>) {
        if self.refilling.swap(true, Ordering::SeqCst) {
            return;
        }
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.queue_manager.refill().await;
            controller.refilling.store(false, Ordering::SeqCst);

            if controller.queue.is_empty().await {
                info!("found nothing to add to the queue, checking again shortly");
                tokio::time::sleep(EMPTY_QUEUE_RETRY).await;
                if controller.current_intent().await.is_none() {
                    controller.advance().await;
                }
            } else if controller.current_intent().await.is_none() {
                // only advance if nothing (say, a live stream) claimed the
                // intent while the refill was in flight
                controller.advance().await;
            }
        });
    }

    /// React to the termination of a process the controller still tracks.
    /// Exits of processes already detached (deliberate kills) are stale and
    /// ignored by generation.
    async fn handle_player_exit(self: &Arc<Self>, event: PlayerExited) {
        let ended = {
            let mut playing = self.playing.lock().await;
            match playing.as_ref() {
                Some(process) if process.generation == event.generation => playing.take(),
                _ => None,
            }
        };
        let Some(ended) = ended else {
            debug!(generation = event.generation, "stale player exit ignored");
            return;
        };

        match ended.candidate.mode {
            PlayMode::Stream => {
                // Transient interruption: load the stream again. The live
                // monitor notices when the broadcast is really over and moves
                // the intent on.
                if self.is_current_intent(&ended.candidate).await {
                    info!(url = %ended.candidate.url, "stream terminated, attempting to load again");
                    self.reconcile(Some(ended.candidate)).await;
                }
            }
            PlayMode::Video => {
                debug!(id = ended.candidate.item.id, "video finished");
                self.store_intent(None).await;
                self.advance().await;
            }
        }
    }

    async fn store_intent(&self, candidate: Option<Arc<Candidate>>) {
        *self.intent.lock().await = candidate;
    }

    async fn is_current_intent(&self, candidate: &Arc<Candidate>) -> bool {
        matches!(
            self.intent.lock().await.as_ref(),
            Some(current) if Arc::ptr_eq(current, candidate)
        )
    }

    /// Forget the tracked process and terminate it, waiting for the exit so
    /// no two processes ever overlap.
    async fn detach_player(&self) {
        let had_process = self.playing.lock().await.take().is_some();
        if had_process {
            self.player.stop().await;
        }
    }

    /// Hand the candidate to the supervisor and record the spawned process
    async fn start_player(&self, candidate: Arc<Candidate>) {
        info!(url = %candidate.url, mode = %candidate.mode, "loading item");
        match self.player.start(&candidate.url, candidate.mode).await {
            Ok(generation) => {
                *self.playing.lock().await = Some(PlayingProcess {
                    candidate,
                    generation,
                });
            }
            Err(e) => {
                // an unusable player binary is an environment failure on par
                // with bad configuration
                error!(error = %e, "failed to start player process");
                std::process::exit(1);
            }
        }
    }
}
