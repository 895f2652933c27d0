//! External player process lifecycle
//!
//! At most one player process exists at a time. Each spawn is stamped with a
//! monotonically increasing generation, and exactly one termination event per
//! spawn is emitted on the supervisor's channel — whether the process was
//! killed deliberately or died on its own — so the controller can tell stale
//! exits apart by generation.

use crate::error::{Error, Result};
use crate::playback::candidate::PlayMode;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

/// Termination notice for one started process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerExited {
    /// Generation returned by the `start` that spawned the process
    pub generation: u64,
}

/// Control surface of the player process supervisor
#[async_trait]
pub trait PlayerControl: Send + Sync {
    /// Spawn the player for `url` in `mode`. Returns the generation stamped
    /// on the matching exit event.
    ///
    /// Panics if a process is still tracked: the controller must stop the
    /// previous process first.
    async fn start(&self, url: &str, mode: PlayMode) -> Result<u64>;

    /// Terminate the tracked process and wait for its exit. Idempotent.
    async fn stop(&self);
}

struct RunningPlayer {
    generation: u64,
    kill: oneshot::Sender<()>,
    exited: oneshot::Receiver<()>,
}

/// Supervises the external player binary
pub struct PlayerSupervisor {
    command: String,
    audio_output: String,
    events: mpsc::UnboundedSender<PlayerExited>,
    current: Arc<Mutex<Option<RunningPlayer>>>,
    generation: AtomicU64,
}

impl PlayerSupervisor {
    /// Create the supervisor and the channel its exit events arrive on
    pub fn new(
        command: impl Into<String>,
        audio_output: impl Into<String>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<PlayerExited>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let supervisor = Arc::new(Self {
            command: command.into(),
            audio_output: audio_output.into(),
            events,
            current: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        });
        (supervisor, events_rx)
    }

    /// Blunt kill of every process with the player's name. Last-resort safety
    /// net for handles that did not die cleanly, and the startup sweep for
    /// strays left by a previous run.
    async fn kill_by_name(&self) {
        match Command::new("pkill").arg(&self.command).status().await {
            Ok(status) => debug!(command = %self.command, %status, "broadcast kill issued"),
            Err(e) => debug!(error = %e, "pkill unavailable"),
        }
    }
}

#[async_trait]
impl PlayerControl for PlayerSupervisor {
    async fn start(&self, url: &str, mode: PlayMode) -> Result<u64> {
        let mut current = self.current.lock().await;
        if current.is_some() {
            panic!("player process already running; it must be stopped before another start");
        }

        let mut command = Command::new(&self.command);
        command.arg("-b");
        if mode == PlayMode::Stream {
            command.arg("--live");
        }
        command.arg(url);
        command.args(["-o", self.audio_output.as_str()]);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|e| Error::Player(format!("failed to spawn {}: {}", self.command, e)))?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Drain output continuously so the child never stalls on a full pipe.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain(stderr));
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let (exited_tx, exited_rx) = oneshot::channel();
        let slot = Arc::clone(&self.current);
        let events = self.events.clone();
        tokio::spawn(async move {
            let exited = tokio::select! {
                status = child.wait() => Some(status),
                _ = kill_rx => None,
            };
            let status = match exited {
                Some(status) => status,
                None => {
                    if let Err(e) = child.start_kill() {
                        warn!(generation, error = %e, "failed to kill player process");
                    }
                    child.wait().await
                }
            };
            match status {
                Ok(status) => debug!(generation, %status, "player process exited"),
                Err(e) => warn!(generation, error = %e, "error waiting for player process"),
            }
            // Clear the slot before anyone hears about the exit, so a
            // reconnecting start does not trip over a dead handle.
            let mut current = slot.lock().await;
            if current.as_ref().map(|running| running.generation) == Some(generation) {
                *current = None;
            }
            drop(current);
            let _ = exited_tx.send(());
            let _ = events.send(PlayerExited { generation });
        });

        *current = Some(RunningPlayer {
            generation,
            kill: kill_tx,
            exited: exited_rx,
        });

        info!(generation, url, %mode, "player process started");
        Ok(generation)
    }

    async fn stop(&self) {
        let running = self.current.lock().await.take();
        if let Some(running) = running {
            debug!(generation = running.generation, "stopping player process");
            let _ = running.kill.send(());
            let _ = running.exited.await;
        }
        self.kill_by_name().await;
    }
}

async fn drain<R: tokio::io::AsyncRead + Unpin>(mut reader: R) {
    let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
}
