//! Playback orchestration core
//!
//! Queue construction and consumption, live-stream preemption, candidate
//! re-validation and player process supervision.

pub mod candidate;
pub mod controller;
pub mod live_monitor;
pub mod queue;
pub mod queue_manager;
pub mod supervisor;

pub use candidate::{Candidate, CandidateBuilder, PlayMode};
pub use controller::PlaybackController;
pub use live_monitor::LiveMonitor;
pub use queue::PlayQueue;
pub use queue_manager::QueueManager;
pub use supervisor::{PlayerControl, PlayerExited, PlayerSupervisor};
