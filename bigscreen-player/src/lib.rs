//! # Bigscreen Player Library
//!
//! Unattended, continuous playback of a remote media catalogue on a single
//! device.
//!
//! **Purpose:** Pull playable items (on-demand videos and live streams) from a
//! remote media service, keep an ordered play queue filled, and hand items one
//! at a time to an external player process — preempting the queue whenever a
//! live stream comes on air.
//!
//! **Architecture:** One tokio process. The playback controller owns the
//! playback intent and the player process; the queue manager refills the queue
//! from the configured catalogue sources; the live monitor polls for live
//! streams and preempts the queue front.

pub mod catalogue;
pub mod config;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
