//! Remote media service access
//!
//! The transport (`client`) performs authenticated HTTP GETs; the `gateway`
//! wraps it with the indefinite fixed-delay retry policy and typed endpoint
//! helpers; `models` holds the wire format.

pub mod client;
pub mod gateway;
pub mod models;

pub use client::{ApiResponse, HttpMediaApi, MediaApi};
pub use gateway::Gateway;
