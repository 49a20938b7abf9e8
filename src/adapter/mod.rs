//! External adapter layer
//!
//! The narrow surface transports go through. `wire` owns every outside
//! encoding; `service` speaks the in-process INIT / SOLVE / CANCEL
//! protocol over channels; `sse` serves the HTTP Server-Sent-Events
//! endpoints.

pub mod service;
pub mod sse;
pub mod wire;

pub use service::{spawn, ComputeHandle};
pub use sse::{router, serve, AppState};
pub use wire::{ComputeRequest, ComputeResponse, SENTINEL_SCORE};
