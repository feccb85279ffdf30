//! Broadcast relay server library.
//!
//! Clients join with a long-lived WebSocket session and submit messages with a
//! short-lived HTTP call; every submitted message is fanned out to all joined
//! sessions, the sender's own session included.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
