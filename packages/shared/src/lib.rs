//! Shared library for Hiroba server and client.
//!
//! - `protocol`: JSON wire format exchanged over WebSocket and HTTP
//! - `logger`: tracing subscriber setup
//! - `time`: Unix timestamp helpers with a clock abstraction

pub mod logger;
pub mod protocol;
pub mod time;
