//! Tokenflow - low-latency streaming of generated text over Server-Sent Events
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod producer;
pub mod server;
pub mod sse;
pub mod traits;
