//! Error types for tokenflow.
//!
//! Errors are split along the three failure domains of a streaming session:
//!
//! - **Producer**: the generation backend failed or timed out. The transport
//!   server turns these into a diagnostic frame; the reference path turns them
//!   into a plain-text body.
//! - **Server**: the transport server could not bind or serve.
//! - **Client**: the subscription could not be opened, dropped mid-stream,
//!   received a malformed frame, or received the server's diagnostic frame.
//!
//! Transport failures on the server side (client disconnect mid-stream) are
//! never surfaced as errors; they end the session and release the producer.

mod client;
mod producer;
mod server;

pub use client::ClientError;
pub use producer::ProducerError;
pub use server::ServerError;
