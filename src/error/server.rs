//! Errors raised while running the transport server.

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The listen address could not be parsed
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),

    /// The server loop failed
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
