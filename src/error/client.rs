//! Errors surfaced by the stream client.

use thiserror::Error;

/// Terminal error of a client subscription.
///
/// Every variant ends the subscription; the core never reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The stream endpoint could not be reached.
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// The endpoint answered with a non-success status.
    #[error("Stream endpoint returned status {status}")]
    Status { status: u16 },

    /// The connection dropped while frames were still arriving.
    #[error("Stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// A frame payload was not a JSON string.
    #[error("Malformed frame payload: {payload}")]
    MalformedFrame { payload: String },

    /// The server closed the stream with a diagnostic frame.
    #[error("Server reported an error: {message}")]
    Diagnostic { message: String },
}

impl ClientError {
    /// Build a client error from a reqwest failure on `url`.
    ///
    /// Failures before the response headers arrive are connect errors,
    /// failures while reading the body are connection losses.
    pub fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_builder() || err.is_request() {
            ClientError::Connect {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            ClientError::ConnectionLost {
                message: err.to_string(),
            }
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Connect { url, .. } => {
                format!("Could not reach the stream server at {}. Is it running?", url)
            }
            ClientError::Status { status } => {
                format!("The stream server refused the request (status {}).", status)
            }
            ClientError::ConnectionLost { .. } => {
                "The connection to the stream server was lost.".to_string()
            }
            ClientError::MalformedFrame { .. } => {
                "Received a frame the client could not decode.".to_string()
            }
            ClientError::Diagnostic { message } => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Connect { .. } => "E_CLIENT_CONNECT",
            ClientError::Status { .. } => "E_CLIENT_STATUS",
            ClientError::ConnectionLost { .. } => "E_CLIENT_CONN_LOST",
            ClientError::MalformedFrame { .. } => "E_CLIENT_FRAME",
            ClientError::Diagnostic { .. } => "E_CLIENT_DIAGNOSTIC",
        }
    }
}
