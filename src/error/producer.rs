//! Errors raised by fragment producers.

use thiserror::Error;

/// Terminal failure of a fragment producer.
///
/// A producer reports at most one of these per sequence; once it has been
/// yielded the sequence is over.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// No credential configured for the generation backend
    #[error("No API key configured for the generation backend")]
    MissingCredential,

    /// Request to the backend could not be sent or its body could not be read
    #[error("Failed to reach the generation backend: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Generation backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend sent a payload we could not interpret
    #[error("Malformed payload from the generation backend: {0}")]
    Malformed(String),

    /// Backend reported a failure inside the stream
    #[error("Generation failed: {0}")]
    Backend(String),
}

impl ProducerError {
    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProducerError::MissingCredential => "E_PRODUCER_CREDENTIAL",
            ProducerError::Http(_) => "E_PRODUCER_HTTP",
            ProducerError::Status { .. } => "E_PRODUCER_STATUS",
            ProducerError::Malformed(_) => "E_PRODUCER_MALFORMED",
            ProducerError::Backend(_) => "E_PRODUCER_BACKEND",
        }
    }
}

impl From<serde_json::Error> for ProducerError {
    fn from(e: serde_json::Error) -> Self {
        ProducerError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_error_display() {
        let err = ProducerError::Status {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Generation backend returned 401: invalid api key"
        );
        assert_eq!(
            ProducerError::MissingCredential.to_string(),
            "No API key configured for the generation backend"
        );
    }

    #[test]
    fn test_json_error_becomes_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: ProducerError = json_err.into();
        assert!(matches!(err, ProducerError::Malformed(_)));
        assert_eq!(err.error_code(), "E_PRODUCER_MALFORMED");
    }
}
