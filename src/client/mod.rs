//! Stream client.
//!
//! Subscribes to the transport server's stream endpoint and turns the
//! frames into an evolving display string. Also talks to the non-streaming
//! reference endpoint for comparison.
//!
//! # Module structure
//! - `source` - Where frames come from (HTTP or a replayed list)
//! - `session` - Pure session state machine
//! - `subscription` - A session bound to a live source

mod session;
mod source;
mod subscription;

pub use session::{Closure, Session, SessionState, SessionUpdate};
pub use source::{http_source, replay_source, FrameSource, SourceFrame};
pub use subscription::Subscription;

use crate::error::ClientError;
use crate::server::{COMPLETE_PATH, QUERY_PARAM, STREAM_PATH};

/// Client for one transport server.
///
/// # Example
///
/// ```ignore
/// use tokenflow::client::StreamClient;
///
/// let client = StreamClient::new("http://127.0.0.1:3000");
/// let mut subscription = client.subscribe("Tell me a story");
/// while let Some(update) = subscription.next().await {
///     println!("{:?}", update);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl StreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the stream endpoint for `query`.
    pub fn stream_url(&self, query: &str) -> String {
        self.endpoint_url(STREAM_PATH, query)
    }

    /// URL of the reference endpoint for `query`.
    pub fn complete_url(&self, query: &str) -> String {
        self.endpoint_url(COMPLETE_PATH, query)
    }

    fn endpoint_url(&self, path: &str, query: &str) -> String {
        format!(
            "{}{}?{}={}",
            self.base_url,
            path,
            QUERY_PARAM,
            urlencoding::encode(query)
        )
    }

    /// Subscribe to the stream for `query`.
    ///
    /// The session start time is recorded here; the connection is opened
    /// on the first call to [`Subscription::next`].
    pub fn subscribe(&self, query: &str) -> Subscription {
        let url = self.stream_url(query);
        tracing::debug!(%url, "Subscribing");
        Subscription::new(http_source(self.http.clone(), url))
    }

    /// Fetch the whole output from the reference endpoint.
    ///
    /// The endpoint reports generation failures in the body with a success
    /// status, so an `Ok` here may hold an error notice.
    pub async fn complete(&self, query: &str) -> Result<String, ClientError> {
        let url = self.complete_url(query);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, &e))?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ClientError::ConnectionLost {
                message: e.to_string(),
            })
    }
}
