//! Frame sources for client sessions.
//!
//! A frame source is what the session state machine pulls from. The HTTP
//! source reads the transport server's stream endpoint; tests build sources
//! from plain iterators.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::ACCEPT;
use std::collections::VecDeque;
use std::pin::Pin;

use crate::error::ClientError;
use crate::sse::SseDecoder;

/// One unit delivered by a frame source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFrame {
    /// Payload of a frame terminated by a blank line
    Data(String),
    /// Payload left pending when the connection closed
    Unterminated(String),
}

/// Boxed stream of frames. Ends when the connection closes; dropping it
/// closes the connection.
pub type FrameSource = Pin<Box<dyn Stream<Item = Result<SourceFrame, ClientError>> + Send>>;

/// Build a source that replays fixed items.
pub fn replay_source<I>(items: I) -> FrameSource
where
    I: IntoIterator<Item = Result<SourceFrame, ClientError>>,
    I::IntoIter: Send + 'static,
{
    Box::pin(stream::iter(items))
}

enum HttpSourceState {
    Pending {
        client: reqwest::Client,
        url: String,
    },
    Open {
        bytes: BoxStream<'static, reqwest::Result<Bytes>>,
        decoder: SseDecoder,
        queue: VecDeque<SourceFrame>,
    },
    Finished,
}

/// Build a source reading the stream endpoint at `url`.
///
/// The request is sent on the first poll, not here, so the caller can record
/// its start time and hand the source to a session before connecting.
pub fn http_source(client: reqwest::Client, url: String) -> FrameSource {
    let initial = HttpSourceState::Pending { client, url };

    Box::pin(stream::unfold(initial, |state| async move {
        let mut state = state;
        loop {
            state = match state {
                HttpSourceState::Pending { client, url } => {
                    match connect(&client, &url).await {
                        Ok(bytes) => HttpSourceState::Open {
                            bytes,
                            decoder: SseDecoder::new(),
                            queue: VecDeque::new(),
                        },
                        Err(e) => return Some((Err(e), HttpSourceState::Finished)),
                    }
                }
                HttpSourceState::Open {
                    mut bytes,
                    mut decoder,
                    mut queue,
                } => {
                    if let Some(frame) = queue.pop_front() {
                        return Some((
                            Ok(frame),
                            HttpSourceState::Open {
                                bytes,
                                decoder,
                                queue,
                            },
                        ));
                    }

                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            queue.extend(
                                decoder
                                    .push(&chunk)
                                    .into_iter()
                                    .map(|message| SourceFrame::Data(message.data)),
                            );
                            HttpSourceState::Open {
                                bytes,
                                decoder,
                                queue,
                            }
                        }
                        Some(Err(e)) => {
                            let err = ClientError::ConnectionLost {
                                message: e.to_string(),
                            };
                            return Some((Err(err), HttpSourceState::Finished));
                        }
                        None => {
                            return decoder.finish().map(|pending| {
                                (
                                    Ok(SourceFrame::Unterminated(pending)),
                                    HttpSourceState::Finished,
                                )
                            });
                        }
                    }
                }
                HttpSourceState::Finished => return None,
            };
        }
    }))
}

async fn connect(
    client: &reqwest::Client,
    url: &str,
) -> Result<BoxStream<'static, reqwest::Result<Bytes>>, ClientError> {
    tracing::debug!(url, "Opening stream subscription");

    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| ClientError::from_reqwest(url, &e))?;

    if !response.status().is_success() {
        return Err(ClientError::Status {
            status: response.status().as_u16(),
        });
    }

    Ok(response.bytes_stream().boxed())
}
