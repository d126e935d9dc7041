//! OpenAI-compatible chat-completions producer.
//!
//! Sends the query as a single user message with `stream: true` and maps each
//! `choices[0].delta.content` of the upstream SSE body to a [`Chunk`]. Any
//! backend speaking the same wire format (OpenAI, vLLM, llama.cpp server,
//! Ollama's compatibility endpoint) works with a different base URL.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::Config;
use crate::error::ProducerError;
use crate::sse::SseDecoder;
use crate::traits::{Chunk, ChunkStream, FragmentProducer};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Sentinel the backend sends as the last data payload.
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// One decoded upstream message.
#[derive(Debug, PartialEq, Eq)]
enum BackendMessage {
    Chunk(Chunk),
    Done,
}

fn parse_backend_message(data: &str) -> Result<BackendMessage, ProducerError> {
    if data.trim() == DONE_SENTINEL {
        return Ok(BackendMessage::Done);
    }

    let parsed: ChatChunk = serde_json::from_str(data)?;
    if let Some(error) = parsed.error {
        return Err(ProducerError::Backend(error.message));
    }

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content);
    Ok(BackendMessage::Chunk(Chunk { content }))
}

struct UpstreamState<E> {
    bytes: BoxStream<'static, Result<Bytes, E>>,
    decoder: SseDecoder,
    queue: VecDeque<Result<Chunk, ProducerError>>,
    finished: bool,
}

impl<E> UpstreamState<E> {
    /// Queue the chunks decoded from `payloads`, stopping at `[DONE]` or an error.
    fn enqueue(&mut self, payloads: impl IntoIterator<Item = String>) {
        for data in payloads {
            match parse_backend_message(&data) {
                Ok(BackendMessage::Chunk(chunk)) => self.queue.push_back(Ok(chunk)),
                Ok(BackendMessage::Done) => {
                    self.finished = true;
                    return;
                }
                Err(e) => {
                    self.queue.push_back(Err(e));
                    self.finished = true;
                    return;
                }
            }
        }
    }
}

/// Turn an upstream SSE byte stream into a chunk stream.
fn chunk_stream<E>(bytes: BoxStream<'static, Result<Bytes, E>>) -> ChunkStream
where
    E: Into<ProducerError> + Send + 'static,
{
    let state = UpstreamState {
        bytes,
        decoder: SseDecoder::new(),
        queue: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.queue.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let payloads: Vec<String> = state
                        .decoder
                        .push(&chunk)
                        .into_iter()
                        .map(|message| message.data)
                        .collect();
                    state.enqueue(payloads);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    let trailing = state.decoder.finish();
                    state.enqueue(trailing);
                }
            }
        }
    }))
}

/// Producer backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// # Example
///
/// ```ignore
/// use tokenflow::adapters::OpenAiProducer;
///
/// let producer = OpenAiProducer::new(Some("sk-...".to_string()))
///     .with_model("gpt-4o-mini");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiProducer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiProducer {
    /// Create a producer for the public OpenAI API.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            api_key,
        }
    }

    /// Create a producer from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.api_base_url.clone())
            .with_model(config.model.clone())
    }

    /// Point the producer at another OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model name sent with each request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a preconfigured reqwest client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl FragmentProducer for OpenAiProducer {
    async fn produce(&self, query: &str) -> Result<ChunkStream, ProducerError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ProducerError::MissingCredential)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: query,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header(ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status, "Generation backend rejected the request");
            return Err(ProducerError::Status { status, message });
        }

        tracing::debug!(model = %self.model, "Generation backend stream opened");
        Ok(chunk_stream(response.bytes_stream().boxed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn delta(content: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"content\":{}}}}}]}}\n\n",
            serde_json::Value::String(content.to_string())
        )
    }

    async fn collect(stream: ChunkStream) -> Vec<Result<Chunk, String>> {
        stream
            .map(|item| item.map_err(|e| e.to_string()))
            .collect()
            .await
    }

    #[test]
    fn test_parse_backend_message_delta() {
        let data = r#"{"choices":[{"index":0,"delta":{"content":"Hi"}}]}"#;
        assert_eq!(
            parse_backend_message(data).unwrap(),
            BackendMessage::Chunk(Chunk::text("Hi"))
        );
    }

    #[test]
    fn test_parse_backend_message_role_only_delta_has_no_content() {
        let data = r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#;
        assert_eq!(
            parse_backend_message(data).unwrap(),
            BackendMessage::Chunk(Chunk::empty())
        );
        let finish = r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#;
        assert_eq!(
            parse_backend_message(finish).unwrap(),
            BackendMessage::Chunk(Chunk::empty())
        );
    }

    #[test]
    fn test_parse_backend_message_done_and_errors() {
        assert_eq!(
            parse_backend_message("[DONE]").unwrap(),
            BackendMessage::Done
        );
        assert!(matches!(
            parse_backend_message(r#"{"error":{"message":"overloaded"}}"#),
            Err(ProducerError::Backend(m)) if m == "overloaded"
        ));
        assert!(matches!(
            parse_backend_message("not json"),
            Err(ProducerError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_chunk_stream_reassembles_split_body() {
        let body = format!("{}{}data: [DONE]\n\n", delta("Hel"), delta("lo"));
        let (first, rest) = body.split_at(17);
        let parts: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from(first.to_string())),
            Ok(Bytes::from(rest.to_string())),
        ];

        let chunks = collect(chunk_stream(stream::iter(parts).boxed())).await;
        assert_eq!(
            chunks,
            vec![Ok(Chunk::text("Hel")), Ok(Chunk::text("lo"))]
        );
    }

    #[tokio::test]
    async fn test_chunk_stream_stops_at_done() {
        let body = format!("{}data: [DONE]\n\n{}", delta("a"), delta("ignored"));
        let parts: Vec<Result<Bytes, reqwest::Error>> = vec![Ok(Bytes::from(body))];

        let chunks = collect(chunk_stream(stream::iter(parts).boxed())).await;
        assert_eq!(chunks, vec![Ok(Chunk::text("a"))]);
    }

    #[tokio::test]
    async fn test_chunk_stream_ends_after_error() {
        let body = format!(
            "{}data: {{\"error\":{{\"message\":\"quota\"}}}}\n\n{}",
            delta("a"),
            delta("b")
        );
        let parts: Vec<Result<Bytes, reqwest::Error>> = vec![Ok(Bytes::from(body))];

        let chunks = collect(chunk_stream(stream::iter(parts).boxed())).await;
        assert_eq!(
            chunks,
            vec![
                Ok(Chunk::text("a")),
                Err("Generation failed: quota".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_produce_streams_from_backend() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {{\"choices\":[{{\"delta\":{{\"role\":\"assistant\"}}}}]}}\n\n{}{}data: [DONE]\n\n",
            delta("Hello"),
            delta(", world")
        );

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "stream": true,
                "messages": [{"role": "user", "content": "greet me"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let producer = OpenAiProducer::new(Some("test-key".to_string()))
            .with_base_url(server.uri())
            .with_model("test-model");

        let chunks = collect(producer.produce("greet me").await.unwrap()).await;
        assert_eq!(
            chunks,
            vec![
                Ok(Chunk::empty()),
                Ok(Chunk::text("Hello")),
                Ok(Chunk::text(", world"))
            ]
        );
    }

    #[tokio::test]
    async fn test_produce_reports_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let producer =
            OpenAiProducer::new(Some("bad-key".to_string())).with_base_url(server.uri());

        match producer.produce("q").await {
            Err(ProducerError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            Err(other) => panic!("Expected status error, got {}", other),
            Ok(_) => panic!("Expected status error, got a stream"),
        }
    }

    #[tokio::test]
    async fn test_produce_without_credential() {
        let producer = OpenAiProducer::new(None);
        assert!(matches!(
            producer.produce("q").await,
            Err(ProducerError::MissingCredential)
        ));

        let producer = OpenAiProducer::new(Some(String::new()));
        assert!(matches!(
            producer.produce("q").await,
            Err(ProducerError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn test_produce_with_unreachable_backend() {
        let producer =
            OpenAiProducer::new(Some("key".to_string())).with_base_url("http://127.0.0.1:1");
        assert!(matches!(
            producer.produce("q").await,
            Err(ProducerError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_produce_uses_supplied_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("{}data: [DONE]\n\n", delta("late")))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(100))
            .build()
            .unwrap();
        let producer = OpenAiProducer::new(Some("key".to_string()))
            .with_base_url(server.uri())
            .with_client(client);

        match producer.produce("q").await {
            Err(ProducerError::Http(e)) => assert!(e.is_timeout()),
            Err(other) => panic!("Expected timeout, got {}", other),
            Ok(_) => panic!("Expected timeout, got a stream"),
        }
    }
}
