//! Producer capability trait abstraction.
//!
//! A producer turns a query into a lazy sequence of chunks. Chunks may carry
//! no content; filtering them out is the job of [`crate::producer`], not of
//! the producer itself.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::ProducerError;

/// One element of a producer's sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Generated text, absent for bookkeeping elements (role headers, finish markers)
    pub content: Option<String>,
}

impl Chunk {
    /// A chunk carrying text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    /// A chunk carrying no content.
    pub fn empty() -> Self {
        Self { content: None }
    }
}

/// Boxed, owned stream of chunks. Dropping it ends the sequence early.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk, ProducerError>> + Send>>;

/// Trait for text-generation backends.
///
/// Each call to [`produce`](FragmentProducer::produce) returns an independent,
/// non-restartable sequence. Implementations must release whatever the
/// sequence holds (connections, timers) when the stream is dropped.
///
/// # Example
///
/// ```ignore
/// use tokenflow::traits::FragmentProducer;
/// use futures::StreamExt;
///
/// async fn print_all<P: FragmentProducer>(producer: &P) -> Result<(), ProducerError> {
///     let mut chunks = producer.produce("Tell me a story").await?;
///     while let Some(chunk) = chunks.next().await {
///         if let Some(text) = chunk?.content {
///             print!("{}", text);
///         }
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FragmentProducer: Send + Sync {
    /// Start generating for `query`.
    ///
    /// Returns `Err` when generation cannot even begin; failures after that
    /// are reported as the stream's last item.
    async fn produce(&self, query: &str) -> Result<ChunkStream, ProducerError>;
}
