//! Offline demo producer.
//!
//! Echoes the query back one word at a time with a fixed delay before each
//! word, so the streaming path can be exercised without a generation backend.

use async_trait::async_trait;
use futures::stream;
use std::time::Duration;

use crate::error::ProducerError;
use crate::traits::{Chunk, ChunkStream, FragmentProducer};

pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(80);

#[derive(Debug, Clone)]
pub struct DemoProducer {
    delay: Duration,
}

impl DemoProducer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for DemoProducer {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_DELAY)
    }
}

/// Split a query into the fragments the demo producer yields.
fn demo_fragments(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| format!("{} ", word))
        .collect()
}

#[async_trait]
impl FragmentProducer for DemoProducer {
    async fn produce(&self, query: &str) -> Result<ChunkStream, ProducerError> {
        let words = demo_fragments(query).into_iter();
        let delay = self.delay;

        Ok(Box::pin(stream::unfold(words, move |mut words| async move {
            let word = words.next()?;
            tokio::time::sleep(delay).await;
            Some((Ok(Chunk::text(word)), words))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_demo_fragments() {
        assert_eq!(
            demo_fragments("  stream   this text "),
            vec!["stream ", "this ", "text "]
        );
        assert!(demo_fragments("").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_producer_waits_before_each_word() {
        let producer = DemoProducer::new(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        let chunks: Vec<_> = producer
            .produce("one two")
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec![Chunk::text("one "), Chunk::text("two ")]);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_demo_producer_empty_query_yields_nothing() {
        let producer = DemoProducer::new(Duration::ZERO);
        let chunks: Vec<_> = producer.produce("").await.unwrap().collect().await;
        assert!(chunks.is_empty());
    }
}
