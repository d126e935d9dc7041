//! Fragment producer adapter.
//!
//! Wraps a [`FragmentProducer`] and exposes its output as a lazy sequence of
//! non-empty fragments:
//!
//! - chunks with no content, or with empty content, are skipped
//! - the first error ends the sequence; it is yielded once and nothing follows
//! - a failure to start generating is reported the same way, as the only item
//!
//! The sequence is pull-based. Nothing is requested from the producer until
//! the first poll, and dropping the sequence drops the producer's stream,
//! which is how a disconnected client stops generation.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ProducerError;
use crate::traits::{Chunk, ChunkStream, FragmentProducer};

/// Boxed stream of non-empty fragments ending in at most one error.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProducerError>> + Send>>;

/// Open the fragment sequence for `query`.
///
/// The producer is invoked on the first poll, so callers can hand the
/// returned stream to a response body before any generation starts.
pub fn open_fragments(producer: Arc<dyn FragmentProducer>, query: String) -> FragmentStream {
    let opened = async move {
        match producer.produce(&query).await {
            Ok(chunks) => filter_fragments(chunks),
            Err(e) => {
                tracing::debug!(error = %e, "Producer failed before the first chunk");
                let failed: FragmentStream = Box::pin(stream::iter([Err(e)]));
                failed
            }
        }
    };
    Box::pin(stream::once(opened).flatten())
}

/// Filter a raw chunk stream down to non-empty fragments.
pub fn filter_fragments(chunks: ChunkStream) -> FragmentStream {
    Box::pin(stream::unfold(Some(chunks), |state| async move {
        let mut chunks = state?;
        loop {
            match chunks.next().await {
                Some(Ok(Chunk {
                    content: Some(text),
                })) if !text.is_empty() => return Some((Ok(text), Some(chunks))),
                Some(Ok(_)) => continue,
                // Dropping `chunks` here releases the producer right away
                Some(Err(e)) => return Some((Err(e), None)),
                None => return None,
            }
        }
    }))
}

/// Drain a producer completely, concatenating every fragment.
///
/// Used by the non-streaming reference path.
pub async fn collect_fragments(
    producer: Arc<dyn FragmentProducer>,
    query: String,
) -> Result<String, ProducerError> {
    let mut fragments = open_fragments(producer, query);
    let mut text = String::new();
    while let Some(fragment) = fragments.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{ScriptStep, ScriptedProducer};

    async fn drain(stream: FragmentStream) -> Vec<Result<String, String>> {
        stream
            .map(|item| item.map_err(|e| e.to_string()))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_empty_fragments_are_filtered() {
        let producer = ScriptedProducer::new(vec![
            ScriptStep::text("a"),
            ScriptStep::text(""),
            ScriptStep::text("b"),
            ScriptStep::NoContent,
            ScriptStep::text("c"),
        ]);

        let items = drain(open_fragments(Arc::new(producer), "q".to_string())).await;
        assert_eq!(
            items,
            vec![Ok("a".to_string()), Ok("b".to_string()), Ok("c".to_string())]
        );
    }

    #[tokio::test]
    async fn test_error_terminates_sequence() {
        let producer = ScriptedProducer::new(vec![
            ScriptStep::text("one"),
            ScriptStep::fail("backend timed out"),
            ScriptStep::text("never"),
        ]);
        let probe = producer.probe();

        let items = drain(open_fragments(Arc::new(producer), "q".to_string())).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("one".to_string()));
        assert_eq!(
            items[1],
            Err("Generation failed: backend timed out".to_string())
        );
        // The step after the failure was never pulled
        assert_eq!(probe.consumed(), 2);
        assert!(probe.dropped());
    }

    #[tokio::test]
    async fn test_failure_to_open_is_single_error() {
        let producer = ScriptedProducer::failing_to_open("no credential");

        let items = drain(open_fragments(Arc::new(producer), "q".to_string())).await;
        assert_eq!(items, vec![Err("Generation failed: no credential".to_string())]);
    }

    #[tokio::test]
    async fn test_zero_fragments() {
        let producer = ScriptedProducer::new(vec![ScriptStep::NoContent, ScriptStep::text("")]);

        let items = drain(open_fragments(Arc::new(producer), "q".to_string())).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_producer_is_not_invoked_until_polled() {
        let producer = ScriptedProducer::new(vec![ScriptStep::text("a")]);
        let probe = producer.probe();

        let mut fragments = open_fragments(Arc::new(producer), "q".to_string());
        assert_eq!(probe.opened(), 0);

        assert_eq!(fragments.next().await.unwrap().unwrap(), "a");
        assert_eq!(probe.opened(), 1);
        assert_eq!(probe.queries(), vec!["q".to_string()]);
    }

    #[tokio::test]
    async fn test_dropping_sequence_releases_producer() {
        let producer = ScriptedProducer::new(vec![
            ScriptStep::text("a"),
            ScriptStep::text("b"),
            ScriptStep::text("c"),
        ]);
        let probe = producer.probe();

        let mut fragments = open_fragments(Arc::new(producer), "q".to_string());
        assert_eq!(fragments.next().await.unwrap().unwrap(), "a");
        assert!(!probe.dropped());

        drop(fragments);
        assert!(probe.dropped());
        assert_eq!(probe.consumed(), 1);
    }

    #[tokio::test]
    async fn test_collect_fragments() {
        let producer = ScriptedProducer::new(vec![
            ScriptStep::text("Hello"),
            ScriptStep::NoContent,
            ScriptStep::text(", world"),
        ]);

        let text = collect_fragments(Arc::new(producer), "q".to_string())
            .await
            .unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn test_collect_fragments_discards_partial_output_on_error() {
        let producer =
            ScriptedProducer::new(vec![ScriptStep::text("partial"), ScriptStep::fail("boom")]);

        let err = collect_fragments(Arc::new(producer), "q".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ProducerError::Backend(_)));
    }
}
