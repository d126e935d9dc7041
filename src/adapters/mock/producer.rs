//! Scripted fragment producer for testing.
//!
//! Plays back a fixed list of steps for every `produce` call and reports,
//! through a shared [`ProducerProbe`], how far each sequence got and whether
//! it was dropped. That makes early termination observable from tests.

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ProducerError;
use crate::traits::{Chunk, ChunkStream, FragmentProducer};

/// One step of a producer script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Yield a chunk with this content (may be empty)
    Text(String),
    /// Yield a chunk with no content
    NoContent,
    /// Wait before the next step
    Delay(Duration),
    /// Fail the sequence with a backend error
    Fail(String),
    /// Never yield again
    Hang,
}

impl ScriptStep {
    pub fn text(content: impl Into<String>) -> Self {
        ScriptStep::Text(content.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptStep::Fail(message.into())
    }

    pub fn delay_ms(millis: u64) -> Self {
        ScriptStep::Delay(Duration::from_millis(millis))
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    opened: AtomicUsize,
    consumed: AtomicUsize,
    dropped: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

/// Shared view of what a [`ScriptedProducer`] has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct ProducerProbe {
    state: Arc<ProbeState>,
}

impl ProducerProbe {
    /// Number of sequences opened
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of script steps pulled, across all sequences
    pub fn consumed(&self) -> usize {
        self.state.consumed.load(Ordering::SeqCst)
    }

    /// Number of sequences dropped, finished or not
    pub fn dropped_count(&self) -> usize {
        self.state.dropped.load(Ordering::SeqCst)
    }

    /// Whether at least one sequence has been dropped
    pub fn dropped(&self) -> bool {
        self.dropped_count() > 0
    }

    /// Queries passed to `produce`, in call order
    pub fn queries(&self) -> Vec<String> {
        self.state.queries.lock().unwrap().clone()
    }

    /// Wait until a sequence has been dropped, up to `timeout`.
    pub async fn wait_dropped(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.dropped() {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

/// Marks its sequence as dropped when the stream state goes away.
struct DropGuard(ProducerProbe);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.state.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Producer that plays back a script.
///
/// # Example
///
/// ```ignore
/// use tokenflow::adapters::mock::{ScriptStep, ScriptedProducer};
///
/// let producer = ScriptedProducer::new(vec![
///     ScriptStep::text("Hel"),
///     ScriptStep::delay_ms(50),
///     ScriptStep::text("lo"),
/// ]);
/// let probe = producer.probe();
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedProducer {
    steps: Vec<ScriptStep>,
    open_error: Option<String>,
    probe: ProducerProbe,
}

impl ScriptedProducer {
    /// Create a producer that plays `steps` for every sequence.
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            open_error: None,
            probe: ProducerProbe::default(),
        }
    }

    /// Convenience: yield each string in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(ScriptStep::text).collect())
    }

    /// Create a producer whose `produce` call itself fails.
    pub fn failing_to_open(message: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            open_error: Some(message.into()),
            probe: ProducerProbe::default(),
        }
    }

    /// Get a handle to the shared probe.
    pub fn probe(&self) -> ProducerProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl FragmentProducer for ScriptedProducer {
    async fn produce(&self, query: &str) -> Result<ChunkStream, ProducerError> {
        self.probe.state.opened.fetch_add(1, Ordering::SeqCst);
        self.probe
            .state
            .queries
            .lock()
            .unwrap()
            .push(query.to_string());

        if let Some(message) = &self.open_error {
            return Err(ProducerError::Backend(message.clone()));
        }

        let guard = DropGuard(self.probe.clone());
        let steps = self.steps.clone().into_iter();

        Ok(Box::pin(stream::unfold(
            (steps, guard),
            |(mut steps, guard)| async move {
                loop {
                    let step = steps.next()?;
                    guard.0.state.consumed.fetch_add(1, Ordering::SeqCst);
                    match step {
                        ScriptStep::Text(text) => {
                            return Some((Ok(Chunk::text(text)), (steps, guard)))
                        }
                        ScriptStep::NoContent => return Some((Ok(Chunk::empty()), (steps, guard))),
                        ScriptStep::Delay(duration) => tokio::time::sleep(duration).await,
                        ScriptStep::Fail(message) => {
                            return Some((Err(ProducerError::Backend(message)), (steps, guard)))
                        }
                        ScriptStep::Hang => futures::future::pending::<()>().await,
                    }
                }
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_scripted_producer_plays_script() {
        let producer = ScriptedProducer::new(vec![
            ScriptStep::text("a"),
            ScriptStep::NoContent,
            ScriptStep::delay_ms(1),
            ScriptStep::text("b"),
        ]);
        let probe = producer.probe();

        let chunks: Vec<_> = producer
            .produce("hello")
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec![Chunk::text("a"), Chunk::empty(), Chunk::text("b")]);
        assert_eq!(probe.opened(), 1);
        assert_eq!(probe.consumed(), 4);
        assert!(probe.dropped());
        assert_eq!(probe.queries(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_each_produce_call_is_independent() {
        let producer = ScriptedProducer::from_texts(["x"]);
        let probe = producer.probe();

        let first: Vec<_> = producer.produce("1").await.unwrap().collect().await;
        let second: Vec<_> = producer.produce("2").await.unwrap().collect().await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(probe.opened(), 2);
        assert_eq!(probe.dropped_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_to_open() {
        let producer = ScriptedProducer::failing_to_open("down");
        let result = producer.produce("q").await;
        assert!(matches!(result, Err(ProducerError::Backend(m)) if m == "down"));
    }
}
