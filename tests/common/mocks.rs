//! Mock implementations for test fixtures.
//!
//! Re-exports the test doubles from `tokenflow::adapters::mock` and adds
//! ready-made producer scripts.

pub use tokenflow::adapters::mock::{ProducerProbe, RecordingRenderer, ScriptStep, ScriptedProducer};

/// Script that yields `count` fragments with `delay_ms` between them.
pub fn slow_script(count: usize, delay_ms: u64) -> Vec<ScriptStep> {
    (0..count)
        .flat_map(|i| [ScriptStep::delay_ms(delay_ms), ScriptStep::text(format!("{} ", i))])
        .collect()
}
