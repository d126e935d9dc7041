//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`OpenAiProducer`] - Producer backed by an OpenAI-compatible API
//! - [`DemoProducer`] - Offline producer echoing the query word by word
//! - [`TerminalRenderer`] - Renderer redrawing in place with crossterm
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::ScriptedProducer`] - Scripted producer with a drop probe
//! - [`mock::RecordingRenderer`] - Renderer recording every call

pub mod demo;
pub mod mock;
pub mod openai;
pub mod terminal;

pub use demo::DemoProducer;
pub use mock::{RecordingRenderer, ScriptStep, ScriptedProducer};
pub use openai::OpenAiProducer;
pub use terminal::TerminalRenderer;

use std::sync::Arc;

use crate::config::Config;
use crate::traits::FragmentProducer;

/// Build the producer selected by the configuration.
pub fn producer_from_config(config: &Config) -> Arc<dyn FragmentProducer> {
    if config.demo {
        tracing::info!("Using the offline demo producer");
        Arc::new(DemoProducer::new(config.demo_delay))
    } else {
        if config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; every request will fail");
        }
        Arc::new(OpenAiProducer::from_config(config))
    }
}
