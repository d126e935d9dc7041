//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait abstractions,
//! enabling tests without a generation backend or a terminal.
//!
//! # Available Mocks
//!
//! - [`ScriptedProducer`] - Producer that plays back a fixed script of steps
//! - [`RecordingRenderer`] - Renderer that records every call

pub mod producer;
pub mod render;

pub use producer::{ProducerProbe, ScriptStep, ScriptedProducer};
pub use render::RecordingRenderer;
