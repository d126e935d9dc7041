//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`FragmentProducer`] - the opaque text-generation capability
//! - [`Renderer`] - where a client session's display string is drawn

pub mod producer;
pub mod render;

pub use producer::{Chunk, ChunkStream, FragmentProducer};
pub use render::Renderer;
