//! # Strata Core
//!
//! Domain types, traits, and error definitions for the Strata tiered memory
//! service. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod extraction;
pub mod layer;
pub mod record;
pub mod store;
pub mod summarizer;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, StoreError, SummarizerError, ValidationError};
pub use extraction::ExtractionCategory;
pub use layer::Layer;
pub use record::{FactFrequency, MemoryRecord, RecordPatch};
pub use store::LayerStore;
pub use summarizer::Summarizer;
