// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod cache_gate;
pub mod categorize;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod rank;
pub mod render;
pub mod tracking;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::ingest::types::{Article, SourceProvider};
pub use crate::pipeline::{Pipeline, RunReport};
