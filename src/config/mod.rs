// src/config/mod.rs
pub mod pipeline;
pub mod server;

pub use pipeline::{CacheConfig, FetchConfig, PipelineConfig, RenderConfig};
pub use server::{DbConfig, ServerConfig};
