//! Server crate for the creative recommendation engine.
//!
//! This crate contains the engine that owns the served dataset and model,
//! plus the HTTP routes that expose it.

pub mod config;
pub mod engine;
pub mod http;

pub use config::{EngineConfig, ServerConfig};
pub use engine::{CreativeRecommendationEngine, EngineSnapshot, EngineSummary};
pub use http::{ApiError, AppState, create_router, serve};
