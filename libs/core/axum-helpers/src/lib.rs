//! # Axum Helpers
//!
//! Shared utilities for building Axum web applications.
//!
//! ## Modules
//!
//! - **[`server`]**: Server bootstrap, OpenAPI mounts, health route, graceful shutdown
//! - **[`errors`]**: Structured error responses and fallback handlers
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON)

pub mod errors;
pub mod extractors;
pub mod server;

// Re-export server types
pub use server::{create_app, create_router, health_router, shutdown_signal, HealthResponse};

// Re-export error types
pub use errors::ErrorResponse;

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson};
