//! Configuration module for the Corvus DB Platform
//!
//! Centralized configuration loading and Data Transfer Objects for the
//! control-plane engine.
//!
//! # Architecture
//!
//! 1. **Single Source of Truth**: configuration is loaded once at startup
//! 2. **Fail Fast**: errors are reported immediately, no silent fallbacks
//! 3. **DTO Pattern**: configuration is immutable and passed via dependency injection
//! 4. **Env File Priority**: `.env` file > environment variables > defaults
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to the documented defaults:
//!
//! - `CORVUS_TASK_HISTORY_LIMIT`: tasks returned per customer listing (default: 6)
//! - `CORVUS_SUBTASK_MAX_RETRIES`: retry budget per subtask unit (default: 3)
//! - `CORVUS_RETRY_BASE_DELAY_MS`: base backoff delay in milliseconds (default: 1000)
//! - `RUST_LOG`: log level (default: "info")

pub mod dto;
pub mod error;
pub mod loader;

pub use dto::{LoggingConfig, PlatformConfig, TaskEngineConfig};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
