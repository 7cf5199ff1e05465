//! Common utilities and shared infrastructure
//!
//! - Error handling
//! - Logging setup

pub mod error;
pub mod logger;

pub use error::{EngineError, EngineResult};
pub use logger::{init_logger, init_logger_with_file};
