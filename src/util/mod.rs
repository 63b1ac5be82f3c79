//! Utility modules for framesmith
//!
//! - Structured logging setup, tee'd to the console and the run log file

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
