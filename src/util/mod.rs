//! Utility modules for thrasher

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
