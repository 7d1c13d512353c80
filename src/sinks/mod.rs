//! Sink implementations

pub mod console;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use rotating_file::{RotatingFileSink, RotationPolicy, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};

// Re-export the trait next to its implementations
pub use crate::core::Sink;
