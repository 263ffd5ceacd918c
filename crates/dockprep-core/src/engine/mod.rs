//! Preparation engine: configuration, cleanup passes, progress reporting, and
//! the error type shared by the workflow layer.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod progress;
