//! Segstream - segmented HTTP media streaming
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod report;

pub use segstream_common::{Error, Result};
