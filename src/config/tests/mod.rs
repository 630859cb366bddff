//! Unit tests for configuration loading and resolution.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `target`: Export target resolution
//! - `options`: Counts, render options and token resolution

mod helpers;
