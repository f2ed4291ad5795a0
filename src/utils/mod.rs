//! Shared utilities for color math and configuration validation

pub mod color;
pub mod validation;

pub use color::{color_distance, flatten_alpha};
pub use validation::ConfigValidator;
