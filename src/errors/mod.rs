//! # Error Handling
//!
//! This module provides process-level error handling for the secrets router.
//! It defines custom error types using `thiserror`.

pub mod types;

pub use types::{Error, Result};
