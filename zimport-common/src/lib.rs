//! # zimport Common Library
//!
//! Shared code for the zimport crates:
//! - Error type and result alias
//! - Configuration loading and resolution
//! - Tracing initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
