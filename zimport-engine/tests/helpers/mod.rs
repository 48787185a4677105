//! Test Helper Utilities
//!
//! Shared utilities for testing zimport-engine

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;

pub use fixtures::{write_zip, TestEnv, JPEG, PNG};
pub use log_capture::{capture_logs, LogCapture};
