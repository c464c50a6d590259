//! Shared test utilities for finvision integration tests.
//!
//! This module provides:
//! - `ScriptedExtractor` and `RecordingSink` doubles for the queue seams
//! - `QueueHarness` wiring them into an `UploadQueue`

pub mod doubles;
pub mod harness;

pub use doubles::*;
pub use harness::QueueHarness;
