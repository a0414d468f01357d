// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Folio integration tests.
//!
//! # Components
//!
//! - [`MockOutboxStore`] - scripted claims, recorded enqueues and marks
//! - [`RecordingHandler`] - captures delivered payloads, optionally failing
//! - [`CountingResolver`] - kind map that counts resolutions
//! - [`TestHarness`] - temp-file database with the full storage stack

pub mod handlers;
pub mod harness;
pub mod mock_store;

pub use handlers::{CountingResolver, RecordingHandler};
pub use harness::TestHarness;
pub use mock_store::MockOutboxStore;
