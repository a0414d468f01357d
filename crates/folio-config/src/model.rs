// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Folio catalog service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Folio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transactional outbox delivery settings.
    #[serde(default)]
    pub outbox: OutboxConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("folio").join("folio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("folio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Outbox dispatcher configuration.
///
/// Disabled by default so environments without a downstream consumer never
/// start polling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutboxConfig {
    /// Start the background dispatcher.
    #[serde(default)]
    pub enabled: bool,

    /// Number of independent polling workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum messages claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Sleep between polls, in milliseconds.
    #[serde(default = "default_wait_time_ms")]
    pub wait_time_ms: u64,

    /// Lease length for claimed messages, in milliseconds. A claimed message
    /// that is not marked processed within this window is claimed again.
    #[serde(default = "default_in_progress_ttl_ms")]
    pub in_progress_ttl_ms: u64,

    /// Endpoint notified when a book is added.
    #[serde(default)]
    pub book_send_url: Option<String>,

    /// Endpoint notified when an author is registered.
    #[serde(default)]
    pub author_send_url: Option<String>,

    /// Per-request timeout for delivery calls, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            workers: default_workers(),
            batch_size: default_batch_size(),
            wait_time_ms: default_wait_time_ms(),
            in_progress_ttl_ms: default_in_progress_ttl_ms(),
            book_send_url: None,
            author_send_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl OutboxConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.wait_time_ms)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_millis(self.in_progress_ttl_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_workers() -> usize {
    1
}

fn default_batch_size() -> usize {
    100
}

fn default_wait_time_ms() -> u64 {
    1_000
}

fn default_in_progress_ttl_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}
