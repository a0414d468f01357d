// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Outbox constraints only apply when the dispatcher is enabled; a disabled
//! outbox may carry placeholder values.

use crate::diagnostic::ConfigError;
use crate::model::{FolioConfig, OutboxConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &FolioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogLevel {
            level: config.log.level.clone(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::EmptyDatabasePath);
    }

    if config.outbox.enabled {
        validate_outbox(&config.outbox, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_outbox(outbox: &OutboxConfig, errors: &mut Vec<ConfigError>) {
    let positive = [
        ("workers", outbox.workers as u64),
        ("batch_size", outbox.batch_size as u64),
        ("wait_time_ms", outbox.wait_time_ms),
        ("in_progress_ttl_ms", outbox.in_progress_ttl_ms),
        ("request_timeout_ms", outbox.request_timeout_ms),
    ];
    for (key, value) in positive {
        if value == 0 {
            errors.push(ConfigError::OutboxValueTooSmall { key });
        }
    }

    for (key, url) in [
        ("book_send_url", &outbox.book_send_url),
        ("author_send_url", &outbox.author_send_url),
    ] {
        match url.as_deref().map(str::trim) {
            None | Some("") => errors.push(ConfigError::MissingSendUrl { key }),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                errors.push(ConfigError::InvalidSendUrl {
                    key,
                    url: url.to_string(),
                })
            }
            Some(_) => {}
        }
    }
}
