// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Parse failures from figment and semantic failures from validation both
//! end up as [`ConfigError`] values that miette renders with a pointer into
//! the offending `folio.toml` and a hint at the fix.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Name under which an inline TOML document is registered as a source.
pub const INLINE_SOURCE: &str = "<inline>";

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no Folio section declares.
    #[error("unknown key `{key}` in {}", section_label(.section.as_deref()))]
    #[diagnostic(
        code(folio::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Section the key appeared in, `None` at the top level.
        section: Option<String>,
        key: String,
        suggestion: Option<String>,
        /// Keys the section accepts, comma separated.
        valid_keys: String,
        #[label("not a Folio setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type, e.g. `workers = "many"`.
    #[error("`{key}` expects {expected}, found {found}")]
    #[diagnostic(code(folio::config::invalid_type))]
    InvalidType {
        /// Dotted path, e.g. `outbox.workers`.
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("log.level `{level}` is not a tracing level")]
    #[diagnostic(
        code(folio::config::log_level),
        help("use one of trace, debug, info, warn, error")
    )]
    InvalidLogLevel { level: String },

    #[error("storage.database_path must not be empty")]
    #[diagnostic(
        code(folio::config::database_path),
        help("set storage.database_path or FOLIO_STORAGE_DATABASE_PATH")
    )]
    EmptyDatabasePath,

    /// A numeric outbox setting that must be positive while the dispatcher runs.
    #[error("outbox.{key} must be at least 1 when the outbox is enabled")]
    #[diagnostic(
        code(folio::config::outbox_zero),
        help("raise outbox.{key} or set outbox.enabled = false")
    )]
    OutboxValueTooSmall { key: &'static str },

    #[error("outbox.{key} is required when the outbox is enabled")]
    #[diagnostic(
        code(folio::config::send_url_missing),
        help("point outbox.{key} at the consumer endpoint or set outbox.enabled = false")
    )]
    MissingSendUrl { key: &'static str },

    #[error("outbox.{key} `{url}` is not an http:// or https:// URL")]
    #[diagnostic(code(folio::config::send_url_scheme))]
    InvalidSendUrl { key: &'static str, url: String },

    /// Anything figment reports that has no dedicated variant.
    #[error("configuration error: {0}")]
    #[diagnostic(code(folio::config::other))]
    Other(String),
}

fn section_label(section: Option<&str>) -> String {
    match section {
        Some(section) => format!("[{section}]"),
        None => "the top level".to_string(),
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error figment collected into a [`ConfigError`].
///
/// `toml_sources` pairs a file name with its contents; errors raised from a
/// listed file get a span pointing at the key.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            let source = source_for(&error, toml_sources);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let (span, src) = locate(source, &path, field);
                    ConfigError::UnknownKey {
                        section: path.first().cloned(),
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (section, field) = match path.split_last() {
                        Some((field, section)) => (section, field.as_str()),
                        None => (&path[..], ""),
                    };
                    let (span, src) = locate(source, section, field);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: actual.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The registered source text the error was read from, if any.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let name = match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => path.display().to_string(),
        figment::Source::Code(_) => INLINE_SOURCE.to_string(),
        _ => return None,
    };
    toml_sources
        .iter()
        .find(|(path, _)| *path == name)
        .map(|(path, content)| (path.as_str(), content.as_str()))
}

fn locate(
    source: Option<(&str, &str)>,
    section: &[String],
    field: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((name, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.to_string())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` as a key inside the `[section]` table.
///
/// The search stops at the next table header, so a key of the same name in
/// a later section is never matched. An empty `section` searches the keys
/// before the first header.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let mut in_section = section.is_empty();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            let header = trimmed.trim_end().trim_start_matches('[').trim_end_matches(']');
            in_section = !section.is_empty() && header.trim() == section.join(".");
        } else if in_section
            && let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Closest valid key by Jaro-Winkler similarity, if any is close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
    eprintln!(
        "folio: {} configuration error{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}
