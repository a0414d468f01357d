// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Lookup order: `/etc/folio/folio.toml`, then `~/.config/folio/folio.toml`,
//! then `./folio.toml`, then `FOLIO_*` environment variables. Later layers
//! override earlier ones and missing files are skipped.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FolioConfig;

/// Sections recognised in `FOLIO_<SECTION>_<KEY>` environment variables.
const ENV_SECTIONS: &[&str] = &["log", "storage", "outbox"];

pub const SYSTEM_CONFIG_PATH: &str = "/etc/folio/folio.toml";
pub const LOCAL_CONFIG_FILE: &str = "folio.toml";

/// The per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("folio").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<FolioConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML document only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, still honouring `FOLIO_*` overrides.
pub fn load_config_from_path(path: &Path) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG_FILE)).merge(env_provider())
}

/// Map `FOLIO_OUTBOX_BATCH_SIZE` to `outbox.batch_size`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores keep them.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("FOLIO_").map(|key| {
        let key_str = key.as_str();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
