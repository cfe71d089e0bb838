// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./deskmate.toml` > `~/.config/deskmate/deskmate.toml` >
//! `/etc/deskmate/deskmate.toml`, with environment variable overrides via the
//! `DESKMATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DeskmateConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "DESKMATE_";

/// Top-level sections, used to map `DESKMATE_<SECTION>_<KEY>` to `section.key`.
const SECTIONS: &[&str] = &[
    "vector_store",
    "embedding",
    "retrieval",
    "logging",
    "server",
    "llm",
];

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/deskmate/deskmate.toml";

/// Local config file name, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "deskmate.toml";

/// User config file inside the XDG config directory, if one exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("deskmate/deskmate.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/deskmate/deskmate.toml` (system-wide)
/// 3. `~/.config/deskmate/deskmate.toml` (user XDG config)
/// 4. `./deskmate.toml` (local directory)
/// 5. `DESKMATE_*` environment variables
pub fn load_config() -> Result<DeskmateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DeskmateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskmateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskmateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskmateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DeskmateConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider with an explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `DESKMATE_RETRIEVAL_TOP_K` must map to `retrieval.top_k`, and
/// `DESKMATE_VECTOR_STORE_PATH` to `vector_store.path`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

/// Map a prefix-stripped env key, in any case, to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            && !rest.is_empty()
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
