// SPDX-FileCopyrightText: 2026 Deskmate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Deskmate support service.
//!
//! Every section rejects unknown keys. Files are looked up in the local
//! directory, then the user's XDG config dir, then `/etc/deskmate`;
//! `DESKMATE_*` environment variables win over all of them. Failures come back
//! as miette diagnostics, with a "did you mean" hint for misspelled keys.
//!
//! ```no_run
//! let config = match deskmate_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         deskmate_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("model: {}", config.llm.model);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::DeskmateConfig;

/// Loads from the standard file hierarchy and validates the result.
pub fn load_and_validate() -> Result<DeskmateConfig, Vec<ConfigError>> {
    checked(loader::load_config(), hierarchy_sources)
}

/// Loads from an explicit file (plus env overrides) and validates the result.
pub fn load_and_validate_path(path: &Path) -> Result<DeskmateConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path.display().to_string(), path)
            .into_iter()
            .collect()
    })
}

pub fn load_and_validate_str(toml_content: &str) -> Result<DeskmateConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Runs validation on a parsed config, or turns the figment failure into
/// diagnostics. `sources` is only read on the error path.
fn checked(
    loaded: Result<DeskmateConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<DeskmateConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(label: String, path: &Path) -> Option<(String, String)> {
    std::fs::read_to_string(path)
        .ok()
        .map(|content| (label, content))
}

/// Contents of every hierarchy file that exists, keyed the way figment
/// reports their paths.
fn hierarchy_sources() -> Vec<(String, String)> {
    let local = Path::new(loader::LOCAL_CONFIG_FILE);
    let local_label = std::env::current_dir()
        .map(|dir| dir.join(local).display().to_string())
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.to_string());

    let system = Path::new(loader::SYSTEM_CONFIG_PATH);

    [
        read_source(local_label, local),
        loader::user_config_path()
            .and_then(|path| read_source(path.display().to_string(), &path)),
        read_source(loader::SYSTEM_CONFIG_PATH.to_string(), system),
    ]
    .into_iter()
    .flatten()
    .collect()
}
