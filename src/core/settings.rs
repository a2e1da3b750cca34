// src/core/settings.rs

//! Loading of `settings.toml`.

use std::fs;
use thiserror::Error;

use crate::core::commons::write_atomic;
use crate::core::paths::DataPaths;
use crate::models::Settings;

/// Errors raised while loading `settings.toml`.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file or its directory could not be read or written.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has unknown fields.
    #[error("Failed to parse settings.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// The defaults could not be rendered.
    #[error("Failed to serialize settings to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Loads `settings.toml` from the data directory, writing the defaults there first if the
/// file does not exist yet.
pub fn load_settings(paths: &DataPaths) -> Result<Settings, SettingsError> {
    let settings_path = paths.settings_file();
    if !settings_path.exists() {
        let defaults = Settings::default();
        let toml_string = toml::to_string_pretty(&defaults)?;
        fs::create_dir_all(paths.root())?;
        write_atomic(&settings_path, &toml_string)?;
        log::debug!("Wrote default settings to '{}'", settings_path.display());
        Ok(defaults)
    } else {
        let content = fs::read_to_string(&settings_path)?;
        Ok(toml::from_str(&content)?)
    }
}
