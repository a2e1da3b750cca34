// src/core/paths.rs

//! Location of the data directory and of every file inside it.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    COUNTER_FILENAME, DATA_DIR_ENV, DATA_DIR_NAME, EXAMPLE_DIR_NAME, LOG_FILENAME,
    REGISTRY_FILENAME, SETTINGS_FILENAME,
};

/// Errors raised while locating the data directory.
#[derive(Error, Debug)]
pub enum PathError {
    /// No override was given and the home directory is unknown.
    #[error("Could not find the home directory.")]
    HomeDirNotFound,
    /// `~` or `$VAR` in the override could not be expanded.
    #[error("Failed to expand data directory '{template}': {reason}")]
    Expansion {
        /// The path as given.
        template: String,
        /// Why expansion failed.
        reason: String,
    },
}

/// Every file location the application touches, derived from one data directory.
///
/// Built once at startup and handed to the components by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Uses `root` as the data directory as-is.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the data directory with clear priority:
    /// explicit override > `SCRIPTDECK_DATA_DIR` > `~/.scriptdeck`.
    ///
    /// Overrides may use `~` and `$VAR`.
    pub fn resolve(override_dir: Option<&str>) -> Result<Self, PathError> {
        let from_env = env::var(DATA_DIR_ENV).ok().filter(|v| !v.trim().is_empty());
        match override_dir.map(str::to_string).or(from_env) {
            Some(template) => Ok(Self::new(expand(&template)?)),
            None => {
                let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
                Ok(Self::new(home.join(DATA_DIR_NAME)))
            }
        }
    }

    /// The data directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The registry, one script per line.
    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILENAME)
    }

    /// The file holding the execution counter.
    pub fn counter_file(&self) -> PathBuf {
        self.root.join(COUNTER_FILENAME)
    }

    /// `settings.toml`.
    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILENAME)
    }

    /// `app.log`.
    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILENAME)
    }

    /// Directory of the starter script written on first run.
    pub fn example_dir(&self) -> PathBuf {
        self.root.join(EXAMPLE_DIR_NAME)
    }
}

fn expand(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_locations_derive_from_root() {
        let paths = DataPaths::new("/data/deck");
        assert_eq!(paths.registry_file(), PathBuf::from("/data/deck/.config.txt"));
        assert_eq!(paths.counter_file(), PathBuf::from("/data/deck/.data.txt"));
        assert_eq!(paths.settings_file(), PathBuf::from("/data/deck/settings.toml"));
        assert_eq!(paths.log_file(), PathBuf::from("/data/deck/app.log"));
        assert_eq!(paths.example_dir(), PathBuf::from("/data/deck/example"));
    }

    #[test]
    fn test_explicit_override_wins_and_expands_home() {
        let paths = DataPaths::resolve(Some("~/custom-deck")).unwrap();
        let home = dirs::home_dir().unwrap();
        assert_eq!(paths.root(), home.join("custom-deck"));
    }
}
