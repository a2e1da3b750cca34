// src/core/bootstrap.rs

//! First-run provisioning of the data directory.

use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::EXAMPLE_SCRIPT_NAME;
use crate::core::codec::{self, CodecError};
use crate::core::commons::write_atomic;
use crate::core::paths::DataPaths;
use crate::models::Entry;

const DEFAULT_REGISTRY_TEMPLATE: &str = include_str!("../../assets/config.txt");
const DEFAULT_COUNTER: &str = include_str!("../../assets/data.txt");
const EXAMPLE_SCRIPT: &str = include_str!("../../assets/example/main.py");

/// Line of the registry template replaced by the starter entry.
const EXAMPLE_PLACEHOLDER: &str = "<example>";
const EXAMPLE_ENTRY_NAME: &str = "Example";

/// Errors raised while provisioning the data directory.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The data directory could not be created.
    #[error("Could not create the data directory at '{path}': {source}")]
    DataDir {
        /// The directory.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A seed file could not be written.
    #[error("Could not write '{path}': {source}")]
    Asset {
        /// The file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The starter entry cannot be written in the registry format, usually because
    /// the data directory path contains `[` or `]`.
    #[error("Could not seed the registry: {0}")]
    Seed(#[from] CodecError),
}

/// Provisions the data directory on first run.
///
/// Creates the directory, the default registry (pointing at the starter script), the
/// starter script itself and the counter file. Files that already exist are left alone,
/// so calling this twice is harmless. Returns the files that were created.
///
/// Failing to create the directory is fatal; nothing else can work without it.
pub fn provision(paths: &DataPaths) -> Result<Vec<PathBuf>, BootstrapError> {
    let root = paths.root();
    fs::create_dir_all(root).map_err(|source| BootstrapError::DataDir {
        path: root.display().to_string(),
        source,
    })?;

    let mut created = Vec::new();

    let example_dir = paths.example_dir();
    let example_script = example_dir.join(EXAMPLE_SCRIPT_NAME);
    if !example_script.exists() {
        fs::create_dir_all(&example_dir).map_err(|source| asset_error(&example_dir, source))?;
        write_new(&example_script, EXAMPLE_SCRIPT, &mut created)?;
    }

    let registry_file = paths.registry_file();
    if !registry_file.exists() {
        let seed = codec::encode(&Entry::new(EXAMPLE_ENTRY_NAME, &example_script))?;
        let template = DEFAULT_REGISTRY_TEMPLATE.replace(EXAMPLE_PLACEHOLDER, seed.trim_end());
        write_new(&registry_file, &template, &mut created)?;
    }

    let counter_file = paths.counter_file();
    if !counter_file.exists() {
        write_new(&counter_file, DEFAULT_COUNTER, &mut created)?;
    }

    Ok(created)
}

fn write_new(
    path: &Path,
    contents: &str,
    created: &mut Vec<PathBuf>,
) -> Result<(), BootstrapError> {
    write_atomic(path, contents).map_err(|source| asset_error(path, source))?;
    info!("Created '{}'", path.display());
    created.push(path.to_path_buf());
    Ok(())
}

fn asset_error(path: &Path, source: io::Error) -> BootstrapError {
    BootstrapError::Asset {
        path: path.display().to_string(),
        source,
    }
}
