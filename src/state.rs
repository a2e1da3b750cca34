// src/state.rs

//! The state shared by all command handlers.

use crate::core::counter::ExecutionCounter;
use crate::core::paths::DataPaths;
use crate::core::registry::{Registry, RegistryError};
use crate::models::Settings;

/// Everything a command handler works with, built once at startup.
///
/// Handlers receive it by mutable reference; nothing here lives in a global.
#[derive(Debug)]
pub struct AppContext {
    /// Where everything lives.
    pub paths: DataPaths,
    /// Loaded once at startup.
    pub settings: Settings,
    /// The scripts.
    pub registry: Registry,
    /// Runs so far.
    pub counter: ExecutionCounter,
    /// `true` when this start provisioned the data directory.
    pub first_run: bool,
}

impl AppContext {
    /// Opens the registry (provisioning the data directory on first run) and the counter.
    pub fn open(paths: DataPaths, settings: Settings) -> Result<Self, RegistryError> {
        let first_run = !paths.registry_file().exists();
        let registry = Registry::open(&paths)?;
        let counter = ExecutionCounter::new(paths.counter_file());
        Ok(Self {
            paths,
            settings,
            registry,
            counter,
            first_run,
        })
    }
}
