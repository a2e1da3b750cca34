// src/lib.rs

//! `scriptdeck` keeps a registry of named scripts in a plain-text file and runs them
//! with the global interpreter or inside their virtual environment.
//!
//! - [`core`]: the registry file format, the registry itself, the execution counter,
//!   settings and first-run provisioning.
//! - [`system`]: process spawning, the execution resolver and logging.
//! - [`cli`]: the command-line front end.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
pub mod system;
