// src/core/mod.rs

//! Registry storage and everything it is built on. Nothing in here spawns processes.

pub mod bootstrap;
pub mod codec;
pub mod commons;
pub mod counter;
pub mod paths;
pub mod registry;
pub mod settings;
