//! # System Interaction Layer
//!
//! The boundary between the registry logic and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: Turns a registry entry into a concrete child-process invocation
//!   (virtual environment or global interpreter, working directory), runs it and
//!   classifies the outcome.
//! - **`process`**: The `ProcessSpawner` seam and its real implementation, which captures
//!   stdout/stderr and enforces the optional run timeout.
//! - **`logging`**: `env_logger` setup writing to the data directory's `app.log`.

pub mod executor;
pub mod logging;
pub mod process;
