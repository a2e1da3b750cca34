// src/cli/handlers/mod.rs

//! One module per command. Each exposes `handle(args, ctx)`.

/// `add`/`new`: registers a script.
pub mod add;
/// Helpers shared by the handlers.
pub mod commons;
/// `interpreter`/`interp`: sets or clears the virtual environment.
pub mod interpreter;
/// `list`/`ls`: shows the registry.
pub mod list;
/// `remove`/`rm`/`del`: unregisters a script.
pub mod remove;
/// `rename`: renames a script.
pub mod rename;
/// `run`: runs a script.
pub mod run;
/// `source`/`src`: points a script at another file.
pub mod source;
/// `stats`: counter and data locations.
pub mod stats;
