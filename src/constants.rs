// src/constants.rs

//! Fixed names and tags.

/// The name of the per-user data directory (created under the home directory).
pub const DATA_DIR_NAME: &str = ".scriptdeck";

/// Environment variable that overrides the data directory location.
pub const DATA_DIR_ENV: &str = "SCRIPTDECK_DATA_DIR";

/// The registry file holding one script entry per line (inside the data dir).
pub const REGISTRY_FILENAME: &str = ".config.txt";

/// The small data file holding the execution counter (inside the data dir).
pub const COUNTER_FILENAME: &str = ".data.txt";

/// The settings file (inside the data dir).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// The log file (inside the data dir).
pub const LOG_FILENAME: &str = "app.log";

/// The directory holding the starter script (inside the data dir).
pub const EXAMPLE_DIR_NAME: &str = "example";

/// The tag that prefixes the counter value in the data file.
pub const EXECUTIONS_TAG: &str = "(executions)";

/// Name given to entries added without an explicit name.
pub const DEFAULT_ENTRY_NAME: &str = "New Script";

/// Interpreter values that mean "use the global interpreter" (compared case-insensitively).
pub const INTERPRETER_SENTINELS: &[&str] = &["none", ".", " "];

/// File name of the starter script inside the example directory.
pub const EXAMPLE_SCRIPT_NAME: &str = "main.py";
