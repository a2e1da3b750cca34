// src/models.rs

//! The registry entry and the settings model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::INTERPRETER_SENTINELS;

// --- REGISTRY MODELS ---

/// One registered script.
///
/// `name` is the identity of the entry: the registry guarantees it is non-empty and
/// unique (case-sensitive) among all entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Display name, also the identity of the entry.
    pub name: String,
    /// The script file.
    pub source: PathBuf,
    /// Interpreter inside a virtual environment. `None` runs the global interpreter.
    pub interpreter: Option<PathBuf>,
}

impl Entry {
    /// An entry using the global interpreter.
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            interpreter: None,
        }
    }

    /// Sets the interpreter; sentinels like `none` leave it unset.
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = normalize_interpreter(&interpreter.into().to_string_lossy());
        self
    }

    /// `Name: '<name>'`.
    pub fn name_label(&self) -> String {
        format!("Name: '{}'", self.name)
    }

    /// Only the file name is shown; the full path is noise in a menu.
    pub fn source_label(&self) -> String {
        let file_name = file_name_lossy(&self.source);
        format!("Source: '{}'", file_name)
    }

    /// `Interpreter: 'Global'`, or the interpreter's file name marked `(venv)`.
    pub fn interpreter_label(&self) -> String {
        match &self.interpreter {
            None => "Interpreter: 'Global'".to_string(),
            Some(path) => format!("Interpreter: '(venv) {}'", file_name_lossy(path)),
        }
    }
}

/// Maps the raw interpreter field to an optional path.
///
/// Empty values and the sentinels `none`, `.` and a single space (any case) mean
/// "no interpreter configured".
pub fn normalize_interpreter(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        return None;
    }
    let lowered = raw.to_lowercase();
    if INTERPRETER_SENTINELS.contains(&lowered.as_str()) {
        return None;
    }
    Some(PathBuf::from(raw))
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// --- `settings.toml` MODEL ---

/// Application settings, loaded once at startup and passed by reference to every
/// component that needs them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Interpreter used for entries without a virtual environment.
    pub global_interpreter: String,
    /// Shell used to source a virtual environment before running its interpreter.
    pub shell: String,
    /// File extensions (without the dot) accepted as runnable scripts.
    pub script_extensions: Vec<String>,
    /// Kill a script after this many seconds. `None` waits for it indefinitely.
    pub run_timeout_secs: Option<u64>,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            global_interpreter: "python3".to_string(),
            shell: "bash".to_string(),
            script_extensions: vec!["py".to_string()],
            run_timeout_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns `true` if `path` carries one of the configured script extensions.
    pub fn is_script_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.script_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}
