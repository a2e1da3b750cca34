// src/system/executor.rs

//! From a registry entry to a finished child process.

use log::{error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::counter::ExecutionCounter;
use crate::models::{Entry, Settings, normalize_interpreter};
use crate::system::process::{CapturedOutput, Invocation, InvocationMode, ProcessSpawner};

/// Directory names that hold a virtual environment's executables.
const ENV_BIN_DIRS: &[&str] = &["bin", "Scripts"];
const ACTIVATE_SCRIPT: &str = "activate";

/// Why a run did not happen or did not finish.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The source is missing or not a recognised script. Nothing was spawned.
    #[error("Invalid script source '{path}': {reason}")]
    InvalidSource {
        /// The entry's source path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A path could not be quoted for the shell. Carries the entry name.
    #[error("Command for '{0}' could not be built: a path contains a NUL byte.")]
    CommandBuild(String),
    /// The OS refused to start the process.
    #[error("Command '{command}' could not be executed: {source}")]
    SpawnFailed {
        /// The command line that was attempted.
        command: String,
        /// The spawn error.
        #[source]
        source: io::Error,
    },
    /// The run exceeded `run_timeout_secs` and was killed.
    #[error("Command '{command}' was killed after running for {secs}s.")]
    TimedOut {
        /// The command line that was killed.
        command: String,
        /// The configured limit.
        secs: u64,
    },
}

/// Result of a run whose process was spawned.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// What was run.
    pub invocation: Invocation,
    /// What it printed and how it exited.
    pub output: CapturedOutput,
    /// Counter value after this run, `None` if it could not be persisted.
    pub executions: Option<u64>,
}

/// Turns registry entries into child processes.
///
/// A run moves through validation (source must be an existing script file), resolution
/// (virtual environment or global interpreter, working directory) and spawning. Success
/// means the process was started and ran to completion: its own exit status is reported
/// but not judged, so a script that fails internally still counts as an execution.
#[derive(Debug)]
pub struct ExecutionResolver<'a, S: ProcessSpawner> {
    settings: &'a Settings,
    counter: &'a ExecutionCounter,
    spawner: S,
}

impl<'a, S: ProcessSpawner> ExecutionResolver<'a, S> {
    /// A resolver reading `settings`, counting into `counter` and spawning through `spawner`.
    pub fn new(settings: &'a Settings, counter: &'a ExecutionCounter, spawner: S) -> Self {
        Self {
            settings,
            counter,
            spawner,
        }
    }

    /// The spawner runs go through.
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Builds the invocation for `entry` without running anything.
    pub fn resolve(&self, entry: &Entry) -> Result<Invocation, ExecutionError> {
        // 1. Validate the source.
        let source = entry.source.as_path();
        if !source.is_file() {
            return Err(invalid_source(source, "the file does not exist".to_string()));
        }
        if !self.settings.is_script_file(source) {
            let expected = self
                .settings
                .script_extensions
                .iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.')))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(invalid_source(
                source,
                format!("not a recognised script file (expected {})", expected),
            ));
        }

        // 2. The child runs next to the script and receives only its file name, so
        //    scripts can use paths relative to their own directory.
        let cwd = match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| invalid_source(source, "the path has no file name".to_string()))?;

        // 3. Pick the interpreter.
        let interpreter = entry
            .interpreter
            .as_ref()
            .and_then(|p| normalize_interpreter(&p.to_string_lossy()));

        match interpreter {
            Some(interpreter) => {
                let activate = activation_script(&interpreter);
                let script = format!(
                    ". {}; {} {}",
                    quote(&activate.to_string_lossy(), &entry.name)?,
                    quote(&interpreter.to_string_lossy(), &entry.name)?,
                    quote(&file_name, &entry.name)?,
                );
                Ok(Invocation {
                    program: self.settings.shell.clone(),
                    args: vec!["-c".to_string(), script],
                    cwd,
                    mode: InvocationMode::VirtualEnv {
                        activate,
                        interpreter,
                    },
                })
            }
            None => Ok(Invocation {
                program: self.settings.global_interpreter.clone(),
                args: vec![file_name],
                cwd,
                mode: InvocationMode::Global,
            }),
        }
    }

    /// Validates, resolves and runs `entry`, blocking until the child has finished.
    ///
    /// On success the execution counter is incremented. A counter that cannot be written
    /// is logged and does not turn the run into a failure.
    pub fn resolve_and_run(&self, entry: &Entry) -> Result<ExecutionOutcome, ExecutionError> {
        let invocation = self.resolve(entry)?;
        let timeout = self.settings.run_timeout_secs.map(Duration::from_secs);

        info!("Executing script '{}'", entry.name);
        info!("Executing command: '{}' in '{}'", invocation, invocation.cwd.display());

        let output = self.spawner.run(&invocation, timeout).map_err(|source| {
            error!("Could not execute script '{}': {}", entry.name, source);
            ExecutionError::SpawnFailed {
                command: invocation.to_string(),
                source,
            }
        })?;

        if output.timed_out {
            return Err(ExecutionError::TimedOut {
                command: invocation.to_string(),
                secs: self.settings.run_timeout_secs.unwrap_or_default(),
            });
        }

        match output.exit_code {
            Some(0) => info!("Script '{}' finished", entry.name),
            code => warn!(
                "Script '{}' exited with status {:?}; counted as executed",
                entry.name, code
            ),
        }

        let executions = match self.counter.increment() {
            Ok(count) => Some(count),
            Err(e) => {
                error!("{}", e);
                None
            }
        };

        Ok(ExecutionOutcome {
            invocation,
            output,
            executions,
        })
    }
}

/// Finds the activation script of the virtual environment that holds `interpreter`:
/// `activate` inside the nearest enclosing `bin` (or `Scripts`) directory, falling back to
/// the interpreter's own directory.
pub fn activation_script(interpreter: &Path) -> PathBuf {
    interpreter
        .ancestors()
        .skip(1)
        .find(|dir| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| ENV_BIN_DIRS.contains(&n))
        })
        .or_else(|| interpreter.parent())
        .unwrap_or_else(|| Path::new("."))
        .join(ACTIVATE_SCRIPT)
}

fn quote(word: &str, entry_name: &str) -> Result<String, ExecutionError> {
    shlex::try_quote(word)
        .map(|q| q.into_owned())
        .map_err(|_| ExecutionError::CommandBuild(entry_name.to_string()))
}

fn invalid_source(path: &Path, reason: String) -> ExecutionError {
    let err = ExecutionError::InvalidSource {
        path: path.display().to_string(),
        reason,
    };
    error!("{}", err);
    err
}
