// src/core/counter.rs

//! The persisted count of script runs.

use log::{debug, warn};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::constants::EXECUTIONS_TAG;
use crate::core::commons::{line_ending, lines_with_endings, read_optional, write_atomic};

/// Errors raised by [`ExecutionCounter::increment`].
#[derive(Error, Debug)]
pub enum CounterError {
    /// The data file could not be read or replaced.
    #[error("Could not read or write the execution counter at '{path}': {source}")]
    Storage {
        /// The data file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Total number of successful script runs, persisted as `(executions)<n>` in the data file.
///
/// Single-process use only: the read-modify-write in `increment` is not guarded
/// against another process updating the same file.
#[derive(Debug, Clone)]
pub struct ExecutionCounter {
    path: PathBuf,
}

impl ExecutionCounter {
    /// A counter stored in `path`. Nothing is read until it is used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current count. A missing, unreadable or garbled file counts as zero runs.
    pub fn get(&self) -> u64 {
        match read_optional(&self.path) {
            Ok(Some(content)) => find_count(&content).unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("Could not read data file '{}': {}", self.path.display(), e);
                0
            }
        }
    }

    /// Adds one run and persists it. Other lines of the data file are preserved.
    /// Returns the new count.
    pub fn increment(&self) -> Result<u64, CounterError> {
        let content = read_optional(&self.path)
            .map_err(|e| self.storage_error(e))?
            .unwrap_or_default();

        let next = find_count(&content).unwrap_or(0).saturating_add(1);
        let new_line = format!("{}{}", EXECUTIONS_TAG, next);

        let ending = line_ending(&content);
        let mut replaced = false;
        let mut output = String::with_capacity(content.len() + new_line.len());
        for (line, line_end) in lines_with_endings(&content) {
            if !replaced && line.trim_start().starts_with(EXECUTIONS_TAG) {
                replaced = true;
                output.push_str(&new_line);
            } else {
                output.push_str(line);
            }
            output.push_str(if line_end.is_empty() { ending } else { line_end });
        }
        if !replaced {
            output.push_str(&new_line);
            output.push_str(ending);
        }
        write_atomic(&self.path, &output).map_err(|e| self.storage_error(e))?;

        debug!("Execution counter is now {}", next);
        Ok(next)
    }

    fn storage_error(&self, source: io::Error) -> CounterError {
        CounterError::Storage {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn find_count(content: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        line.trim()
            .strip_prefix(EXECUTIONS_TAG)
            .and_then(|value| value.trim().parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let counter = ExecutionCounter::new(dir.path().join(".data.txt"));
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_garbled_value_reads_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".data.txt");
        fs::write(&path, "(executions)lots\n").unwrap();
        assert_eq!(ExecutionCounter::new(&path).get(), 0);
    }

    #[test]
    fn test_increment_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".data.txt");
        fs::write(&path, "(executions)41\n").unwrap();

        let counter = ExecutionCounter::new(&path);
        assert_eq!(counter.increment().unwrap(), 42);
        assert_eq!(counter.get(), 42);
        assert_eq!(fs::read_to_string(&path).unwrap(), "(executions)42\n");
    }

    #[test]
    fn test_increment_creates_missing_file() {
        let dir = tempdir().unwrap();
        let counter = ExecutionCounter::new(dir.path().join(".data.txt"));
        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment().unwrap(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_increment_preserves_other_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".data.txt");
        fs::write(&path, "# stats\n(executions)3\n(other)x\n").unwrap();

        ExecutionCounter::new(&path).increment().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# stats\n(executions)4\n(other)x\n"
        );
    }

    #[test]
    fn test_increment_keeps_crlf_file_crlf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".data.txt");
        fs::write(&path, "# stats\r\n(executions)3").unwrap();

        ExecutionCounter::new(&path).increment().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# stats\r\n(executions)4\r\n");
    }

    #[test]
    fn test_increment_fails_when_directory_is_missing() {
        let dir = tempdir().unwrap();
        let counter = ExecutionCounter::new(dir.path().join("nope").join(".data.txt"));
        assert!(matches!(counter.increment(), Err(CounterError::Storage { .. })));
    }
}
