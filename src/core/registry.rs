// src/core/registry.rs

//! The script registry: an ordered list of uniquely named entries kept in one text file.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::DEFAULT_ENTRY_NAME;
use crate::core::bootstrap::{self, BootstrapError};
use crate::core::codec::{self, CodecError, LineKind, ParseDefect};
use crate::core::commons::{line_ending, lines_with_endings, read_optional, write_atomic};
use crate::core::paths::DataPaths;
use crate::models::{Entry, normalize_interpreter};

/// Represents errors that can occur while reading or mutating the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry file could not be read or replaced. The file on disk keeps its
    /// previous contents.
    #[error("Could not access the registry at '{path}': {source}")]
    Storage {
        /// The registry file.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Another entry already uses this name.
    #[error("A script named '{name}' already exists.")]
    DuplicateName {
        /// The name that is taken.
        name: String,
    },
    /// A name, source or interpreter update was given an empty value.
    #[error("The script {field} cannot be empty.")]
    EmptyField {
        /// `name`, `source` or `interpreter`.
        field: &'static str,
    },
    /// A value cannot be written in the registry format.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// First-run provisioning failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

type RegistryResult<T> = Result<T, RegistryError>;

/// The field an update targets on a matching record line.
enum FieldChange<'a> {
    Name(&'a str),
    Source(String),
    Interpreter(String),
    Remove,
}

/// The ordered list of registered scripts, backed by the registry file.
///
/// Every mutation reads the whole file, edits it in memory and replaces the file in one
/// atomic step. The in-memory list is refreshed from the written text only after the
/// write succeeded, so a failed mutation leaves both the file and this value unchanged.
///
/// There is no locking: if another program edits the file between two calls, the last
/// writer wins.
#[derive(Debug)]
pub struct Registry {
    paths: DataPaths,
    entries: Vec<Entry>,
    names: HashSet<String>,
    defects: Vec<ParseDefect>,
}

impl Registry {
    /// Opens the registry in `paths`, provisioning the data directory on first run.
    pub fn open(paths: &DataPaths) -> RegistryResult<Self> {
        let mut registry = Self {
            paths: paths.clone(),
            entries: Vec::new(),
            names: HashSet::new(),
            defects: Vec::new(),
        };
        registry.load()?;
        Ok(registry)
    }

    /// Re-reads the registry file and returns its entries in file order.
    ///
    /// If the file does not exist, the data directory is provisioned first. Line-level
    /// problems are logged and kept in [`Registry::defects`]; they never fail the load.
    pub fn load(&mut self) -> RegistryResult<&[Entry]> {
        let file = self.file();
        let content = match read_optional(&file).map_err(|e| self.storage_error(e))? {
            Some(content) => content,
            None => {
                info!("No registry at '{}'. Provisioning data directory.", file.display());
                bootstrap::provision(&self.paths)?;
                read_optional(&file)
                    .map_err(|e| self.storage_error(e))?
                    .unwrap_or_default()
            }
        };

        self.apply(&content);
        for defect in &self.defects {
            warn!("Registry '{}': {}", file.display(), defect);
        }
        debug!("Loaded {} entries from '{}'", self.entries.len(), file.display());
        Ok(&self.entries)
    }

    /// The entries in file order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Problems found in the registry file during the last load or mutation.
    pub fn defects(&self) -> &[ParseDefect] {
        &self.defects
    }

    /// The entry called `name` (case-sensitive).
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether an entry is called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Path of the backing file.
    pub fn file(&self) -> PathBuf {
        self.paths.registry_file()
    }

    /// First unused name of the form `New Script`, `New Script 2`, `New Script 3`...
    pub fn next_default_name(&self) -> String {
        if !self.contains(DEFAULT_ENTRY_NAME) {
            return DEFAULT_ENTRY_NAME.to_string();
        }
        (2..)
            .map(|n| format!("{} {}", DEFAULT_ENTRY_NAME, n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_default()
    }

    /// Appends `entry` as a new line at the end of the registry.
    ///
    /// # Errors
    /// `DuplicateName` if the name is taken, `EmptyField` for an empty name or source.
    /// The file is untouched in both cases.
    pub fn add(&mut self, entry: Entry) -> RegistryResult<()> {
        if entry.name.is_empty() {
            return Err(RegistryError::EmptyField { field: "name" });
        }
        if entry.source.as_os_str().is_empty() {
            return Err(RegistryError::EmptyField { field: "source" });
        }

        let mut content = self.read_current()?;
        if record_names(&content).contains(entry.name.as_str()) {
            return Err(RegistryError::DuplicateName { name: entry.name });
        }

        let line = codec::encode(&entry)?;
        let ending = line_ending(&content);
        if !content.is_empty() && !content.ends_with('\n') {
            content.push_str(ending);
        }
        content.push_str(line.trim_end_matches('\n'));
        content.push_str(ending);

        self.commit(&content)?;
        info!("Added script '{}' ({})", entry.name, entry.source.display());
        Ok(())
    }

    /// Renames `entry`, keeping its source and interpreter.
    ///
    /// Returns `Ok(false)` if no line carries `entry.name` any more, which means the
    /// caller's copy is stale and should be reloaded.
    pub fn update_name(&mut self, entry: &Entry, new_name: &str) -> RegistryResult<bool> {
        if new_name.is_empty() {
            return Err(RegistryError::EmptyField { field: "name" });
        }
        if new_name != entry.name {
            let content = self.read_current()?;
            if record_names(&content).contains(new_name) {
                return Err(RegistryError::DuplicateName {
                    name: new_name.to_string(),
                });
            }
        }
        self.rewrite_matching(&entry.name, FieldChange::Name(new_name))
    }

    /// Points `entry` at a different script file.
    pub fn update_source(
        &mut self,
        entry: &Entry,
        new_source: impl AsRef<Path>,
    ) -> RegistryResult<bool> {
        let new_source = new_source.as_ref();
        if new_source.as_os_str().is_empty() {
            return Err(RegistryError::EmptyField { field: "source" });
        }
        self.rewrite_matching(&entry.name, FieldChange::Source(codec::path_text(new_source)))
    }

    /// Sets the virtual-environment interpreter of `entry`.
    ///
    /// The sentinels `none` and `.` switch the entry back to the global interpreter.
    pub fn update_interpreter(&mut self, entry: &Entry, new_interpreter: &str) -> RegistryResult<bool> {
        if new_interpreter.is_empty() {
            return Err(RegistryError::EmptyField {
                field: "interpreter",
            });
        }
        let stored = normalize_interpreter(new_interpreter)
            .map(|p| codec::path_text(&p))
            .unwrap_or_default();
        self.rewrite_matching(&entry.name, FieldChange::Interpreter(stored))
    }

    /// Deletes every line carrying `entry.name`. Removing an unknown name is a no-op.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, entry: &Entry) -> RegistryResult<bool> {
        let removed = self.rewrite_matching(&entry.name, FieldChange::Remove)?;
        if removed {
            info!("Removed script '{}'", entry.name);
        } else {
            debug!("Nothing to remove for '{}'", entry.name);
        }
        Ok(removed)
    }

    // --- Internal helpers ---

    fn rewrite_matching(&mut self, name: &str, change: FieldChange<'_>) -> RegistryResult<bool> {
        let content = self.read_current()?;
        let mut matched = false;
        let mut output = String::with_capacity(content.len());

        // Lines keep their own terminators so a CRLF file stays CRLF.
        for (line, ending) in lines_with_endings(&content) {
            match codec::parse_line(line) {
                LineKind::Record(mut raw) if raw.name == name => {
                    matched = true;
                    match &change {
                        FieldChange::Remove => continue,
                        FieldChange::Name(new_name) => raw.name = new_name.to_string(),
                        FieldChange::Source(source) => raw.source = source.clone(),
                        FieldChange::Interpreter(interp) => raw.interpreter = interp.clone(),
                    }
                    output.push_str(raw.encode()?.trim_end_matches('\n'));
                    output.push_str(ending);
                }
                _ => {
                    output.push_str(line);
                    output.push_str(ending);
                }
            }
        }

        if !matched {
            debug!("No registry line named '{}'", name);
            return Ok(false);
        }
        self.commit(&output)?;
        Ok(true)
    }

    fn read_current(&self) -> RegistryResult<String> {
        Ok(read_optional(&self.file())
            .map_err(|e| self.storage_error(e))?
            .unwrap_or_default())
    }

    /// Writes `content` and, only once that succeeded, adopts it as the in-memory state.
    fn commit(&mut self, content: &str) -> RegistryResult<()> {
        let file = self.file();
        write_atomic(&file, content).map_err(|e| self.storage_error(e))?;
        self.apply(content);
        Ok(())
    }

    fn apply(&mut self, content: &str) {
        let decoded = codec::decode_document(content);
        self.names = decoded.entries.iter().map(|e| e.name.clone()).collect();
        self.entries = decoded.entries;
        self.defects = decoded.defects;
    }

    fn storage_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Storage {
            path: self.file().display().to_string(),
            source,
        }
    }
}

/// Every NAME written in the file, including the ones decoding would skip as duplicates.
fn record_names(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter_map(|line| match codec::parse_line(line) {
            LineKind::Record(raw) => Some(raw.name),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const LINE_A: &str = "(name)[A](source)[/tmp/a.py](interpreter)[]\n";

    fn registry_with(content: &str) -> (TempDir, Registry) {
        let dir = tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        fs::write(paths.registry_file(), content).unwrap();
        let registry = Registry::open(&paths).unwrap();
        (dir, registry)
    }

    fn file_text(registry: &Registry) -> String {
        fs::read_to_string(registry.file()).unwrap()
    }

    fn entry_a() -> Entry {
        Entry::new("A", "/tmp/a.py")
    }

    #[test]
    fn test_load_single_entry() {
        let (_dir, registry) = registry_with(LINE_A);
        assert_eq!(registry.entries(), &[entry_a()]);
        assert!(registry.contains("A"));
        assert!(registry.defects().is_empty());
    }

    #[test]
    fn test_load_bootstraps_missing_registry() {
        let dir = tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("fresh"));

        let registry = Registry::open(&paths).unwrap();

        assert_eq!(registry.entries().len(), 1);
        assert_eq!(registry.entries()[0].name, "Example");
        assert!(paths.counter_file().is_file());
    }

    #[test]
    fn test_load_reports_defects_without_failing() {
        let (_dir, registry) =
            registry_with("(name)[](source)[x.py](interpreter)[]\n(name)[A](source)[/tmp/a.py](interpreter)[]\n");
        assert_eq!(registry.entries(), &[entry_a()]);
        assert_eq!(registry.defects(), &[ParseDefect::EmptyName { line: 1 }]);
    }

    #[test]
    fn test_add_appends_line() {
        let (_dir, mut registry) = registry_with("# header\n");
        registry.add(entry_a()).unwrap();
        registry.add(Entry::new("B", "/tmp/b.py")).unwrap();

        assert_eq!(
            file_text(&registry),
            "# header\n(name)[A](source)[/tmp/a.py](interpreter)[]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n"
        );
        let names: Vec<_> = registry.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_add_terminates_unfinished_last_line() {
        let (_dir, mut registry) = registry_with("(name)[A](source)[/tmp/a.py](interpreter)[]");
        registry.add(Entry::new("B", "/tmp/b.py")).unwrap();
        assert_eq!(registry.entries().len(), 2);
        assert!(file_text(&registry).ends_with("[]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n"));
    }

    #[test]
    fn test_add_duplicate_leaves_file_unchanged() {
        let (_dir, mut registry) = registry_with(LINE_A);
        let before = file_text(&registry);

        let err = registry.add(Entry::new("A", "/tmp/other.py")).unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateName { ref name } if name == "A"));
        assert_eq!(file_text(&registry), before);
        assert_eq!(registry.entries(), &[entry_a()]);
    }

    #[test]
    fn test_add_rejects_empty_fields_and_reserved_characters() {
        let (_dir, mut registry) = registry_with(LINE_A);
        assert!(matches!(
            registry.add(Entry::new("", "/tmp/x.py")),
            Err(RegistryError::EmptyField { field: "name" })
        ));
        assert!(matches!(
            registry.add(Entry::new("X", "")),
            Err(RegistryError::EmptyField { field: "source" })
        ));
        assert!(matches!(
            registry.add(Entry::new("[X]", "/tmp/x.py")),
            Err(RegistryError::Codec(_))
        ));
        assert_eq!(file_text(&registry), LINE_A);
    }

    #[test]
    fn test_update_source_rewrites_only_that_field() {
        let (_dir, mut registry) = registry_with(LINE_A);

        assert!(registry.update_source(&entry_a(), "/tmp/b.py").unwrap());

        assert_eq!(file_text(&registry), "(name)[A](source)[/tmp/b.py](interpreter)[]\n");
        assert_eq!(registry.get("A").unwrap().source, PathBuf::from("/tmp/b.py"));
    }

    #[test]
    fn test_rewrite_keeps_crlf_line_endings() {
        let (_dir, mut registry) =
            registry_with("# header\r\n(name)[A](source)[/tmp/a.py](interpreter)[]\r\n");

        assert!(registry.update_source(&entry_a(), "/tmp/b.py").unwrap());
        assert_eq!(
            file_text(&registry),
            "# header\r\n(name)[A](source)[/tmp/b.py](interpreter)[]\r\n"
        );

        registry.add(Entry::new("B", "/tmp/c.py")).unwrap();
        assert_eq!(
            file_text(&registry),
            "# header\r\n(name)[A](source)[/tmp/b.py](interpreter)[]\r\n\
             (name)[B](source)[/tmp/c.py](interpreter)[]\r\n"
        );
        assert_eq!(registry.entries().len(), 2);
    }

    #[test]
    fn test_update_name_keeps_position_and_other_fields() {
        let (_dir, mut registry) = registry_with(
            "# scripts\n(name)[A](source)[/tmp/a.py](interpreter)[/opt/env/bin/python]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n",
        );

        assert!(registry.update_name(&entry_a(), "Alpha").unwrap());

        assert_eq!(
            file_text(&registry),
            "# scripts\n(name)[Alpha](source)[/tmp/a.py](interpreter)[/opt/env/bin/python]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n"
        );
        assert!(registry.contains("Alpha"));
        assert!(!registry.contains("A"));
    }

    #[test]
    fn test_update_name_rejects_empty_and_taken_names() {
        let (_dir, mut registry) =
            registry_with("(name)[A](source)[/tmp/a.py](interpreter)[]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n");
        let before = file_text(&registry);

        assert!(matches!(
            registry.update_name(&entry_a(), ""),
            Err(RegistryError::EmptyField { field: "name" })
        ));
        assert!(matches!(
            registry.update_name(&entry_a(), "B"),
            Err(RegistryError::DuplicateName { .. })
        ));
        assert_eq!(file_text(&registry), before);
    }

    #[test]
    fn test_update_with_stale_entry_is_a_no_op() {
        let (_dir, mut registry) = registry_with(LINE_A);
        let stale = Entry::new("Gone", "/tmp/gone.py");

        assert!(!registry.update_name(&stale, "Other").unwrap());
        assert!(!registry.update_source(&stale, "/tmp/x.py").unwrap());
        assert_eq!(file_text(&registry), LINE_A);
    }

    #[test]
    fn test_update_interpreter_and_reset_to_global() {
        let (_dir, mut registry) = registry_with(LINE_A);

        assert!(registry.update_interpreter(&entry_a(), "/opt/env/bin/python").unwrap());
        assert_eq!(
            file_text(&registry),
            "(name)[A](source)[/tmp/a.py](interpreter)[/opt/env/bin/python]\n"
        );

        assert!(registry.update_interpreter(&entry_a(), "None").unwrap());
        assert_eq!(file_text(&registry), LINE_A);

        assert!(matches!(
            registry.update_interpreter(&entry_a(), ""),
            Err(RegistryError::EmptyField { field: "interpreter" })
        ));
    }

    #[test]
    fn test_remove_then_load_never_yields_the_name() {
        let (_dir, mut registry) = registry_with(
            "(name)[A](source)[/tmp/a.py](interpreter)[]\n(name)[B](source)[/tmp/b.py](interpreter)[]\n(name)[A](source)[/tmp/dup.py](interpreter)[]\n",
        );

        assert!(registry.remove(&entry_a()).unwrap());
        registry.load().unwrap();

        assert!(registry.get("A").is_none());
        assert_eq!(file_text(&registry), "(name)[B](source)[/tmp/b.py](interpreter)[]\n");
    }

    #[test]
    fn test_remove_unknown_name_is_a_no_op() {
        let (_dir, mut registry) = registry_with(LINE_A);
        assert!(!registry.remove(&Entry::new("Nope", "/tmp/n.py")).unwrap());
        assert_eq!(file_text(&registry), LINE_A);
    }

    #[test]
    fn test_storage_failure_keeps_in_memory_state() {
        let (dir, mut registry) = registry_with(LINE_A);
        // Replace the data directory with a file so the atomic write cannot create its temp file.
        fs::remove_dir_all(dir.path()).unwrap();
        fs::write(dir.path(), "blocked").unwrap();

        let err = registry.add(Entry::new("B", "/tmp/b.py")).unwrap_err();

        assert!(matches!(err, RegistryError::Storage { .. }));
        assert_eq!(registry.entries(), &[entry_a()]);
        fs::remove_file(dir.path()).unwrap();
    }

    #[test]
    fn test_next_default_name() {
        let (_dir, mut registry) = registry_with(LINE_A);
        assert_eq!(registry.next_default_name(), "New Script");
        registry.add(Entry::new("New Script", "/tmp/n.py")).unwrap();
        assert_eq!(registry.next_default_name(), "New Script 2");
        registry.add(Entry::new("New Script 2", "/tmp/n.py")).unwrap();
        assert_eq!(registry.next_default_name(), "New Script 3");
    }
}
