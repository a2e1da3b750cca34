// src/core/commons.rs

//! Small filesystem helpers shared by the registry, the counter and bootstrap.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces the contents of `path` with `contents` in one step.
///
/// The new contents are written to a temporary file in the same directory and then
/// renamed over the target, so readers see either the old file or the new one, never a
/// truncated mix. An existing target keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    // Temp files are created 0600; without this the first rewrite would narrow the mode.
    match fs::metadata(path) {
        Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Splits `content` into lines, each paired with the terminator it ended with:
/// `"\r\n"`, `"\n"`, or `""` for an unterminated last line.
pub fn lines_with_endings(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.split_inclusive('\n').map(|chunk| {
        if let Some(body) = chunk.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = chunk.strip_suffix('\n') {
            (body, "\n")
        } else {
            (chunk, "")
        }
    })
}

/// The line ending `content` already uses, judged by its first terminated line.
/// `"\n"` for text without any.
pub fn line_ending(content: &str) -> &'static str {
    match lines_with_endings(content).map(|(_, ending)| ending).find(|e| !e.is_empty()) {
        Some("\r\n") => "\r\n",
        _ => "\n",
    }
}

/// Reads a file that is allowed to be missing. `Ok(None)` means it does not exist.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
