// src/core/codec.rs

//! Reader and writer for the registry's bracket markup.
//!
//! A record line has exactly this shape, with the three fields in fixed order:
//!
//! ```text
//! (name)[NAME](source)[SOURCE](interpreter)[INTERPRETER]
//! ```
//!
//! Lines that do not start with `(` (headers, comments, blank lines) are not records and
//! are carried through rewrites untouched.
//!
//! # Limitation
//!
//! The format has no escaping. A field value containing `[`, `]` or a newline cannot be
//! represented, so `encode` rejects such values instead of writing a line that would
//! read back differently. For every other value `decode(encode(e)) == e`.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::models::{Entry, normalize_interpreter};

lazy_static! {
    static ref RECORD_LINE: Regex = Regex::new(
        r"^\(name\)\[([^\[\]]*)\]\(source\)\[([^\[\]]*)\]\(interpreter\)\[([^\[\]]*)\]$"
    )
    .expect("record grammar must compile");
}

const RESERVED_CHARS: &[char] = &['[', ']', '\n', '\r'];

/// Errors raised while encoding an entry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// A field value would break the line grammar.
    #[error("The {field} value '{value}' contains '[', ']' or a line break, which the registry format cannot store.")]
    ReservedCharacter {
        /// `name`, `source` or `interpreter`.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// A recoverable problem with a single registry line. Decoding reports it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDefect {
    /// The line starts like a record but does not follow the grammar.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },
    /// The record has an empty NAME field; it is skipped.
    EmptyName {
        /// 1-based line number.
        line: usize,
    },
    /// The NAME was already used by an earlier line; the earlier entry wins.
    DuplicateName {
        /// 1-based line number of the skipped line.
        line: usize,
        /// The repeated name.
        name: String,
    },
}

impl fmt::Display for ParseDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDefect::Malformed { line, content } => {
                write!(f, "line {}: malformed entry '{}'", line, content)
            }
            ParseDefect::EmptyName { line } => {
                write!(f, "line {}: entry must have a name", line)
            }
            ParseDefect::DuplicateName { line, name } => {
                write!(f, "line {}: duplicate name '{}' (first occurrence kept)", line, name)
            }
        }
    }
}

/// The three fields of a record line exactly as written, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// NAME field.
    pub name: String,
    /// SOURCE field.
    pub source: String,
    /// INTERPRETER field, possibly empty or a sentinel.
    pub interpreter: String,
}

impl RawRecord {
    /// Writes the fields back as a record line terminated by `\n`.
    pub fn encode(&self) -> Result<String, CodecError> {
        encode_fields(&self.name, &self.source, &self.interpreter)
    }
}

/// Classification of one line of a registry file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace only.
    Blank,
    /// Not a record; preserved verbatim.
    Passthrough,
    /// A well-formed record line.
    Record(RawRecord),
    /// Starts with `(` but does not follow the grammar.
    Malformed,
}

/// Classifies a single line. Leading and trailing whitespace is ignored.
pub fn parse_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if !trimmed.starts_with('(') {
        return LineKind::Passthrough;
    }
    let Some(caps) = RECORD_LINE.captures(trimmed) else {
        return LineKind::Malformed;
    };
    let field = |n: usize| caps.get(n).map(|m| m.as_str().to_string()).unwrap_or_default();
    LineKind::Record(RawRecord {
        name: field(1),
        source: field(2),
        interpreter: field(3),
    })
}

/// Result of decoding a whole registry document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Decoded {
    /// Valid entries in file order, first occurrence of each name only.
    pub entries: Vec<Entry>,
    /// Problems found along the way, in line order.
    pub defects: Vec<ParseDefect>,
}

/// Decodes every record line of `text`.
///
/// Defects never abort decoding. An interpreter that does not point at an existing
/// file is treated as absent.
pub fn decode_document(text: &str) -> Decoded {
    let mut decoded = Decoded::default();
    let mut names = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let raw = match parse_line(line) {
            LineKind::Record(raw) => raw,
            LineKind::Malformed => {
                decoded.defects.push(ParseDefect::Malformed {
                    line: line_no,
                    content: line.trim().to_string(),
                });
                continue;
            }
            LineKind::Blank | LineKind::Passthrough => continue,
        };

        if raw.name.is_empty() {
            decoded.defects.push(ParseDefect::EmptyName { line: line_no });
            continue;
        }
        if !names.insert(raw.name.clone()) {
            decoded.defects.push(ParseDefect::DuplicateName {
                line: line_no,
                name: raw.name,
            });
            continue;
        }

        let interpreter = normalize_interpreter(&raw.interpreter).filter(|p| p.is_file());
        decoded.entries.push(Entry {
            name: raw.name,
            source: raw.source.into(),
            interpreter,
        });
    }

    decoded
}

/// Encodes an entry as a record line terminated by a single `\n`.
pub fn encode(entry: &Entry) -> Result<String, CodecError> {
    let interpreter = entry
        .interpreter
        .as_deref()
        .map(path_text)
        .unwrap_or_default();
    encode_fields(&entry.name, &path_text(&entry.source), &interpreter)
}

fn encode_fields(name: &str, source: &str, interpreter: &str) -> Result<String, CodecError> {
    check_field("name", name)?;
    check_field("source", source)?;
    check_field("interpreter", interpreter)?;
    Ok(format!(
        "(name)[{}](source)[{}](interpreter)[{}]\n",
        name, source, interpreter
    ))
}

fn check_field(field: &'static str, value: &str) -> Result<(), CodecError> {
    if value.contains(RESERVED_CHARS) {
        return Err(CodecError::ReservedCharacter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_single_record_without_interpreter() {
        let decoded = decode_document("(name)[A](source)[/tmp/a.py](interpreter)[]\n");
        assert!(decoded.defects.is_empty());
        assert_eq!(
            decoded.entries,
            vec![Entry {
                name: "A".to_string(),
                source: PathBuf::from("/tmp/a.py"),
                interpreter: None,
            }]
        );
    }

    #[test]
    fn test_header_lines_are_not_records() {
        let text = "# my scripts\n\n(name)[A](source)[a.py](interpreter)[]\nsome note\n";
        let decoded = decode_document(text);
        assert_eq!(decoded.entries.len(), 1);
        assert!(decoded.defects.is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let decoded = decode_document("   (name)[A](source)[a.py](interpreter)[]   \r\n");
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].name, "A");
    }

    #[test]
    fn test_empty_name_is_reported_and_skipped() {
        let text = "(name)[](source)[a.py](interpreter)[]\n(name)[B](source)[b.py](interpreter)[]\n";
        let decoded = decode_document(text);
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].name, "B");
        assert_eq!(decoded.defects, vec![ParseDefect::EmptyName { line: 1 }]);
    }

    #[test]
    fn test_duplicate_name_keeps_first_occurrence() {
        let text = "(name)[A](source)[first.py](interpreter)[]\n\
                    (name)[A](source)[second.py](interpreter)[]\n";
        let decoded = decode_document(text);
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].source, PathBuf::from("first.py"));
        assert_eq!(
            decoded.defects,
            vec![ParseDefect::DuplicateName {
                line: 2,
                name: "A".to_string()
            }]
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let text = "(name)[a](source)[a.py](interpreter)[]\n(name)[A](source)[b.py](interpreter)[]\n";
        assert_eq!(decode_document(text).entries.len(), 2);
    }

    #[test]
    fn test_malformed_record_does_not_abort() {
        let text = "(name)[A](source)[a.py]\n\
                    (source)[x.py](name)[X](interpreter)[]\n\
                    (name)[B](source)[b.py](interpreter)[]\n";
        let decoded = decode_document(text);
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.entries[0].name, "B");
        assert_eq!(decoded.defects.len(), 2);
        assert!(matches!(decoded.defects[0], ParseDefect::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_missing_interpreter_becomes_absent() {
        let text = "(name)[A](source)[a.py](interpreter)[/does/not/exist/bin/python]\n";
        let decoded = decode_document(text);
        assert_eq!(decoded.entries[0].interpreter, None);
        assert!(decoded.defects.is_empty());
    }

    #[test]
    fn test_existing_interpreter_is_kept() {
        let interp = NamedTempFile::new().unwrap();
        let text = format!(
            "(name)[A](source)[a.py](interpreter)[{}]\n",
            interp.path().display()
        );
        let decoded = decode_document(&text);
        assert_eq!(decoded.entries[0].interpreter.as_deref(), Some(interp.path()));
    }

    #[test]
    fn test_encode_renders_absent_interpreter_as_empty_brackets() {
        let line = encode(&Entry::new("A", "/tmp/a.py")).unwrap();
        assert_eq!(line, "(name)[A](source)[/tmp/a.py](interpreter)[]\n");
    }

    #[test]
    fn test_round_trip() {
        let interp = NamedTempFile::new().unwrap();
        let entries = [
            Entry::new("Plain", "/tmp/a.py"),
            Entry::new("With spaces & (parens)", "/home/me/my scripts/run.py"),
            Entry::new("Venv", "rel/b.py").with_interpreter(interp.path()),
        ];
        for entry in entries {
            let decoded = decode_document(&encode(&entry).unwrap());
            assert_eq!(decoded.entries, vec![entry]);
        }
    }

    #[test]
    fn test_encode_rejects_reserved_characters() {
        let err = encode(&Entry::new("bad]name", "a.py")).unwrap_err();
        assert_eq!(
            err,
            CodecError::ReservedCharacter {
                field: "name",
                value: "bad]name".to_string()
            }
        );
        assert!(encode(&Entry::new("two\nlines", "a.py")).is_err());
        assert!(encode(&Entry::new("ok", "/tmp/[x].py")).is_err());
    }
}
