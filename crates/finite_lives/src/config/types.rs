use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line={}, column={}", self.line, self.column)
    }
}

/// Fragment of a config source that was tolerated rather than applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseNoteKind {
    NestedChapter,
    DuplicateChapter,
    MissingChapterName,
    LevelOutsideChapter,
    NestedLevel,
    MissingLevelAttribute,
    /// The level was kept with zero lives.
    InvalidLives,
    /// Nothing after this point of the source was read.
    MalformedXml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNote {
    pub kind: ParseNoteKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub source_name: String,
    pub chapters_added: Vec<String>,
    pub notes: Vec<ParseNote>,
}

impl ParseReport {
    pub fn has_note(&self, kind: ParseNoteKind) -> bool {
        self.notes.iter().any(|note| note.kind == kind)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML in {source_name} ({location}): {message}")]
    XmlMalformed {
        source_name: String,
        message: String,
        location: SourceLocation,
    },
}
