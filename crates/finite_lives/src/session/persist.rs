use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::SessionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReadState {
    Missing,
    Unreadable(String),
    Present(SessionState),
}

#[derive(Debug, Error)]
pub enum SessionIoError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode session json for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A record that exists but does not decode is reported, not raised; the caller
/// decides whether to start over.
pub fn read_session(path: &Path) -> Result<SessionReadState, SessionIoError> {
    if !path.exists() {
        return Ok(SessionReadState::Missing);
    }

    let raw = fs::read_to_string(path).map_err(|source| SessionIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut deserializer = serde_json::Deserializer::from_str(&raw);
    match serde_path_to_error::deserialize::<_, SessionState>(&mut deserializer) {
        Ok(session) => Ok(SessionReadState::Present(session)),
        Err(error) => {
            let at = error.path().to_string();
            let source = error.into_inner();
            if at.is_empty() || at == "." {
                Ok(SessionReadState::Unreadable(format!("parse session json: {source}")))
            } else {
                Ok(SessionReadState::Unreadable(format!(
                    "parse session json at {at}: {source}"
                )))
            }
        }
    }
}

pub fn write_session_atomic(path: &Path, session: &SessionState) -> Result<(), SessionIoError> {
    let text = serde_json::to_string_pretty(session).map_err(|source| SessionIoError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_bytes_atomic(path, text.as_bytes()).map_err(|source| SessionIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let staged = staging_path(path);
    fs::write(&staged, bytes)?;
    swap_into_place(&staged, path).inspect_err(|_| {
        let _ = fs::remove_file(&staged);
    })
}

// Some hosts refuse to rename over an existing file, so the old record goes first.
fn swap_into_place(staged: &Path, path: &Path) -> io::Result<()> {
    if let Err(error) = fs::remove_file(path) {
        if error.kind() != io::ErrorKind::NotFound {
            return Err(error);
        }
    }
    fs::rename(staged, path)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(OsStr::new("session")));
    name.push(".saving");
    path.with_file_name(name)
}
