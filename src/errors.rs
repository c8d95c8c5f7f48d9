use std::{fmt, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// What the scaffolder was doing to a path when the filesystem refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Mkdir,
    /// Looking up whether the target already exists.
    Metadata,
    /// Undoing a partial scaffold.
    Remove,
    CurrentDir,
}
impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Mkdir => "create directory",
            Self::Metadata => "check for existing path",
            Self::Remove => "remove",
            Self::CurrentDir => "resolve current directory",
        };
        f.write_str(verb)
    }
}

/// A filesystem failure, carrying the path and the OS reason in its one-line message.
#[derive(Debug, Error, Diagnostic)]
#[error("could not {operation} '{}': {source}", .path.display())]
#[diagnostic(
    code(create_backend_app::io),
    help("Check file permissions, disk space, or that the path is correct.")
)]
pub struct IoError {
    pub operation: FileOperation,
    pub path: PathBuf,
    pub source: std::io::Error,
}
impl IoError {
    pub fn new(operation: FileOperation, path: PathBuf, error: std::io::Error) -> Self {
        Self {
            operation,
            path,
            source: error,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("invalid scaffold config '{}': {source}", .path.display())]
#[diagnostic(
    code(create_backend_app::config::parse),
    help("Only the [features] and [defaults] tables are recognised")
)]
pub struct ConfigParseError {
    pub path: PathBuf,
    pub source: toml::de::Error,
}
