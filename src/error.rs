use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ErrorKind>;

#[derive(Error, Debug)]
pub enum ScrubError {
    #[error("unable to read root directory {}: {source}", root.display())]
    Discovery { root: PathBuf, source: std::io::Error },

    #[error("root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("io error: {}", .0)]
    Io(#[from]std::io::Error),

    #[error("writing failed: {}", .0)]
    Write(std::io::Error),

    #[error("unable to walk directory: {}", .0)]
    Walkdir(#[from]walkdir::Error),

    #[error("deserializing failed: {}", .0)]
    Serde(#[from]serde_json::Error),

    #[error("manifest is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("\"{section}\" is not an object (found {found})")]
    InvalidSection { section: &'static str, found: &'static str },
}
