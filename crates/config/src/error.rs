//! Error types for configuration loading, saving and validation.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// A required field is absent.
    Missing,
    /// A field has the wrong JSON type.
    WrongType,
    /// A numeric field is outside its allowed range.
    OutOfRange,
    /// A field has the right type but an unusable value.
    Invalid,
    /// A value repeats where it must be unique.
    Duplicate,
}

/// A structural or semantic violation in a camera binding or document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Camera slot the failure belongs to, when known.
    pub slot: Option<u8>,
    /// Name of the offending field as it appears in the file.
    pub field: &'static str,
    /// Failure category.
    pub kind: ValidationKind,
    /// Human-readable diagnostic.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(
        slot: Option<u8>,
        field: &'static str,
        kind: ValidationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            slot,
            field,
            kind,
            message: message.into(),
        }
    }

    /// Render a one-line message naming the slot and field.
    pub fn pretty(&self) -> String {
        match self.slot {
            Some(n) => format!("camera №{n}, field `{}`: {}", self.field, self.message),
            None => format!("field `{}`: {}", self.field, self.message),
        }
    }
}

#[derive(Debug, Error, Clone)]
/// Errors produced by the configuration layer.
pub enum Error {
    #[error("invalid argument: {0}")]
    /// A primitive argument was malformed or out of range.
    InvalidArgument(String),
    #[error(transparent)]
    /// Stored or supplied data violates a binding or document invariant.
    Validation(#[from] ValidationError),
    #[error("configuration file {} does not exist", path.display())]
    /// The configuration file is absent.
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    #[error("{message}")]
    /// I/O error while reading the file.
    Read {
        /// File being read.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// The file is not a JSON document of the expected shape.
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// I/O error while writing the file.
    Write {
        /// File being written.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including the path when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::InvalidArgument(msg) => format!("Invalid argument: {msg}"),
            Self::Validation(v) => format!("Config validation error: {}", v.pretty()),
            Self::NotFound { path } => format!("Config file not found: {}", path.display()),
            Self::Read { path, message } => {
                format!("Read error at {}: {}", path.display(), message)
            }
            Self::Parse { path, message } => {
                format!("Config parse error at {}: {}", path.display(), message)
            }
            Self::Write { path, message } => {
                format!("Write error at {}: {}", path.display(), message)
            }
        }
    }

    /// Access the path attached to this error, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Write { path, .. } => Some(path),
            Self::InvalidArgument(_) | Self::Validation(_) => None,
        }
    }
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;
