//! Conversion error types
//!
//! Every failure is fatal: the conversion is a deterministic pass over a fixed
//! file, so retrying without changing the input reproduces the same error.
//!
//! - **`ConvertError`** - A typed enum for domain errors that can be
//!   pattern-matched and tested. Use `.into()` to convert to `anyhow::Error`
//!   while preserving the type for `downcast_ref`.
//!
//! # Usage
//!
//! ```ignore
//! return Err(ConvertError::InputNotFound { path: path.to_path_buf() }.into());
//!
//! if let Some(ConvertError::Decode { line, .. }) = err.downcast_ref() {
//!     println!("Bad record on line {line}");
//! }
//! ```

use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConvertError {
    // Input errors
    InputNotFound {
        path: PathBuf,
    },
    Read {
        path: PathBuf,
        error: io::Error,
    },
    Decode {
        path: PathBuf,
        line: usize,
        message: String,
    },

    // Output errors
    Create {
        path: PathBuf,
        error: io::Error,
    },
    Write {
        path: PathBuf,
        error: io::Error,
    },
}

impl ConvertError {
    /// The file the error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            ConvertError::InputNotFound { path }
            | ConvertError::Read { path, .. }
            | ConvertError::Decode { path, .. }
            | ConvertError::Create { path, .. }
            | ConvertError::Write { path, .. } => path,
        }
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::InputNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            ConvertError::Read { path, error } => {
                write!(
                    f,
                    "Failed to read build operation trace file {}: {error}",
                    path.display()
                )
            }
            ConvertError::Decode {
                path,
                line,
                message,
            } => {
                write!(
                    f,
                    "Malformed build operation record at {}:{line}: {message}",
                    path.display()
                )
            }
            ConvertError::Create { path, error } => {
                write!(f, "Failed to create {}: {error}", path.display())
            }
            ConvertError::Write { path, error } => {
                write!(f, "Failed to write {}: {error}", path.display())
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Read { error, .. }
            | ConvertError::Create { error, .. }
            | ConvertError::Write { error, .. } => Some(error),
            ConvertError::InputNotFound { .. } | ConvertError::Decode { .. } => None,
        }
    }
}
