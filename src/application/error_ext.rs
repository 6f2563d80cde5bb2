//! Error conversion helpers for I/O and JSON results
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.write(&target, &json)
    ///     .with_path_context("write record", &target)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Mark the error as a failure to read an input file.
    fn with_read_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_read_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Extension trait for attaching the file to JSON errors.
pub trait JsonResultExt<T> {
    /// Decoding `path` failed.
    fn with_json_context(self, path: &Path) -> ApplicationResult<T>;

    /// Encoding a record bound for `path` failed.
    fn with_serialize_context(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> JsonResultExt<T> for serde_json::Result<T> {
    fn with_json_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn with_serialize_context(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize record: {}", path.display()),
            source: Box::new(e),
        })
    }
}
