//! Artifact cache error types.

/// Kinds of cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Failed to create the week directory
    #[display("Failed to create cache directory {}: {}", path, message)]
    DirectoryCreation {
        /// Directory path
        path: String,
        /// I/O error message
        message: String,
    },
    /// Failed to write an artifact
    #[display("Failed to write {}: {}", path, message)]
    FileWrite {
        /// Artifact path
        path: String,
        /// I/O error message
        message: String,
    },
    /// Failed to serialize an artifact
    #[display("Failed to serialize {}: {}", path, message)]
    Serialize {
        /// Artifact path
        path: String,
        /// Serializer message
        message: String,
    },
}

/// Cache error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
