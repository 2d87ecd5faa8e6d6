/// Crate-level error types for appearance-patch diagnostics.
use std::path::PathBuf;

/// Every error names the file or pattern involved so a failed run can be
/// diagnosed from the printed trail alone.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backup copy does not hash to the same digest as its source.
    #[error("backup mismatch: {} differs from {}", backup.display(), original.display())]
    BackupMismatch {
        /// The freshly written backup file.
        backup: PathBuf,
        /// The file that was copied.
        original: PathBuf,
    },

    /// The target document does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// A text pattern failed to compile.
    #[error("pattern: {0}")]
    Pattern(
        /// The wrapped regex error.
        #[from]
        regex::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
