use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the load/report pipeline.
///
/// Nothing below `main` catches these: every failure aborts the remaining
/// pipeline and propagates unchanged. A statement that already committed
/// stays committed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The first record of a batch matches neither the Room nor the Student
    /// field pattern.
    #[error("data format not recognized as room or student")]
    UnrecognizedShape,

    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid JSON in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Connection acquisition or any DDL/DML statement failure.
    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
