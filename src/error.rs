use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a flame graph build.
#[derive(Debug, Error)]
pub enum FlameError {
    #[error("no input samples")]
    EmptyInput,

    #[error("no stack counts found")]
    NoValidFrames,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A frame was closed without ever having been opened.
    #[error("missing start time for frame {name:?} at depth {depth}")]
    CorruptMerge { name: String, depth: usize },

    #[error("failed to access {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is a perf.data file; collapse it to folded stacks first", path.display())]
    UnsupportedInput { path: PathBuf },
}

impl FlameError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FlameError::IoFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlameError>;
