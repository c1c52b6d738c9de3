//! Writer error types

use std::io;

use thiserror::Error;

/// Errors from writing or reading trial files
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// `write_static` was called a second time
    #[error("static section already written")]
    StaticAlreadyWritten,
    /// Frames must be appended with contiguous indices starting at 0
    #[error("frame {got} appended out of order (expected {expected})")]
    FrameOutOfOrder { expected: u32, got: u32 },
    /// `finalize` was called before `write_static`
    #[error("cannot finalize a trial without its static section")]
    MissingStatic,
    #[error("no dataset at '{0}'")]
    MissingEntry(String),
    #[error("invalid array: {0}")]
    InvalidArray(String),
}
