//! Dataset output for trialgen
//!
//! One file per trial, written at a staging path and renamed into the
//! dataset's zero-padded sequence once complete.
//!
//! - [`DatasetWriter`] - static section plus one group per frame
//! - [`DatasetReader`] - read back groups and arrays of a finished file
//! - [`NpyArray`] - array blobs stored in the archive
//! - [`naming`] - trial file names, resume scanning and stale temp removal

mod error;
pub mod naming;
mod npy;
mod reader;
mod writer;

pub use error::WriterError;
pub use naming::{
    existing_trials, first_missing, parse_trial_index, remove_stale_temp, trial_file_name,
};
pub use npy::{Dtype, NpyArray};
pub use reader::DatasetReader;
pub use writer::{DatasetWriter, FRAME_INDEX_WIDTH};
