//! Read access to finished trial files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::error::WriterError;
use crate::npy::NpyArray;

/// Random access to the groups and datasets of one trial file
pub struct DatasetReader {
    archive: ZipArchive<File>,
}

impl DatasetReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WriterError> {
        let file = File::open(path)?;
        Ok(Self {
            archive: ZipArchive::new(file)?,
        })
    }

    /// Every entry name, groups included (with a trailing `/`)
    pub fn entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.archive.file_names().map(str::to_owned).collect();
        names.sort();
        names
    }

    pub fn has_group(&self, path: &str) -> bool {
        let dir = format!("{}/", path.trim_end_matches('/'));
        self.archive.file_names().any(|name| name == dir)
    }

    /// Names of the frame groups, in index order
    pub fn frame_names(&self) -> Vec<String> {
        let mut frames: Vec<String> = self
            .archive
            .file_names()
            .filter_map(|name| name.strip_prefix("frames/"))
            .filter_map(|rest| rest.strip_suffix('/'))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_owned)
            .collect();
        frames.sort();
        frames
    }

    pub fn frame_count(&self) -> usize {
        self.frame_names().len()
    }

    /// Read and parse one dataset
    pub fn read_array(&mut self, path: &str) -> Result<NpyArray, WriterError> {
        let mut entry = self
            .archive
            .by_name(path)
            .map_err(|_| WriterError::MissingEntry(path.to_string()))?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        NpyArray::parse(&bytes)
    }
}
