//! Trial file names and output directory scanning

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// File name of trial `index`, e.g. `0003.zip`
pub fn trial_file_name(index: u32, width: usize, extension: &str) -> String {
    format!("{index:0width$}.{extension}")
}

/// Trial index encoded in a file name, if it follows [`trial_file_name`]
pub fn parse_trial_index(file_name: &str, width: usize, extension: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u32 = stem.parse().ok()?;
    // only the exact name the writer produces, so over-padded files never mask an index
    (trial_file_name(index, width, extension) == file_name).then_some(index)
}

/// Indices of the trial files already present in `root`
///
/// A missing directory has no trials.
pub fn existing_trials(root: &Path, width: usize, extension: &str) -> io::Result<BTreeSet<u32>> {
    let mut indices = BTreeSet::new();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(indices),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(index) = entry
            .file_name()
            .to_str()
            .and_then(|name| parse_trial_index(name, width, extension))
        {
            indices.insert(index);
        }
    }
    Ok(indices)
}

/// First index in `0..count` without a trial file
pub fn first_missing(existing: &BTreeSet<u32>, count: u32) -> Option<u32> {
    (0..count).find(|i| !existing.contains(i))
}

/// Delete a staging file left behind by an interrupted trial
///
/// Returns whether a file was removed.
pub fn remove_stale_temp(temp_path: &Path) -> io::Result<bool> {
    match fs::remove_file(temp_path) {
        Ok(()) => {
            log::warn!("Removed stale temp file {}", temp_path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_file_name() {
        assert_eq!(trial_file_name(3, 4, "zip"), "0003.zip");
        assert_eq!(trial_file_name(12345, 4, "zip"), "12345.zip");
    }

    #[test]
    fn test_parse_trial_index() {
        assert_eq!(parse_trial_index("0003.zip", 4, "zip"), Some(3));
        assert_eq!(parse_trial_index("12345.zip", 4, "zip"), Some(12345));
        assert_eq!(parse_trial_index("3.zip", 4, "zip"), None);
        assert_eq!(parse_trial_index("0003.tmp", 4, "zip"), None);
        assert_eq!(parse_trial_index("abcd.zip", 4, "zip"), None);
        assert_eq!(parse_trial_index("0003zip", 4, "zip"), None);
    }

    #[test]
    fn test_over_padded_name_is_not_a_trial() {
        assert_eq!(parse_trial_index("00003.zip", 4, "zip"), None);
        assert_eq!(parse_trial_index("012345.zip", 4, "zip"), None);

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("00003.zip"), b"").unwrap();
        let existing = existing_trials(dir.path(), 4, "zip").unwrap();
        assert!(existing.is_empty());
        assert_eq!(first_missing(&existing, 5), Some(0));
    }

    #[test]
    fn test_existing_trials_and_first_missing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0000.zip", "0001.zip", "0003.zip", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("0002.zip")).unwrap();

        let existing = existing_trials(dir.path(), 4, "zip").unwrap();
        assert_eq!(existing.iter().copied().collect::<Vec<_>>(), [0, 1, 3]);
        assert_eq!(first_missing(&existing, 5), Some(2));
        assert_eq!(first_missing(&existing, 2), None);
    }

    #[test]
    fn test_existing_trials_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let existing = existing_trials(&dir.path().join("absent"), 4, "zip").unwrap();
        assert!(existing.is_empty());
    }

    #[test]
    fn test_remove_stale_temp() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp.zip");
        assert!(!remove_stale_temp(&temp).unwrap());
        fs::write(&temp, b"partial").unwrap();
        assert!(remove_stale_temp(&temp).unwrap());
        assert!(!temp.exists());
    }
}
