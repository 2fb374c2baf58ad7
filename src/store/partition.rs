//! Partition file operations
//!
//! Every read and write of a type's flat file goes through here. The store
//! never edits a file in place: inserts append one framed line, all other
//! mutations rewrite the whole file through a scratch file and rename.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{FlatError, Result};

use super::DATA_FILENAME;

/// Suffix of the scratch file used during atomic rewrites
const SCRATCH_SUFFIX: &str = ".tmp";

/// Flat-file access for type partitions under one base directory
pub struct TypeStore {
    /// Base directory holding one subdirectory per type
    root: PathBuf,

    /// Written after every encoded record: delimiter + newline
    terminator: String,
}

impl TypeStore {
    pub fn new(root: impl Into<PathBuf>, delimiter: &str) -> Self {
        Self {
            root: root.into(),
            terminator: format!("{}\n", delimiter),
        }
    }

    /// Path of the data file for a type, with the tag validated as a safe
    /// single path component.
    pub fn partition_path(&self, type_tag: &str) -> Result<PathBuf> {
        validate_type_tag(type_tag)?;
        Ok(self.root.join(type_tag).join(DATA_FILENAME))
    }

    /// Create the partition directory and an empty data file if missing.
    /// No error if both already exist.
    pub fn ensure_file(&self, type_tag: &str) -> Result<PathBuf> {
        let path = self.partition_path(type_tag)?;
        if !path.exists() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            File::create(&path)?;
        }
        Ok(path)
    }

    /// Read the whole partition and split it into candidate lines.
    ///
    /// Splits on `delimiter + newline` and discards empty fragments,
    /// notably the trailing fragment after the last terminator. Fragments
    /// are returned raw; decoding is the codec's job.
    pub fn read_all(&self, type_tag: &str) -> Result<Vec<String>> {
        let path = self.ensure_file(type_tag)?;
        let contents = fs::read_to_string(&path)?;
        Ok(contents
            .split(self.terminator.as_str())
            .filter(|fragment| !fragment.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Append one encoded record to the partition file.
    pub fn append_line(&self, type_tag: &str, line: &str) -> Result<()> {
        let path = self.ensure_file(type_tag)?;
        let mut file = OpenOptions::new().append(true).open(&path).map_err(|e| {
            FlatError::Write(format!("open {} for append: {}", path.display(), e))
        })?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(self.terminator.as_bytes()))
            .map_err(|e| FlatError::Write(format!("append to {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Replace the partition contents with the given lines.
    ///
    /// Writes to a scratch file in the same directory and renames it over
    /// the data file, so a failed rewrite never leaves a half-written
    /// partition behind. Line order carries no meaning beyond rebuilding
    /// the id mapping.
    pub fn rewrite_all(&self, type_tag: &str, lines: &[String]) -> Result<()> {
        let path = self.ensure_file(type_tag)?;
        let scratch = path.with_file_name(format!("{}{}", DATA_FILENAME, SCRATCH_SUFFIX));

        let mut buffer = String::new();
        for line in lines {
            buffer.push_str(line);
            buffer.push_str(&self.terminator);
        }

        fs::write(&scratch, buffer.as_bytes()).map_err(|e| {
            FlatError::Write(format!("write scratch {}: {}", scratch.display(), e))
        })?;
        fs::rename(&scratch, &path).map_err(|e| {
            FlatError::Write(format!(
                "rename {} over {}: {}",
                scratch.display(),
                path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Base directory holding all partitions
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A type tag becomes a directory name; anything that could resolve
/// outside the base path is rejected.
fn validate_type_tag(type_tag: &str) -> Result<()> {
    let hostile = type_tag.is_empty()
        || type_tag == "."
        || type_tag == ".."
        || type_tag.contains('/')
        || type_tag.contains('\\')
        || type_tag.contains('\0');
    if hostile {
        return Err(FlatError::Validation(format!(
            "invalid type tag {:?}",
            type_tag
        )));
    }
    Ok(())
}
