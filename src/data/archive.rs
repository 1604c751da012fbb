// ============================================================
// Layer 4 — Archive Extractor
// ============================================================
// Pulls the tabular dataset out of a .csv.zip archive.
//
// How extraction works:
//   1. Open the archive (corrupt/unreadable → ExtractionError::Open)
//   2. Walk the entries in their stored (central directory) order
//   3. Pick the FIRST file entry whose name ends in ".csv",
//      compared case-insensitively
//   4. No match → fail before any temp file exists
//   5. Otherwise allocate a fresh temp file and stream the entry's
//      decompressed bytes into it verbatim
//
// The returned ExtractedDataset owns the temp file. The caller
// decides when it goes away: `remove()` deletes it and reports
// I/O errors; dropping it deletes it silently. Every extraction
// gets its own uniquely named file.
//
// Reference: zip crate documentation (ZipArchive, by_index_raw)
//            tempfile crate documentation (NamedTempFile, TempPath)

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::TempPath;
use zip::{result::ZipError, ZipArchive};

use crate::domain::error::ExtractionError;

/// Suffix of the tabular file looked for inside each archive
pub const DEFAULT_TABULAR_SUFFIX: &str = ".csv";

/// Extracts exactly one tabular file from a compressed archive.
/// Holds configuration only, no state between calls.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    /// Entry name suffix to match, e.g. ".csv"
    suffix: String,

    /// Directory where temp files are allocated
    work_dir: PathBuf,
}

impl ArchiveExtractor {
    /// Create an extractor that writes temp files into `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            suffix:   DEFAULT_TABULAR_SUFFIX.to_string(),
            work_dir: work_dir.into(),
        }
    }

    /// Match a different tabular suffix (e.g. ".tsv")
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Extract the first matching entry of `archive_path` to a new temp file.
    pub fn extract(&self, archive_path: &Path) -> Result<ExtractedDataset, ExtractionError> {
        let open_err = |source: ZipError| ExtractionError::Open {
            path: archive_path.to_path_buf(),
            source,
        };

        let file = File::open(archive_path).map_err(|e| open_err(ZipError::Io(e)))?;
        let mut archive = ZipArchive::new(file).map_err(open_err)?;

        // Select the entry before touching the filesystem
        let index = self.find_tabular_entry(&mut archive, archive_path)?;

        let mut entry = archive
            .by_index(index)
            .map_err(|source| ExtractionError::Entry {
                path: archive_path.to_path_buf(),
                index,
                source,
            })?;
        let entry_name = entry.name().to_string();

        let temp = tempfile::Builder::new()
            .prefix("dataset-")
            .suffix(self.suffix.as_str())
            .tempfile_in(&self.work_dir)
            .map_err(|source| ExtractionError::TempFile {
                dir: self.work_dir.clone(),
                source,
            })?;

        // From here on the TempPath deletes the file if the copy fails
        let (mut output, path) = temp.into_parts();

        let copy_err = |source: io::Error| ExtractionError::Copy {
            path:  archive_path.to_path_buf(),
            entry: entry_name.clone(),
            source,
        };
        let bytes = io::copy(&mut entry, &mut output).map_err(copy_err)?;
        output.flush().map_err(copy_err)?;
        drop(output);

        tracing::debug!(
            archive = %archive_path.display(),
            entry   = %entry_name,
            bytes,
            temp    = %path.display(),
            "Extracted dataset entry"
        );

        Ok(ExtractedDataset { path, entry_name, bytes })
    }

    /// Index of the first non-directory entry whose name ends in the suffix
    fn find_tabular_entry(
        &self,
        archive:      &mut ZipArchive<File>,
        archive_path: &Path,
    ) -> Result<usize, ExtractionError> {
        for index in 0..archive.len() {
            // by_index_raw reads the header only, no decompression
            let entry = archive
                .by_index_raw(index)
                .map_err(|source| ExtractionError::Entry {
                    path: archive_path.to_path_buf(),
                    index,
                    source,
                })?;

            if !entry.is_dir() && ends_with_ignore_case(entry.name(), &self.suffix) {
                return Ok(index);
            }
        }

        Err(ExtractionError::NoTabularEntry {
            path:   archive_path.to_path_buf(),
            suffix: self.suffix.clone(),
        })
    }
}

/// ASCII case-insensitive `str::ends_with`
fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    let (name, suffix) = (name.as_bytes(), suffix.as_bytes());
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// A decompressed dataset sitting in a temp file.
#[derive(Debug)]
pub struct ExtractedDataset {
    path:       TempPath,
    entry_name: String,
    bytes:      u64,
}

impl ExtractedDataset {
    /// Location of the flat tabular file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the archive entry this file came from
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Number of bytes written
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Delete the temp file, reporting any I/O error
    pub fn remove(self) -> io::Result<()> {
        self.path.close()
    }
}
