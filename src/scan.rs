//! Collect part declarations from a directory of config files.
//!
//! Every file is parsed independently. A file that fails to parse, or a
//! part that fails to load, is recorded in the report with its typed error
//! and the scan moves on; nothing is dropped silently.

use crate::node::{ConfigNode, ParseError};
use crate::object::parts::PART_TAG;
use crate::object::{ChildrenSnapshot, NamedObject, Part, Resource, TypeError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("parts directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to walk parts directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why a single file contributed no (or fewer) parts.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid part: {0}")]
    Type(#[from] TypeError),
}

#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: FileError,
}

/// A `PART` declaration with its resources snapshot.
#[derive(Debug, Clone)]
pub struct PartRecord {
    pub path: PathBuf,
    pub part: Part,
    pub resources: ChildrenSnapshot<Resource>,
}

impl PartRecord {
    pub fn from_node(path: impl Into<PathBuf>, node: ConfigNode) -> Result<Self, TypeError> {
        let part = Part::load(node)?;
        let resources = part.resources()?;
        Ok(Self {
            path: path.into(),
            part,
            resources,
        })
    }

    /// The part's `name`, validated at load.
    pub fn name(&self) -> &str {
        self.part.name().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: usize,
    pub parts: Vec<PartRecord>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn failure_for(&self, path: &Path) -> Option<&FileError> {
        self.failures
            .iter()
            .find(|f| f.path == path)
            .map(|f| &f.error)
    }
}

/// Files under `dir` whose extension is `extension`, sorted by path.
pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::MissingDirectory(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some(extension)
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every matching file and collect its top-level `PART` blocks.
///
/// Patch blocks such as `@PART[...]` are not declarations and are ignored.
pub fn scan_parts(dir: &Path, extension: &str) -> Result<ScanReport, ScanError> {
    let mut report = ScanReport::default();

    for path in find_files(dir, extension)? {
        report.files += 1;
        let root = match ConfigNode::load(&path) {
            Ok(root) => root,
            Err(err) => {
                warn!(path = %path.display(), "skipping file: {err}");
                report.failures.push(ScanFailure {
                    path,
                    error: err.into(),
                });
                continue;
            }
        };

        let mut found = 0;
        for node in root.into_children() {
            if node.name() != PART_TAG || node.prefix().is_some() {
                continue;
            }
            match PartRecord::from_node(&path, node) {
                Ok(record) => {
                    found += 1;
                    report.parts.push(record);
                }
                Err(err) => {
                    warn!(path = %path.display(), "skipping part: {err}");
                    report.failures.push(ScanFailure {
                        path: path.clone(),
                        error: err.into(),
                    });
                }
            }
        }
        debug!(path = %path.display(), parts = found, "scanned");
    }

    Ok(report)
}
