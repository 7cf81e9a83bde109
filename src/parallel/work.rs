//! Items flowing through the pipeline queues

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a run needs besides the pool configuration
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Eligible file names, in enumeration order
    pub files: Vec<String>,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
}

impl BatchJob {
    pub fn new(
        files: Vec<String>,
        source_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        Self {
            files,
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            target_width,
            target_height,
        }
    }
}

/// One source file to be resized; consumed by exactly one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source_file_name: String,
    pub source_dir: Arc<Path>,
    pub dest_dir: Arc<Path>,
    pub target_width: u32,
    pub target_height: u32,
}

impl WorkItem {
    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.source_file_name)
    }

    /// Outputs keep the source file name
    pub fn dest_path(&self) -> PathBuf {
        self.dest_dir.join(&self.source_file_name)
    }
}

/// Emitted by a worker after it has written the output file.
///
/// Records only exist for bytes already on disk, so the reporter never
/// announces a file that has not been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub dest_path: PathBuf,
    pub source_file_name: String,
    pub width: u32,
    pub height: u32,
}
