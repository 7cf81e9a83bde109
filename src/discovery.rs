//! Input file discovery

use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::{Result, ScalerError};

/// List the names of regular files in `input` ending with `extension`.
///
/// Subdirectories are ignored and the match is a plain, case-sensitive
/// suffix test. Names are sorted so enumeration order is reproducible.
pub async fn discover_files(input: &Path, extension: &str) -> Result<Vec<String>> {
    let listing_failed = |source: std::io::Error| ScalerError::InputDirectory {
        path: input.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(input).await.map_err(listing_failed)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(listing_failed)? {
        let file_type = entry.file_type().await.map_err(listing_failed)?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str() {
            Some(name) if name.ends_with(extension) => files.push(name.to_string()),
            Some(_) => {}
            None => debug!("Skipping non UTF-8 file name {:?}", name),
        }
    }

    files.sort();
    debug!("Discovered {} '{}' files in {:?}", files.len(), extension, input);
    Ok(files)
}
