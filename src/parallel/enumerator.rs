//! Producer stage: file names in, work items out

use std::path::Path;
use std::sync::Arc;

use crossbeam::channel::Sender;
use tracing::{debug, warn};

use super::{BatchJob, WorkItem};

/// Queue one `WorkItem` per file name, in list order.
///
/// Blocks while the work queue is full. The queue is left open; the
/// orchestrator closes it once this stage has been joined. Returns the
/// number of items queued, which is short of the file count only if every
/// worker has already gone away.
pub(crate) fn enumerate(job: &BatchJob, jobs: Sender<WorkItem>) -> usize {
    let source_dir: Arc<Path> = Arc::from(job.source_dir.as_path());
    let dest_dir: Arc<Path> = Arc::from(job.dest_dir.as_path());

    let mut queued = 0;
    for file in &job.files {
        let item = WorkItem {
            source_file_name: file.clone(),
            source_dir: Arc::clone(&source_dir),
            dest_dir: Arc::clone(&dest_dir),
            target_width: job.target_width,
            target_height: job.target_height,
        };
        if jobs.send(item).is_err() {
            warn!("Work queue disconnected after {} of {} items", queued, job.files.len());
            break;
        }
        queued += 1;
    }

    debug!("Enumerator done, {} items queued", queued);
    queued
}
