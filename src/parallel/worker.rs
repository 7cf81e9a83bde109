//! Transform pool workers

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::channel::{Receiver, Sender};
use serde::Serialize;
use tracing::{debug, warn};

use super::{CompletionRecord, ProgressCounters, WorkItem};
use crate::error::Result;
use crate::processing::ImageTransformer;

/// What one worker did before its queue closed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub id: usize,
    pub processed: usize,
    pub skipped: usize,
}

/// Decode, resize, encode and write one item
pub fn process_item(item: &WorkItem, transformer: &ImageTransformer) -> Result<CompletionRecord> {
    let dest_path = item.dest_path();
    let (width, height) = transformer.transform(
        &item.source_path(),
        &dest_path,
        item.target_width,
        item.target_height,
    )?;

    Ok(CompletionRecord {
        dest_path,
        source_file_name: item.source_file_name.clone(),
        width,
        height,
    })
}

/// Pull items until the work queue is closed and empty.
///
/// Failed items are skipped without retry; only successes are sent on.
pub(crate) fn run_worker(
    id: usize,
    jobs: Receiver<WorkItem>,
    done: Sender<CompletionRecord>,
    transformer: &ImageTransformer,
    counters: &ProgressCounters,
    active: &AtomicUsize,
) -> WorkerReport {
    debug!("Worker {} started", id);
    let mut report = WorkerReport {
        id,
        ..WorkerReport::default()
    };

    for item in jobs.iter() {
        match process_item(&item, transformer) {
            Ok(record) => {
                if done.send(record).is_err() {
                    warn!("Worker {}: completion queue disconnected", id);
                    break;
                }
                report.processed += 1;
            }
            Err(e) => {
                counters.record_skipped();
                report.skipped += 1;
                warn!("Skipping {} ({}): {}", item.source_file_name, e.skip_reason(), e);
            }
        }
    }

    let still_active = active.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
    debug!(
        "Worker {} exiting ({} processed, {} skipped), {} still active",
        id, report.processed, report.skipped, still_active
    );
    report
}
