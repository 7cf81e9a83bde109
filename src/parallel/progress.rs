//! Progress tracking for the reporter stage

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, select, tick, Receiver};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::{CompletionRecord, RunSummary};

const ETA_UNKNOWN: u64 = u64::MAX;

/// Run-wide counters shared by workers, the reporter and the ETA ticker.
///
/// `processed` is only written by the reporter, `skipped` only by
/// workers and the ETA only by the ticker. Every field is atomic, so the
/// ticker can read `processed` while the reporter advances it.
#[derive(Debug)]
pub struct ProgressCounters {
    total_eligible: usize,
    processed: AtomicUsize,
    skipped: AtomicUsize,
    eta_millis: AtomicU64,
    started_at: Instant,
}

impl ProgressCounters {
    pub fn new(total_eligible: usize) -> Self {
        Self {
            total_eligible,
            processed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            eta_millis: AtomicU64::new(ETA_UNKNOWN),
            started_at: Instant::now(),
        }
    }

    pub fn total_eligible(&self) -> usize {
        self.total_eligible
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Acquire)
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Count one completed item, returning the new processed count
    pub(crate) fn record_processed(&self) -> usize {
        let processed = self.processed.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(processed <= self.total_eligible);
        processed
    }

    /// Count one dropped item, returning the new skipped count
    pub(crate) fn record_skipped(&self) -> usize {
        self.skipped.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Recompute the estimate from the current throughput
    pub fn refresh_eta(&self) -> Option<Duration> {
        let eta = estimate_remaining(self.elapsed(), self.processed(), self.total_eligible);
        let millis = eta.map_or(ETA_UNKNOWN, |d| d.as_millis().min(u128::from(ETA_UNKNOWN - 1)) as u64);
        self.eta_millis.store(millis, Ordering::Release);
        eta
    }

    /// Estimate published by the last refresh
    pub fn eta(&self) -> Option<Duration> {
        match self.eta_millis.load(Ordering::Acquire) {
            ETA_UNKNOWN => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }

    pub fn snapshot(&self, processed: usize) -> ProgressSnapshot {
        ProgressSnapshot {
            processed,
            total: self.total_eligible,
            percent: percent_complete(processed, self.total_eligible),
            eta: self.eta(),
            elapsed: self.elapsed(),
        }
    }
}

/// `processed / total * 100`, or 0 for an empty run
pub fn percent_complete(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    processed as f64 * 100.0 / total as f64
}

/// `(elapsed / processed) * (total - processed)`.
///
/// `None` until at least one item has completed.
pub fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Option<Duration> {
    if processed == 0 {
        return None;
    }
    let per_item = elapsed.as_secs_f64() / processed as f64;
    let remaining = total.saturating_sub(processed) as f64;
    Some(Duration::from_secs_f64(per_item * remaining))
}

/// Progress at the moment one completion record was reported
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub percent: f64,
    pub eta: Option<Duration>,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Get estimated time remaining as human-readable string
    pub fn eta_text(&self) -> String {
        match self.eta {
            Some(duration) => {
                let seconds = duration.as_secs();
                if seconds < 60 {
                    format!("{}s", seconds)
                } else if seconds < 3600 {
                    format!("{}m {}s", seconds / 60, seconds % 60)
                } else {
                    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
                }
            }
            None => "unknown".to_string(),
        }
    }
}

/// Receives one call per completed item, in arrival order
pub trait ProgressSink: Send + Sync {
    fn on_completed(&self, snapshot: &ProgressSnapshot, record: &CompletionRecord);

    /// Called once after every stage has been joined
    fn on_finished(&self, _summary: &RunSummary) {}
}

/// Default sink: one log line per completed item
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_completed(&self, snapshot: &ProgressSnapshot, record: &CompletionRecord) {
        info!(
            "({:.2} %) [{}/{}] eta {} wrote {}",
            snapshot.percent,
            snapshot.processed,
            snapshot.total,
            snapshot.eta_text(),
            record.dest_path.display()
        );
    }

    fn on_finished(&self, summary: &RunSummary) {
        info!(
            "Finished: {}/{} processed, {} skipped in {:.2}s",
            summary.processed, summary.total_eligible, summary.skipped, summary.elapsed_seconds
        );
    }
}

/// Terminal progress bar sink
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}, {eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }
}

impl ProgressSink for BarSink {
    fn on_completed(&self, snapshot: &ProgressSnapshot, record: &CompletionRecord) {
        self.bar.set_position(snapshot.processed as u64);
        self.bar.set_message(record.source_file_name.clone());
    }

    fn on_finished(&self, summary: &RunSummary) {
        self.bar.finish_with_message(format!(
            "{} processed, {} skipped",
            summary.processed, summary.skipped
        ));
    }
}

/// Single consumer of the completion queue
pub struct Reporter<'a> {
    counters: &'a ProgressCounters,
    sink: &'a dyn ProgressSink,
    eta_interval: Duration,
}

impl<'a> Reporter<'a> {
    pub fn new(counters: &'a ProgressCounters, sink: &'a dyn ProgressSink, eta_interval: Duration) -> Self {
        Self {
            counters,
            sink,
            eta_interval,
        }
    }

    /// Drain `completions` until it is closed and empty.
    ///
    /// The ETA ticker runs alongside and is stopped and joined before
    /// this returns. Returns the number of records reported.
    pub fn run(&self, completions: Receiver<CompletionRecord>) -> usize {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let counters = self.counters;
        let interval = self.eta_interval;

        thread::scope(|scope| {
            let ticker = thread::Builder::new()
                .name("scaler-eta".to_string())
                .spawn_scoped(scope, move || run_eta_ticker(counters, interval, stop_rx));
            if let Err(e) = ticker {
                warn!("ETA ticker unavailable: {}", e);
            }

            let mut reported = 0;
            for record in completions.iter() {
                let processed = self.counters.record_processed();
                let snapshot = self.counters.snapshot(processed);
                self.sink.on_completed(&snapshot, &record);
                reported += 1;
            }

            drop(stop_tx);
            reported
        })
    }
}

fn run_eta_ticker(counters: &ProgressCounters, interval: Duration, stop: Receiver<()>) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                counters.refresh_eta();
            }
            recv(stop) -> _ => break,
        }
    }
    debug!("ETA ticker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use crossbeam::channel::bounded;

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<(usize, f64, String)>>,
    }

    impl ProgressSink for CollectingSink {
        fn on_completed(&self, snapshot: &ProgressSnapshot, record: &CompletionRecord) {
            self.seen.lock().unwrap().push((
                snapshot.processed,
                snapshot.percent,
                record.source_file_name.clone(),
            ));
        }
    }

    fn record(name: &str) -> CompletionRecord {
        CompletionRecord {
            dest_path: PathBuf::from("out").join(name),
            source_file_name: name.to_string(),
            width: 64,
            height: 64,
        }
    }

    #[test]
    fn test_percent_complete() {
        assert_eq!(percent_complete(0, 0), 0.0);
        assert_eq!(percent_complete(1, 4), 25.0);
        assert_eq!(percent_complete(4, 4), 100.0);
    }

    #[test]
    fn test_estimate_remaining() {
        assert!(estimate_remaining(Duration::from_secs(5), 0, 10).is_none());
        assert!(estimate_remaining(Duration::ZERO, 0, 0).is_none());
        assert_eq!(
            estimate_remaining(Duration::from_secs(10), 5, 10),
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            estimate_remaining(Duration::from_secs(3), 3, 3),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_counters_eta_unknown_until_progress() {
        let counters = ProgressCounters::new(10);
        assert!(counters.refresh_eta().is_none());
        assert!(counters.eta().is_none());

        counters.record_processed();
        assert!(counters.refresh_eta().is_some());
        assert!(counters.eta().is_some());
    }

    #[test]
    fn test_counters_track_skips() {
        let counters = ProgressCounters::new(3);
        counters.record_processed();
        counters.record_skipped();
        assert_eq!(counters.processed(), 1);
        assert_eq!(counters.skipped(), 1);
        assert_eq!(counters.total_eligible(), 3);
    }

    #[test]
    fn test_eta_text() {
        let mut snapshot = ProgressCounters::new(1).snapshot(0);
        assert_eq!(snapshot.eta_text(), "unknown");
        snapshot.eta = Some(Duration::from_secs(42));
        assert_eq!(snapshot.eta_text(), "42s");
        snapshot.eta = Some(Duration::from_secs(125));
        assert_eq!(snapshot.eta_text(), "2m 5s");
        snapshot.eta = Some(Duration::from_secs(7260));
        assert_eq!(snapshot.eta_text(), "2h 1m");
    }

    #[test]
    fn test_reporter_counts_in_arrival_order() {
        let counters = ProgressCounters::new(3);
        let sink = CollectingSink::default();
        let (tx, rx) = bounded(4);

        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            tx.send(record(name)).unwrap();
        }
        drop(tx);

        let reported = Reporter::new(&counters, &sink, Duration::from_millis(5)).run(rx);
        assert_eq!(reported, 3);
        assert_eq!(counters.processed(), 3);

        let seen = sink.seen.lock().unwrap();
        let counts: Vec<usize> = seen.iter().map(|(n, _, _)| *n).collect();
        let names: Vec<&str> = seen.iter().map(|(_, _, f)| f.as_str()).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(names, vec!["c.jpg", "a.jpg", "b.jpg"]);
        assert_eq!(seen[2].1, 100.0);
    }

    #[test]
    fn test_reporter_with_no_records_returns_immediately() {
        let counters = ProgressCounters::new(0);
        let sink = CollectingSink::default();
        let (tx, rx) = bounded::<CompletionRecord>(1);
        drop(tx);

        let started = Instant::now();
        let reported = Reporter::new(&counters, &sink, Duration::from_secs(60)).run(rx);
        assert_eq!(reported, 0);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(counters.eta().is_none());
    }

    #[test]
    fn test_ticker_publishes_eta_while_running() {
        let counters = ProgressCounters::new(4);
        let sink = CollectingSink::default();
        let (tx, rx) = bounded(1);

        thread::scope(|scope| {
            let reporter = scope.spawn(|| Reporter::new(&counters, &sink, Duration::from_millis(5)).run(rx));
            tx.send(record("a.jpg")).unwrap();

            let deadline = Instant::now() + Duration::from_secs(5);
            while counters.eta().is_none() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            drop(tx);
            reporter.join().unwrap();
        });

        assert!(counters.eta().is_some());
    }
}
