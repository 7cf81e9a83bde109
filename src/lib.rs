//! ImageScaler - batch image scaler
//!
//! Resizes every eligible image in a folder to one fixed resolution and
//! re-encodes it as JPEG. Work flows through three stages joined by two
//! bounded queues:
//!
//! - an **enumerator** turning file names into work items,
//! - a fixed pool of **workers** that decode, resize, encode and write,
//! - a single **reporter** that counts completions and logs progress.
//!
//! Unreadable or undecodable inputs are skipped and counted; they never
//! stop the run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use imagescaler::{BatchJob, BatchPipeline, ImageTransformer, PipelineConfig};
//!
//! let files = vec!["cat.jpg".to_string(), "dog.jpg".to_string()];
//! let job = BatchJob::new(files, "input/", "output/", 64, 64);
//!
//! let pipeline = BatchPipeline::new(PipelineConfig::default(), ImageTransformer::default());
//! let summary = pipeline.run(&job)?;
//! println!("{} of {} files resized", summary.processed, summary.total_eligible);
//! # Ok::<(), imagescaler::ScalerError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, LoggingConfig, PipelineConfig, ScaleConfig};
pub use discovery::discover_files;
pub use error::{Result, ScalerError};
pub use parallel::{BatchJob, BatchPipeline, CompletionRecord, RunSummary, WorkItem};
pub use processing::{FilterType, ImageTransformer};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays free for the run summary. `RUST_LOG`
/// takes precedence over the configured level. Calling this more than once
/// keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ScalerError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.json_format {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        info!("ImageScaler v{} initialized", VERSION);
    }
    Ok(())
}
