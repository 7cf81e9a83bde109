//! ImageScaler CLI - resize every image in a folder to one fixed size

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use console::style;
use tracing::info;

use imagescaler::parallel::{BarSink, LogSink, ProgressSink};
use imagescaler::{
    discover_files, init_logging, BatchJob, BatchPipeline, Config, FilterType, ImageTransformer,
    RunSummary, ScalerError,
};

/// ImageScaler - batch image scaler
#[derive(Parser, Debug)]
#[command(
    name = "imagescaler",
    version,
    about = "Resize every image in a folder to a fixed resolution",
    long_about = "ImageScaler reads every file in the input folder whose name ends with the \
                  given extension, resizes it to exactly WIDTHxHEIGHT (stretching if needed) \
                  and writes a JPEG with the same name into the output folder. Files that \
                  cannot be read or decoded are skipped."
)]
struct Cli {
    /// File name suffix of the images to process [default: .jpg]
    #[arg(short, long, value_name = "SUFFIX")]
    extension: Option<String>,

    /// Folder containing input images
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Folder where output images will be placed
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Height of the scaled image [default: 64]
    #[arg(short = 'H', long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Width of the scaled image [default: 64]
    #[arg(short, long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Number of transform workers [default: 6]
    #[arg(short = 'n', long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Resampling filter [default: lanczos3]
    #[arg(long, value_enum, value_name = "FILTER")]
    filter: Option<CliFilter>,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Show a progress bar instead of one log line per image
    #[arg(long)]
    progress_bar: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// CLI-compatible filter enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<CliFilter> for FilterType {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => FilterType::Nearest,
            CliFilter::Triangle => FilterType::Triangle,
            CliFilter::CatmullRom => FilterType::CatmullRom,
            CliFilter::Gaussian => FilterType::Gaussian,
            CliFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (input, output) = match (&cli.input, &cli.output) {
        (Some(input), Some(output)) => (input.clone(), output.clone()),
        _ => {
            let _ = Cli::command().print_help();
            println!();
            return;
        }
    };

    if let Err(e) = run(&cli, input, output).await {
        let message = match e.downcast_ref::<ScalerError>() {
            Some(scaler_error) => scaler_error.user_message(),
            None => format!("{:#}", e),
        };
        eprintln!("{}: {}", style("Error").red().bold(), message);
        process::exit(1);
    }
}

async fn run(cli: &Cli, input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let config = build_config(cli)?;
    init_logging(&config.logging)?;

    let files = discover_files(&input, &config.scale.extension).await?;
    info!(
        "Found {} '{}' files in {:?}",
        files.len(),
        config.scale.extension,
        input
    );

    let job = BatchJob::new(files, input, output, config.scale.width, config.scale.height);
    let sink: Arc<dyn ProgressSink> = if cli.progress_bar && !cli.json {
        Arc::new(BarSink::new(job.files.len()))
    } else {
        Arc::new(LogSink)
    };

    let pipeline = BatchPipeline::new(
        config.pipeline.clone(),
        ImageTransformer::new(config.scale.filter),
    )
    .with_sink(sink);

    let summary = tokio::task::spawn_blocking(move || pipeline.run(&job))
        .await
        .context("pipeline task failed")??;

    print_summary(&summary, cli.json)?;
    Ok(())
}

/// Load the config file if given and apply command line overrides
fn build_config(cli: &Cli) -> Result<Config, ScalerError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(extension) = &cli.extension {
        config.scale.extension = extension.clone();
    }
    if let Some(width) = cli.width {
        config.scale.width = width;
    }
    if let Some(height) = cli.height {
        config.scale.height = height;
    }
    if let Some(filter) = cli.filter {
        config.scale.filter = filter.into();
    }
    if let Some(workers) = cli.workers {
        config.pipeline.workers = workers;
    }

    if cli.quiet {
        config.logging.level = "error".to_string();
    } else if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.log_json {
        config.logging.json_format = true;
    }

    config.validate()?;
    Ok(config)
}

/// Print processing summary
fn print_summary(summary: &RunSummary, json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!();
    println!("{}", style("Processing Summary:").bold());
    println!("  {}: {}/{}", style("Processed").green(), summary.processed, summary.total_eligible);
    if summary.skipped > 0 {
        println!("  {}: {}", style("Skipped").red(), summary.skipped);
    }
    println!("  {}: {}", style("Workers").blue(), summary.workers);
    println!("  {}: {:.2}s", style("Duration").blue(), summary.elapsed_seconds);
    if summary.processed > 0 {
        println!("  {}: {:.1} files/sec", style("Speed").cyan(), summary.files_per_second());
    }
    Ok(())
}
