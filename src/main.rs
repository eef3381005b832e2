use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linecount::debug::DebugSink;
use linecount::report::{FrameRateMeter, RunSummary};
use linecount::runner;
use linecount::{CounterConfig, CounterSession, FrameSource, ImageSequence};

#[derive(Parser)]
#[command(name = "linecount")]
#[command(about = "Count moving objects crossing a horizontal line in a frame sequence")]
struct Cli {
    /// Directory of frame images, processed in file-name order
    #[arg(value_name = "FRAMES_DIR")]
    frames_dir: PathBuf,

    /// JSON config file; command-line options override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Y coordinate of the counting line
    #[arg(long)]
    line_y: Option<i32>,

    /// Minimum object area in pixels
    #[arg(long)]
    min_area: Option<f64>,

    /// Maximum object area in pixels
    #[arg(long)]
    max_area: Option<f64>,

    /// Distance under which a centroid counts as already seen
    #[arg(long)]
    distance_threshold: Option<f64>,

    /// Minimum width/height ratio
    #[arg(long)]
    min_ratio: Option<f64>,

    /// Maximum width/height ratio
    #[arg(long)]
    max_ratio: Option<f64>,

    /// Background model history length in frames
    #[arg(long)]
    history: Option<u32>,

    /// Background model variance threshold
    #[arg(long)]
    var_threshold: Option<f32>,

    /// Fixed background learning rate in (0, 1]
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Treat shadows as foreground instead of labelling them
    #[arg(long)]
    no_shadows: bool,

    /// Reset the counter after every N frames
    #[arg(long, value_name = "N")]
    reset_every: Option<u64>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Write a JSON run summary to this file
    #[arg(long, value_name = "FILE")]
    summary_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn counter_config(&self) -> anyhow::Result<CounterConfig> {
        let mut config = match &self.config {
            Some(path) => CounterConfig::from_json_file(path)?,
            None => CounterConfig::default(),
        };
        if let Some(line_y) = self.line_y {
            config.counting_line_y = line_y;
        }
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        if let Some(max_area) = self.max_area {
            config.max_area = max_area;
        }
        if let Some(distance) = self.distance_threshold {
            config.distance_threshold = distance;
        }
        if let Some(min_ratio) = self.min_ratio {
            config.aspect_ratio_range.0 = min_ratio;
        }
        if let Some(max_ratio) = self.max_ratio {
            config.aspect_ratio_range.1 = max_ratio;
        }
        if let Some(history) = self.history {
            config.background.history = history;
        }
        if let Some(var_threshold) = self.var_threshold {
            config.background.var_threshold = var_threshold;
        }
        if self.learning_rate.is_some() {
            config.background.learning_rate = self.learning_rate;
        }
        if self.no_shadows {
            config.background.detect_shadows = false;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = args.counter_config()?;
    let mut session = CounterSession::new(config)?;
    let line_y = session.config().counting_line_y;

    let mut source = ImageSequence::open(&args.frames_dir)?;
    info!(
        frames = source.len(),
        dir = %args.frames_dir.display(),
        line_y,
        "Counter started"
    );

    let debug_sink = match &args.debug_out {
        Some(dir) => Some(DebugSink::new(dir.clone())?),
        None => None,
    };

    let started_at = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let started = Instant::now();
    let mut meter = FrameRateMeter::new();

    let stop = runner::run(&mut session, &mut source, args.reset_every, |frame, report| {
        if let Some(sink) = &debug_sink {
            sink.save(frame, report, line_y)?;
        }
        if let Some(fps) = meter.tick() {
            info!(
                frame = report.frame_index,
                fps = %format!("{:.1}", fps),
                total = report.total_count,
                "Progress"
            );
        }
        Ok(())
    });

    let summary = RunSummary::new(
        started_at,
        session.frames_processed(),
        session.total_count(),
        line_y,
        started.elapsed(),
    )?;
    info!(
        frames = summary.frames_processed,
        total = summary.total_count,
        stop = ?stop,
        "Final state"
    );
    println!("Total objects counted: {}", summary.total_count);

    if let Some(path) = &args.summary_out {
        summary.write_json(path)?;
    }

    Ok(())
}
