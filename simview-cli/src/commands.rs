use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use simview_config::ViewerConfig;
use simview_core::prelude::*;
use simview_telemetry::{EventLogger, MetricsRecorder};

use crate::frontend::{run_frames, AutoplayFrontend, LineFrontend, LoopOptions};

#[derive(Parser)]
#[command(version, about = "Replay cache simulation event logs tick by tick")]
pub struct Cli {
    /// Configuration file; `simview.yaml` in the working directory is used when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrub through the log frame by frame (one stdin line per frame)
    Play(PlayArgs),
    /// Decode the whole log and print every event
    Dump(DumpArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemaArg {
    Auto,
    Basic,
    Extended,
}

impl From<SchemaArg> for SchemaChoice {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Auto => SchemaChoice::Auto,
            SchemaArg::Basic => SchemaChoice::Basic,
            SchemaArg::Extended => SchemaChoice::Extended,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Event log to replay (.gz or .gzip files are decompressed)
    #[arg(short, long)]
    pub filename: Option<PathBuf>,

    /// Row layout; `auto` picks it from the header's column count
    #[arg(long, value_enum)]
    pub schema: Option<SchemaArg>,

    /// Print prometheus metrics on exit
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Hold "forward" every frame instead of reading stdin
    #[arg(long)]
    pub autoplay: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct DumpArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl Commands {
    fn source(&self) -> &SourceArgs {
        match self {
            Commands::Play(args) => &args.source,
            Commands::Dump(args) => &args.source,
        }
    }
}

/// Layers command-line flags over file and environment configuration.
fn resolve_config(config_path: Option<&PathBuf>, source: &SourceArgs) -> anyhow::Result<ViewerConfig> {
    let mut config = match config_path {
        Some(path) => ViewerConfig::load_from_path(path)?,
        None => ViewerConfig::load()?,
    };

    if let Some(filename) = &source.filename {
        config.input = Some(filename.clone());
    }
    if let Some(schema) = source.schema {
        config.schema = schema.into();
    }
    if source.metrics {
        config.telemetry.metrics = true;
    }

    Ok(config)
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    execute(cli, &mut io::stdout().lock())
}

/// Runs `cli`, writing dump output and the metrics exposition to `out`.
fn execute<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_ref(), cli.command.source())?;
    EventLogger::try_init(&config.telemetry.log_level);

    let metrics = MetricsRecorder::new().context("registering metrics")?;
    let path = config.input_path()?;
    let decoder = LogDecoder::open(path, config.schema)?;
    info!(path = %path.display(), schema = %decoder.schema(), "Replaying event log");
    let stream = EventStream::spawn(decoder, config.stream.capacity, Some(metrics.clone()))?;

    match cli.command {
        Commands::Play(args) => run_play(&config, &args, stream, &metrics)?,
        Commands::Dump(_) => {
            run_dump(stream, out)?;
        }
    }

    if config.telemetry.metrics {
        write!(out, "{}", metrics.gather_metrics()?)?;
    }
    Ok(())
}

fn run_play(
    config: &ViewerConfig,
    args: &PlayArgs,
    stream: EventStream,
    metrics: &MetricsRecorder,
) -> anyhow::Result<()> {
    let buffer = TickBuffer::new(stream).with_metrics(metrics.clone());
    let mut session = PlaybackSession::with_buffer(buffer);
    session.start()?;

    let frames = if args.autoplay {
        let options = LoopOptions {
            frame_budget: Some(config.playback.frame_duration()),
            max_frames: args.frames,
            stop_past_end: true,
        };
        run_frames(&mut session, &mut AutoplayFrontend::new(io::stdout().lock()), options)?
    } else {
        let options = LoopOptions {
            max_frames: args.frames,
            ..LoopOptions::default()
        };
        let mut frontend = LineFrontend::new(io::stdin().lock(), io::stdout().lock());
        run_frames(&mut session, &mut frontend, options)?
    };

    let buffer = session.buffer();
    info!(frames, "Playback stopped");
    EventLogger::log_session_end(buffer.pulls(), buffer.len(), buffer.last_pulled_tick());
    Ok(())
}

/// One line per event, every field spelled out.
fn describe(event: &Event) -> String {
    let mut line = format!(
        "tick={} action={} file={} size={} requests={} delta_t={}",
        event.tick, event.action, event.file_id, event.size, event.num_requests, event.delta_t
    );
    if let Some(occupancy) = &event.occupancy {
        line.push_str(&format!(
            " cache={}/{}",
            occupancy.size, occupancy.capacity
        ));
    }
    line
}

fn run_dump<S: EventSource, W: Write>(mut source: S, out: &mut W) -> anyhow::Result<u64> {
    let mut count = 0;
    while let Some(event) = source.pull()? {
        writeln!(out, "{}", describe(&event))?;
        count += 1;
    }
    info!(count, "Dumped event log");
    Ok(count)
}
