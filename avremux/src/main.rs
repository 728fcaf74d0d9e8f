use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use media_source::{MediaSource, SourceConfig};
use media_types::{MediaTime, MediaType, PresentationDescriptor, StreamDescriptor};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod config;
mod serve;
mod session;

use config::{PipelineConfig, StreamSelection};

#[derive(Parser, Debug)]
#[command(name = "avremux")]
#[command(about = "Inspect and remux AVI files")]
struct Args {
    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe the streams of a file
    Info {
        input: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Copy streams into a new AVI file
    Remux {
        input: PathBuf,
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Stream the remuxed input as live AVI over HTTP
    Serve {
        input: PathBuf,

        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[derive(clap::Args, Debug)]
struct PipelineArgs {
    /// JSON pipeline config; flags given here take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start this many milliseconds into the input
    #[arg(long)]
    start_ms: Option<u64>,

    /// Volume factor for PCM audio
    #[arg(long)]
    gain: Option<f32>,

    /// Samples buffered per stream by the source
    #[arg(long)]
    queue_depth: Option<usize>,

    /// Drop audio streams
    #[arg(long, conflicts_with = "audio_only")]
    video_only: bool,

    /// Drop video streams
    #[arg(long)]
    audio_only: bool,
}

impl PipelineArgs {
    fn load(&self) -> Result<PipelineConfig> {
        let mut pipeline = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(start_ms) = self.start_ms {
            pipeline.start_ms = start_ms;
        }
        if let Some(gain) = self.gain {
            pipeline.gain = gain;
        }
        if let Some(depth) = self.queue_depth {
            pipeline.queue_depth = depth;
        }
        if self.video_only {
            pipeline.streams = StreamSelection::VideoOnly;
        } else if self.audio_only {
            pipeline.streams = StreamSelection::AudioOnly;
        }
        Ok(pipeline)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match args.command {
        Command::Info { input, json } => info(&input, json).await,
        Command::Remux {
            input,
            output,
            pipeline,
        } => {
            let pipeline = pipeline.load()?;
            let summary = session::remux(&input, &output, &pipeline).await?;
            println!("Wrote {} ({})", output.display(), summary.duration);
            for s in &summary.streams {
                println!("  {} {:?}: {} samples", s.id, s.stream_type, s.samples);
            }
            Ok(())
        }
        Command::Serve {
            input,
            addr,
            pipeline,
        } => serve::serve(addr, input, pipeline.load()?).await,
    }
}

#[derive(Serialize)]
struct InfoReport<'a> {
    path: &'a Path,
    duration: MediaTime,
    streams: &'a [StreamDescriptor],
}

async fn info(input: &Path, json: bool) -> Result<()> {
    let source = MediaSource::open(input, SourceConfig::default())
        .await
        .with_context(|| format!("failed to open {}", input.display()))?;
    let descriptor = source.presentation_descriptor()?;
    source.shutdown()?;

    if json {
        let report = InfoReport {
            path: input,
            duration: descriptor.duration,
            streams: &descriptor.streams,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", describe(input, &descriptor));
    }
    Ok(())
}

fn describe(input: &Path, descriptor: &PresentationDescriptor) -> String {
    let mut out = format!("{}\n  duration: {}\n", input.display(), descriptor.duration);
    for d in &descriptor.streams {
        let line = match &d.media_type {
            MediaType::Video(v) => format!(
                "video {} {}x{} @ {:.3} fps",
                v.decoder_fourcc(),
                v.width,
                v.height,
                v.frame_rate.to_f64()
            ),
            MediaType::Audio(a) => format!(
                "audio tag {:#06x}, {} ch, {} Hz, {} bit",
                a.format_tag, a.channels, a.samples_per_sec, a.bits_per_sample
            ),
        };
        out.push_str(&format!("  {}: {line}\n", d.id));
    }
    out
}
