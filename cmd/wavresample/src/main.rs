//! wavresample - resample a PCM WAVE file to a new sample rate.

use std::io::{BufWriter, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wavresample_audio::codec::wav::HeaderOptions;
use wavresample_audio::pcm::{ReaderSource, WriterSink};
use wavresample_audio::resampler::{AudioFilter, LinearResampler, ReferenceResampler};
use wavresample_audio::{AudioError, ControllerOptions, ErrorKind, WaveController};

mod output;

use output::{Output, OutputFormat, Report, StreamReport};

/// Resample a PCM WAVE file.
///
/// The payload is converted in chunks of a few seconds, staged in a
/// temporary file, and written behind a fresh 44-byte header once its
/// final size is known.
#[derive(Parser, Debug)]
#[command(name = "wavresample")]
#[command(about = "Resample a PCM WAVE file to a new sample rate")]
#[command(version)]
pub struct Cli {
    /// Input WAVE file
    pub input: PathBuf,

    /// Output WAVE file
    pub output: PathBuf,

    /// Target sample rate in Hz
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_rate: u32,

    /// Resampling filter
    #[arg(long, value_enum, default_value_t = FilterKind::Linear)]
    pub filter: FilterKind,

    /// Seconds of input audio per chunk
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_seconds: u32,

    /// Only accept input at this sample rate (repeatable)
    #[arg(long = "accept-rate", value_name = "HZ")]
    pub accept_rates: Vec<u32>,

    /// Print a run summary to stdout
    #[arg(long)]
    pub report: bool,

    /// Write the run summary to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub report_file: Option<PathBuf>,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    /// Streaming linear interpolation
    Linear,
    /// Pad, interpolate and decimate (8/16-bit only)
    Reference,
}

impl FilterKind {
    fn build(self, sample_rate: u32) -> Box<dyn AudioFilter> {
        match self {
            FilterKind::Linear => Box::new(LinearResampler::new(sample_rate)),
            FilterKind::Reference => Box::new(ReferenceResampler::new(sample_rate)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            FilterKind::Linear => "linear",
            FilterKind::Reference => "reference",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err:#}", category(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let started = Instant::now();

    let options = ControllerOptions {
        chunk_seconds: cli.chunk_seconds,
        header: HeaderOptions::accept_rates(cli.accept_rates.iter().copied()),
    };
    let source = ReaderSource::open(&cli.input)
        .with_context(|| format!("open {}", cli.input.display()))?;
    let mut controller = WaveController::new(source, options);
    let input = controller
        .open()
        .with_context(|| format!("read header of {}", cli.input.display()))?;

    let staging = tempfile::tempfile().context("create staging file")?;
    let mut staged = WriterSink::new(BufWriter::new(staging));
    let mut filter = cli.filter.build(cli.sample_rate);
    let output = controller
        .apply_filter(filter.as_mut(), &mut staged)
        .with_context(|| format!("resample to {} Hz", cli.sample_rate))?;

    let mut payload = staged
        .into_inner()
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flush staging file")?;
    payload.seek(SeekFrom::Start(0)).context("rewind staging file")?;

    let mut sink = WriterSink::create(&cli.output)
        .with_context(|| format!("create {}", cli.output.display()))?;
    controller
        .save(&mut payload, &mut sink)
        .with_context(|| format!("write {}", cli.output.display()))?;
    sink.flush()
        .with_context(|| format!("write {}", cli.output.display()))?;

    let elapsed = started.elapsed();
    info!("Done ({:.2} seconds)", elapsed.as_secs_f64());

    if cli.report || cli.report_file.is_some() {
        let format = if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        };
        let report = Report::new(
            cli.filter.name(),
            StreamReport::new(&cli.input, &input),
            StreamReport::new(&cli.output, &output),
            elapsed,
        );
        Output::new(format, cli.report_file.clone()).write(&report)?;
    }
    Ok(())
}

/// Returns the user-facing category of a failure.
fn category(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AudioError>() {
            return match e.kind() {
                ErrorKind::HeaderFormat => "invalid input",
                ErrorKind::UnsupportedFormat => "unsupported input",
                ErrorKind::Io => "i/o error",
            };
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return "i/o error";
        }
    }
    "error"
}
