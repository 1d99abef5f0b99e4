//! PitchShifter - command line front-end.
//!
//! Parses arguments, loads configuration, submits one job to the
//! background worker, and renders its event stream: progress lines,
//! optional per-job log output, and the terminal result.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use psh_core::config::ConfigManager;
use psh_core::logging::{init_tracing_with_file, LogLevel};
use psh_core::models::{
    classify, suggest_output_name, JobSpec, PitchShift, PitchUnit, RatePolicy,
};
use psh_core::worker::{Worker, WorkerEvent};

#[derive(Parser)]
#[command(
    name = "pitch-shifter",
    version,
    about = "Shift the pitch of audio and video files"
)]
struct Args {
    /// Input media file (audio: wav/mp3/ogg/flac/m4a/aac, video: mp4/mov/mkv)
    input: PathBuf,

    /// Output file; a name is derived from the input and shift when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Shift amount, negative shifts down (e.g. -s=-3.5)
    #[arg(short, long, allow_negative_numbers = true)]
    shift: f64,

    /// Unit of the shift amount (one tone is two semitones)
    #[arg(long, value_enum, default_value_t = UnitArg::Semitones)]
    unit: UnitArg,

    /// Target sample rate: "keep", 44100, 48000, or 96000
    #[arg(long, default_value = "keep")]
    rate: String,

    /// Config file path
    #[arg(long, default_value = ".config/settings.toml")]
    config: PathBuf,

    /// Print per-job log lines as they arrive
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
enum UnitArg {
    Semitones,
    Tones,
}

impl From<UnitArg> for PitchUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Semitones => PitchUnit::Semitones,
            UnitArg::Tones => PitchUnit::Tones,
        }
    }
}

fn parse_rate(raw: &str) -> Result<RatePolicy> {
    if raw.eq_ignore_ascii_case("keep") {
        return Ok(RatePolicy::KeepOriginal);
    }
    let rate: u32 = raw
        .parse()
        .with_context(|| format!("invalid sample rate '{}'", raw))?;
    if !RatePolicy::TARGET_RATES.contains(&rate) {
        bail!(
            "sample rate {} is not supported (choose one of {:?} or \"keep\")",
            rate,
            RatePolicy::TARGET_RATES
        );
    }
    Ok(RatePolicy::Resample(rate))
}

fn build_spec(args: &Args) -> Result<JobSpec> {
    let unit: PitchUnit = args.unit.into();
    let shift = PitchShift::new(args.shift, unit)
        .with_context(|| format!("invalid shift of {} {}", args.shift, unit))?;
    let rate = parse_rate(&args.rate)?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let kind = classify(&args.input).with_context(|| {
                format!(
                    "cannot derive an output name for '{}'; pass --output",
                    args.input.display()
                )
            })?;
            suggest_output_name(&args.input, args.shift, unit, kind)
        }
    };

    JobSpec::new(&args.input, &output, shift, rate).context("invalid job")
}

fn run(args: Args) -> Result<bool> {
    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    config.ensure_dirs_exist().context("failed to create working directories")?;

    let _log_guard = init_tracing_with_file(LogLevel::Info, &config.logs_folder());

    tracing::info!("pitch-shifter starting");
    tracing::info!("Config: {}", args.config.display());
    tracing::info!("Core version: {}", psh_core::version());

    let spec = build_spec(&args)?;
    println!("Input:  {}", spec.input.display());
    println!("Output: {}", spec.output.display());
    println!("Shift:  {} semitones, rate: {}", spec.shift, spec.rate);

    let (worker, events) = Worker::spawn(
        config.settings().clone(),
        config.logs_folder(),
        config.temp_root(),
    )
    .context("failed to start worker")?;

    let ticket = worker
        .submit(spec)
        .context("failed to submit job to worker")?;
    tracing::debug!(job_id = %ticket.job_id, "job submitted");

    let mut succeeded = false;
    for event in events.iter() {
        match event {
            WorkerEvent::Started { job_id } => {
                println!("Processing job {}", job_id);
            }
            WorkerEvent::Progress {
                stage,
                fraction,
                message,
                ..
            } => {
                println!("[{:3.0}%] {} - {}", fraction * 100.0, stage, message);
            }
            WorkerEvent::Log { line, .. } => {
                if args.verbose {
                    println!("    {}", line);
                }
            }
            WorkerEvent::Finished { output, .. } => {
                println!("Done. Exported to: {}", output.display());
                succeeded = true;
                break;
            }
            WorkerEvent::Failed { kind, message, .. } => {
                eprintln!("Failed ({}): {}", kind, message);
                break;
            }
        }
    }

    worker.shutdown();
    Ok(succeeded)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
