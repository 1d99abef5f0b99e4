//! Core types for the processing pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::PitchShifter;
use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{JobSpec, MediaKind, OutputFormat, SampleBuffer};
use crate::transcode::Transcoder;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the job spec and shared resources that steps can read but
/// not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Job specification (paths, shift, rate policy).
    pub spec: JobSpec,
    /// Media kind decided at classification time.
    pub kind: MediaKind,
    /// Application settings.
    pub settings: Settings,
    /// Job name/identifier.
    pub job_name: String,
    /// Job-scoped working directory for temporary artifacts.
    pub work_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Configured external transcoder.
    pub transcoder: Transcoder,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        spec: JobSpec,
        kind: MediaKind,
        settings: Settings,
        job_name: impl Into<String>,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        let transcoder = Transcoder::from_settings(&settings.processing);
        Self {
            spec,
            kind,
            settings,
            job_name: job_name.into(),
            work_dir,
            logger,
            transcoder,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, stage_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage_name, percent, message);
        }
    }

    /// Build the pitch shifter configured for this job.
    pub fn shifter(&self) -> PitchShifter {
        PitchShifter::from_settings(&self.settings.processing)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// This is the "write-once manifest" - steps add new data but do not
/// overwrite earlier stages' output. The in-flight sample buffer rides
/// along but is not serialized.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Extraction results (video path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractOutput>,
    /// Loader results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadOutput>,
    /// Shifter results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<ShiftOutput>,
    /// Writer results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write: Option<WriteOutput>,
    /// Remux results (video path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remux: Option<RemuxOutput>,
    /// The sample buffer flowing between Load, Shift, and Write.
    #[serde(skip)]
    pub buffer: Option<SampleBuffer>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if extraction has been completed.
    pub fn has_extraction(&self) -> bool {
        self.extract.is_some()
    }

    /// Check if samples have been loaded.
    pub fn has_samples(&self) -> bool {
        self.buffer.is_some()
    }
}

/// Output from the Extract step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    /// Path to the extracted lossless audio file.
    pub audio_path: PathBuf,
    /// Source container duration, if the probe reported one.
    pub source_duration_secs: Option<f64>,
}

/// Output from the Load step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOutput {
    /// Sample rate of the loaded buffer (after any resampling).
    pub sample_rate: u32,
    /// Channel count.
    pub channels: usize,
    /// Frames per channel.
    pub frames: usize,
    /// Native rate the source was resampled from, if resampling ran.
    pub resampled_from: Option<u32>,
}

/// Output from the Shift step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftOutput {
    /// Applied shift in semitones.
    pub semitones: f64,
    /// Channels processed.
    pub channels: usize,
    /// Channels that needed zero-padding up to the analysis window.
    pub padded_channels: usize,
}

/// Output from the Write step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOutput {
    /// Path to the written audio file.
    pub audio_path: PathBuf,
    /// Format that was written.
    pub format: OutputFormat,
    /// Whether `audio_path` is the job's final output (audio jobs) or
    /// an intermediate for the remuxer (video jobs).
    pub finalized: bool,
}

/// Output from the Remux step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemuxOutput {
    /// Path to the final output container.
    pub output_path: PathBuf,
    /// The ffmpeg command that was run.
    pub command: String,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
