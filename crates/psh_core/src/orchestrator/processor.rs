//! Job processor: classifies the input, owns the job's temporary
//! scope, and drives the pipeline to a terminal result.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::{GuiLogCallback, JobLogger, LogConfig};
use crate::models::{classify, JobSpec, MediaKind, OutputFormat};

use super::errors::{ErrorKind, PipelineError};
use super::pipeline::{CancelHandle, Pipeline, PipelineRunResult};
use super::steps::{ExtractStep, LoadStep, RemuxStep, ShiftStep, WriteStep};
use super::types::{Context, JobState, ProgressCallback};

/// Terminal failure information for a job.
#[derive(Debug, Clone)]
pub struct JobFailure {
    /// The stage kind that failed.
    pub kind: ErrorKind,
    /// Diagnostic message, propagated unmodified to the presentation layer.
    pub message: String,
}

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// Job ID that was processed.
    pub job_id: String,
    /// Whether the job completed successfully.
    pub success: bool,
    /// Path to output file (if successful).
    pub output_path: Option<PathBuf>,
    /// Failure kind and message (if failed).
    pub error: Option<JobFailure>,
    /// Steps that completed.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
}

impl JobResult {
    /// Create a successful result.
    pub fn success(job_id: String, output_path: PathBuf, run_result: PipelineRunResult) -> Self {
        Self {
            job_id,
            success: true,
            output_path: Some(output_path),
            error: None,
            steps_completed: run_result.steps_completed,
            steps_skipped: run_result.steps_skipped,
        }
    }

    /// Create a failed result.
    pub fn failure(job_id: String, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            job_id,
            success: false,
            output_path: None,
            error: Some(JobFailure {
                kind,
                message: message.into(),
            }),
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        }
    }
}

/// Assemble the pipeline for a media kind.
///
/// The audio/video branch is taken exactly once, here; the stages
/// themselves never re-check the input type.
pub fn create_pipeline(kind: MediaKind) -> Pipeline {
    match kind {
        MediaKind::Audio => Pipeline::new()
            .with_step(LoadStep::new())
            .with_step(ShiftStep::new())
            .with_step(WriteStep::new()),
        MediaKind::Video => Pipeline::new()
            .with_step(ExtractStep::new())
            .with_step(LoadStep::new())
            .with_step(ShiftStep::new())
            .with_step(WriteStep::new())
            .with_step(RemuxStep::new()),
    }
}

/// Check that the requested output format fits the classified kind.
fn check_output_format(kind: MediaKind, format: OutputFormat) -> Result<(), PipelineError> {
    let ok = match kind {
        MediaKind::Video => format == OutputFormat::Mp4,
        MediaKind::Audio => matches!(format, OutputFormat::Wav | OutputFormat::Mp3),
    };
    if ok {
        Ok(())
    } else {
        Err(PipelineError::UnsupportedFormat {
            extension: format!("{} for {} input", format.extension(), kind),
        })
    }
}

/// Processor for running jobs through the pipeline.
///
/// The processor is responsible for:
/// - Classifying the input (audio path vs video path)
/// - Acquiring a job-scoped temporary directory, released on every exit
/// - Creating the per-job logger and context
/// - Running the pipeline and collecting the result
pub struct JobProcessor {
    /// Application settings.
    settings: Settings,
    /// Directory for log files.
    log_dir: PathBuf,
    /// Root under which job temp scopes are created.
    temp_root: PathBuf,
}

impl JobProcessor {
    /// Create a new job processor.
    pub fn new(settings: Settings, log_dir: PathBuf, temp_root: PathBuf) -> Self {
        Self {
            settings,
            log_dir,
            temp_root,
        }
    }

    /// Process a single job to completion.
    ///
    /// Classification happens first: an unrecognized extension fails
    /// with `UnsupportedFormat` before any processing. All temporary
    /// artifacts live in a scoped directory that is removed on success,
    /// failure, and cancellation alike; the requested output path is
    /// only written by renaming a finished artifact into place.
    pub fn process_job(
        &self,
        job_id: &str,
        spec: &JobSpec,
        gui_callback: Option<GuiLogCallback>,
        progress_callback: Option<ProgressCallback>,
        cancel: Option<CancelHandle>,
    ) -> JobResult {
        if let Some(ref callback) = progress_callback {
            callback("Classify", 0, "Classifying input");
        }

        // Classify once; the pipeline branches on this tag only
        let kind = match classify(&spec.input) {
            Some(kind) => kind,
            None => {
                let err = PipelineError::unsupported_format(&spec.input);
                return JobResult::failure(job_id.to_string(), err.kind(), err.to_string());
            }
        };

        if let Err(err) = check_output_format(kind, spec.output_format()) {
            return JobResult::failure(job_id.to_string(), err.kind(), err.to_string());
        }

        // The kind of the first work-dir consumer, used for setup failures
        let setup_kind = match kind {
            MediaKind::Video => ErrorKind::ExtractionFailed,
            MediaKind::Audio => ErrorKind::EncodeFailed,
        };

        // Job-scoped temp directory; dropped (and deleted) on every
        // exit path of this function
        if let Err(e) = std::fs::create_dir_all(&self.temp_root) {
            return JobResult::failure(
                job_id.to_string(),
                setup_kind,
                format!("failed to create temp root: {}", e),
            );
        }
        let temp_scope = match tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize_id(job_id)))
            .tempdir_in(&self.temp_root)
        {
            Ok(dir) => dir,
            Err(e) => {
                return JobResult::failure(
                    job_id.to_string(),
                    setup_kind,
                    format!("failed to create work directory: {}", e),
                );
            }
        };

        let logger = match JobLogger::new(
            job_id,
            &self.log_dir,
            LogConfig::from_settings(&self.settings.logging),
            gui_callback,
        ) {
            Ok(l) => Arc::new(l),
            Err(e) => {
                return JobResult::failure(
                    job_id.to_string(),
                    setup_kind,
                    format!("failed to create logger: {}", e),
                );
            }
        };

        let mut ctx = Context::new(
            spec.clone(),
            kind,
            self.settings.clone(),
            job_id,
            temp_scope.path().to_path_buf(),
            logger,
        );
        if let Some(callback) = progress_callback {
            ctx = ctx.with_progress_callback(callback);
        }

        ctx.logger.info(&format!(
            "Starting job: {} ({} path)",
            spec.job_name(),
            kind
        ));
        ctx.logger
            .info(&format!("Input:  {}", spec.input.display()));
        ctx.logger
            .info(&format!("Output: {} ({})", spec.output.display(), spec.output_format()));
        ctx.logger.info(&format!(
            "Shift:  {} semitones, rate: {}",
            spec.shift, spec.rate
        ));

        let mut pipeline = create_pipeline(kind);
        if let Some(handle) = cancel {
            pipeline = pipeline.with_cancel_handle(handle);
        }

        let mut state = JobState::new(job_id);

        let result = match pipeline.run(&ctx, &mut state) {
            Ok(run_result) => {
                ctx.logger
                    .info(&format!("Job completed: {}", spec.output.display()));
                JobResult::success(job_id.to_string(), spec.output.clone(), run_result)
            }
            Err(e) => {
                ctx.logger.error(&format!("Pipeline failed: {}", e));
                JobResult::failure(job_id.to_string(), e.kind(), e.to_string())
            }
        };

        // Explicit: the temp scope dies here, success or not
        drop(temp_scope);

        result
    }
}

/// Keep job IDs filesystem-safe for the temp directory prefix.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        })
        .collect()
}
