//! Pipeline orchestrator for coordinating job execution.
//!
//! This module provides the infrastructure for running the pitch-shift
//! pipeline. Each job is a sequence of steps that validate, execute,
//! and record their results; the driver branches once between the
//! audio and video paths at classification time.
//!
//! # Architecture
//!
//! ```text
//! Audio job              Video job
//!     ├── Load               ├── Extract
//!     ├── Shift              ├── Load
//!     └── Write              ├── Shift
//!                            ├── Write
//!                            └── Remux
//! ```
//!
//! # Example
//!
//! ```ignore
//! use psh_core::orchestrator::JobProcessor;
//!
//! let processor = JobProcessor::new(settings, log_dir, temp_root);
//! let result = processor.process_job("job-1", &spec, None, None, None);
//! println!("ok: {}", result.success);
//! ```

mod errors;
mod pipeline;
mod processor;
mod step;
pub mod steps;
mod types;

pub use errors::{ErrorKind, PipelineError, PipelineResult, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use processor::{create_pipeline, JobFailure, JobProcessor, JobResult};
pub use step::PipelineStep;
pub use steps::{ExtractStep, LoadStep, RemuxStep, ShiftStep, WriteStep};
pub use types::{
    Context, ExtractOutput, JobState, LoadOutput, ProgressCallback, RemuxOutput, ShiftOutput,
    StepOutcome, WriteOutput,
};
