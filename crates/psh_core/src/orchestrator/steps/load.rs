//! Load step - decodes the source audio into a sample buffer,
//! resampling to the requested target rate when asked.

use std::path::PathBuf;

use crate::audio;
use crate::models::MediaKind;
use crate::orchestrator::errors::{PipelineError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, LoadOutput, StepOutcome};

/// Load step: file → in-memory multi-channel buffer.
pub struct LoadStep;

impl LoadStep {
    pub fn new() -> Self {
        Self
    }

    /// The file this job loads samples from: the extracted intermediate
    /// on the video path, the source itself on the audio path.
    fn source_path(ctx: &Context, state: &JobState) -> Option<PathBuf> {
        match ctx.kind {
            MediaKind::Video => state.extract.as_ref().map(|e| e.audio_path.clone()),
            MediaKind::Audio => Some(ctx.spec.input.clone()),
        }
    }
}

impl Default for LoadStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for LoadStep {
    fn name(&self) -> &str {
        "Load"
    }

    fn description(&self) -> &str {
        "Decode audio into a sample buffer"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.kind == MediaKind::Audio && !ctx.spec.input.exists() {
            return Err(PipelineError::decode_failed(format!(
                "source file not found: {}",
                ctx.spec.input.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let path = Self::source_path(ctx, state).ok_or_else(|| {
            PipelineError::decode_failed("no extracted audio available to load")
        })?;

        ctx.logger
            .info(&format!("Loading samples from {}", path.display()));

        let mut buffer = audio::load_samples(&ctx.transcoder, &path)?;
        let native_rate = buffer.sample_rate();

        ctx.logger.info(&format!(
            "Loaded {} frames, {} channel(s) @ {} Hz",
            buffer.frames(),
            buffer.channel_count(),
            native_rate
        ));

        // Resample when a target rate differs from the native rate;
        // "keep original" never touches the buffer.
        let mut resampled_from = None;
        if let Some(target) = ctx.spec.rate.target() {
            if target != native_rate {
                ctx.logger
                    .info(&format!("Resampling {} Hz -> {} Hz", native_rate, target));
                buffer = audio::resample(&buffer, target)?;
                resampled_from = Some(native_rate);
            }
        }

        state.load = Some(LoadOutput {
            sample_rate: buffer.sample_rate(),
            channels: buffer.channel_count(),
            frames: buffer.frames(),
            resampled_from,
        });
        state.buffer = Some(buffer);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let buffer = state
            .buffer
            .as_ref()
            .ok_or_else(|| PipelineError::decode_failed("no samples recorded"))?;

        // The declared rate must match what downstream stages assume
        if let Some(target) = ctx.spec.rate.target() {
            if buffer.sample_rate() != target {
                return Err(PipelineError::decode_failed(format!(
                    "buffer rate {} Hz does not match requested {} Hz",
                    buffer.sample_rate(),
                    target
                )));
            }
        }

        Ok(())
    }
}
