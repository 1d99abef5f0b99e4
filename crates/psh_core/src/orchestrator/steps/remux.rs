//! Remux step - combines the shifted audio with the original video.
//!
//! The video stream is stream-copied, never re-encoded, so this stage
//! cannot alter video timing. A duration difference between the shifted
//! audio and the original is tolerated, not treated as an error.

use crate::orchestrator::errors::{PipelineError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::steps::place_output;
use crate::orchestrator::types::{Context, JobState, RemuxOutput, StepOutcome};
use crate::transcode::commands;

/// Name of the remuxed container inside the work directory before it is
/// placed at the requested output path.
const REMUXED_OUTPUT: &str = "remuxed.mp4";

/// Remux step for the video path.
pub struct RemuxStep;

impl RemuxStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RemuxStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RemuxStep {
    fn name(&self) -> &str {
        "Remux"
    }

    fn description(&self) -> &str {
        "Combine shifted audio with the original video stream"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.spec.input.exists() {
            return Err(PipelineError::mux_failed(format!(
                "original video missing: {}",
                ctx.spec.input.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let write = state
            .write
            .as_ref()
            .ok_or_else(|| PipelineError::mux_failed("no shifted audio to remux"))?;

        if write.finalized {
            return Err(PipelineError::mux_failed(
                "audio was already finalized; nothing to remux",
            ));
        }

        let staged = ctx.work_dir.join(REMUXED_OUTPUT);
        let args = commands::remux_args(&ctx.spec.input, &write.audio_path, &staged);
        let command = format!("{} {}", ctx.transcoder.ffmpeg(), args.join(" "));
        ctx.logger.command(&command);
        if ctx.settings.logging.show_tool_args {
            ctx.logger.log_tool_args("ffmpeg", &args);
        }

        if let Err(e) = ctx
            .transcoder
            .remux(&ctx.spec.input, &write.audio_path, &staged)
        {
            ctx.logger.show_tail("ffmpeg output");
            return Err(PipelineError::mux_failed(e));
        }

        place_output(&staged, &ctx.spec.output)
            .map_err(|e| PipelineError::mux_failed(e.to_string()))?;

        ctx.logger
            .success(&format!("Remuxed to {}", ctx.spec.output.display()));

        state.remux = Some(RemuxOutput {
            output_path: ctx.spec.output.clone(),
            command,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let remux = state
            .remux
            .as_ref()
            .ok_or_else(|| PipelineError::mux_failed("remux results not recorded"))?;

        if !remux.output_path.exists() {
            return Err(PipelineError::mux_failed(format!(
                "output file not created: {}",
                remux.output_path.display()
            )));
        }

        Ok(())
    }
}
