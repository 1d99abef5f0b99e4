//! Shift step - applies the pitch shift to each channel independently.

use crate::orchestrator::errors::{PipelineError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, ShiftOutput, StepOutcome};

/// Shift step: runs the external pitch-shift routine per channel.
///
/// A shift of exactly 0 semitones still passes through the routine so
/// behavior stays uniform and deterministic.
pub struct ShiftStep;

impl ShiftStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShiftStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ShiftStep {
    fn name(&self) -> &str {
        "Shift"
    }

    fn description(&self) -> &str {
        "Pitch-shift every channel by the requested semitones"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let buffer = state
            .buffer
            .as_mut()
            .ok_or_else(|| PipelineError::shift_failed("no sample buffer loaded"))?;

        let semitones = ctx.spec.shift.as_semitones();
        let shifter = ctx.shifter();

        let channels = buffer.channel_count();
        let padded_channels = if buffer.frames() < shifter.min_window() {
            channels
        } else {
            0
        };
        if padded_channels > 0 {
            ctx.logger.info(&format!(
                "Input below analysis window ({} < {} samples), padding with silence",
                buffer.frames(),
                shifter.min_window()
            ));
        }

        ctx.logger.info(&format!(
            "Shifting {} channel(s) by {:+} semitones @ {} Hz",
            channels,
            semitones,
            buffer.sample_rate()
        ));

        shifter.shift_buffer(buffer, semitones)?;

        state.shift = Some(ShiftOutput {
            semitones,
            channels,
            padded_channels,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.shift.is_none() {
            return Err(PipelineError::shift_failed("shift results not recorded"));
        }
        if state.buffer.is_none() {
            return Err(PipelineError::shift_failed("buffer lost during shift"));
        }
        Ok(())
    }
}
