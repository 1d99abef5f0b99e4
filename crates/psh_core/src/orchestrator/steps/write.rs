//! Write step - writes the processed buffer to the requested format.
//!
//! Lossless WAV goes straight to the target (via the job's work
//! directory, renamed into place). Lossy output is written to a
//! temporary lossless file first and converted by the transcoder.
//! On the video path this step only produces the intermediate WAV for
//! the remuxer.

use std::fs;

use crate::audio;
use crate::models::{OutputFormat, SampleBuffer};
use crate::orchestrator::errors::{PipelineError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::steps::place_output;
use crate::orchestrator::types::{Context, JobState, StepOutcome, WriteOutput};
use crate::transcode::commands;

/// Name of the shifted lossless intermediate inside the work directory.
const SHIFTED_AUDIO: &str = "shifted.wav";

/// Write step: buffer → file.
pub struct WriteStep;

impl WriteStep {
    pub fn new() -> Self {
        Self
    }

    /// Write the final audio for an audio job and place it at the
    /// requested output path.
    fn write_audio_output(
        &self,
        ctx: &Context,
        buffer: &SampleBuffer,
        format: OutputFormat,
    ) -> StepResult<WriteOutput> {
        let shifted_wav = ctx.work_dir.join(SHIFTED_AUDIO);
        audio::write_wav(buffer, &shifted_wav)?;

        match format {
            OutputFormat::Wav => {
                place_output(&shifted_wav, &ctx.spec.output)
                    .map_err(|e| PipelineError::encode_failed(e.to_string()))?;
            }
            OutputFormat::Mp3 => {
                let encoded = ctx.work_dir.join("encoded.mp3");
                let args = commands::encode_mp3_args(&shifted_wav, &encoded);
                ctx.logger
                    .command(&format!("{} {}", ctx.transcoder.ffmpeg(), args.join(" ")));

                let result = ctx.transcoder.encode_mp3(&shifted_wav, &encoded);

                // The intermediate is removed whether or not the
                // conversion succeeded
                let _ = fs::remove_file(&shifted_wav);

                if let Err(e) = result {
                    ctx.logger.show_tail("ffmpeg output");
                    return Err(PipelineError::encode_failed(e));
                }

                place_output(&encoded, &ctx.spec.output)
                    .map_err(|e| PipelineError::encode_failed(e.to_string()))?;
            }
            OutputFormat::Mp4 => {
                return Err(PipelineError::encode_failed(
                    "video output requires the remux stage",
                ));
            }
        }

        Ok(WriteOutput {
            audio_path: ctx.spec.output.clone(),
            format,
            finalized: true,
        })
    }

    /// Write the shifted intermediate WAV for the remuxer.
    fn write_remux_intermediate(
        &self,
        ctx: &Context,
        buffer: &SampleBuffer,
    ) -> StepResult<WriteOutput> {
        let shifted_wav = ctx.work_dir.join(SHIFTED_AUDIO);
        audio::write_wav(buffer, &shifted_wav)?;
        Ok(WriteOutput {
            audio_path: shifted_wav,
            format: OutputFormat::Wav,
            finalized: false,
        })
    }
}

impl Default for WriteStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for WriteStep {
    fn name(&self) -> &str {
        "Write"
    }

    fn description(&self) -> &str {
        "Write the processed samples to the target format"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        // The work directory must be usable for intermediates
        if !ctx.work_dir.exists() {
            return Err(PipelineError::encode_failed(format!(
                "work directory missing: {}",
                ctx.work_dir.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        // The writer consumes the buffer; it is not needed afterwards
        let buffer = state
            .buffer
            .take()
            .ok_or_else(|| PipelineError::encode_failed("no sample buffer to write"))?;

        let format = ctx.spec.output_format();
        ctx.logger.info(&format!(
            "Writing {} frames @ {} Hz as {}",
            buffer.frames(),
            buffer.sample_rate(),
            format
        ));

        let output = if format.is_video() {
            self.write_remux_intermediate(ctx, &buffer)?
        } else {
            self.write_audio_output(ctx, &buffer, format)?
        };

        if output.finalized {
            ctx.logger
                .success(&format!("Wrote {}", output.audio_path.display()));
        }

        state.write = Some(output);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let write = state
            .write
            .as_ref()
            .ok_or_else(|| PipelineError::encode_failed("write results not recorded"))?;

        if !write.audio_path.exists() {
            return Err(PipelineError::encode_failed(format!(
                "written file missing: {}",
                write.audio_path.display()
            )));
        }

        Ok(())
    }
}
