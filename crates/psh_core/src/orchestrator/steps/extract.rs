//! Extract step - demuxes a video's audio track into a temporary WAV.
//!
//! Probes the container first so a source with no audio track fails
//! with `NoAudioStream` before the transcoder is asked to extract.

use std::fs;

use crate::orchestrator::errors::{PipelineError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ExtractOutput, JobState, StepOutcome};
use crate::transcode::commands;

/// Name of the extracted intermediate inside the job work directory.
const EXTRACTED_AUDIO: &str = "extracted_audio.wav";

/// Extract step for the video path.
///
/// Creates exactly one temporary file (the extracted lossless audio),
/// tracked by the job's scoped work directory.
pub struct ExtractStep;

impl ExtractStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn description(&self) -> &str {
        "Extract the audio track from the video source"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.spec.input.exists() {
            return Err(PipelineError::extraction_failed(format!(
                "source file not found: {}",
                ctx.spec.input.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = &ctx.spec.input;

        // Probe for an audio track before invoking the extractor
        let info = ctx
            .transcoder
            .probe(input)
            .map_err(PipelineError::extraction_failed)?;

        if !info.has_audio() {
            ctx.logger
                .warn(&format!("No audio track in {}", input.display()));
            return Err(PipelineError::no_audio_stream(input));
        }

        if let Some(audio) = &info.audio {
            ctx.logger.info(&format!(
                "Audio track: {} ({} ch @ {} Hz)",
                audio.codec, audio.channels, audio.sample_rate
            ));
        }

        let output_path = ctx.work_dir.join(EXTRACTED_AUDIO);
        let args = commands::extract_audio_args(input, &output_path);
        ctx.logger
            .command(&format!("{} {}", ctx.transcoder.ffmpeg(), args.join(" ")));
        if ctx.settings.logging.show_tool_args {
            ctx.logger.log_tool_args("ffmpeg", &args);
        }

        let result = ctx.transcoder.extract_audio(input, &output_path);
        if let Err(e) = result {
            ctx.logger.show_tail("ffmpeg output");
            return Err(PipelineError::extraction_failed(e));
        }

        // Verify extraction produced a usable file
        let size = fs::metadata(&output_path)
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(PipelineError::extraction_failed(format!(
                "extraction produced no output: {}",
                output_path.display()
            )));
        }

        ctx.logger.info(&format!(
            "Extracted audio: {} [{:.1} MB]",
            output_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy(),
            size as f64 / (1024.0 * 1024.0)
        ));

        state.extract = Some(ExtractOutput {
            audio_path: output_path,
            source_duration_secs: info.duration_secs,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let extract = state
            .extract
            .as_ref()
            .ok_or_else(|| PipelineError::extraction_failed("extraction results not recorded"))?;

        if !extract.audio_path.exists() {
            return Err(PipelineError::extraction_failed(format!(
                "extracted file missing: {}",
                extract.audio_path.display()
            )));
        }

        Ok(())
    }
}
