//! External transcoder (ffmpeg/ffprobe) interface.
//!
//! The pipeline never decodes or encodes compressed media itself; it
//! shells out to the transcoder for audio extraction, compressed-audio
//! decoding, lossy encoding, and remuxing. Success is exit code 0 and
//! stderr is surfaced verbatim on failure.

pub mod commands;
mod probe;
mod runner;

pub use probe::{probe_file, AudioStreamInfo, MediaInfo, ProbeError};
pub use runner::{run_tool, ToolError, ToolOutput, ToolResult};

use std::path::Path;
use std::time::Duration;

use crate::config::ProcessingSettings;

/// Handle to the configured external transcoder binaries.
///
/// Carries the tool paths and the invocation deadline; one instance is
/// shared by all stages of a job.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: String,
    ffprobe: String,
    timeout: Option<Duration>,
}

impl Transcoder {
    /// Build a transcoder handle from processing settings.
    ///
    /// A `tool_timeout_secs` of 0 disables the deadline.
    pub fn from_settings(settings: &ProcessingSettings) -> Self {
        let timeout = if settings.tool_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(settings.tool_timeout_secs))
        };
        Self {
            ffmpeg: settings.ffmpeg_path.clone(),
            ffprobe: settings.ffprobe_path.clone(),
            timeout,
        }
    }

    /// The ffmpeg command or path in use.
    pub fn ffmpeg(&self) -> &str {
        &self.ffmpeg
    }

    /// Probe a media file's stream inventory.
    pub fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        probe_file(&self.ffprobe, path, self.timeout)
    }

    /// Extract a video's audio track into a lossless WAV.
    pub fn extract_audio(&self, input: &Path, output_wav: &Path) -> ToolResult<ToolOutput> {
        let args = commands::extract_audio_args(input, output_wav);
        run_tool(&self.ffmpeg, "ffmpeg", &args, self.timeout)
    }

    /// Decode an audio file to raw interleaved f32 PCM at its native
    /// rate and channel count. The returned stdout holds the samples.
    pub fn decode_pcm(&self, input: &Path) -> ToolResult<ToolOutput> {
        let args = commands::decode_pcm_args(input);
        run_tool(&self.ffmpeg, "ffmpeg", &args, self.timeout)
    }

    /// Convert a lossless WAV into an MP3.
    pub fn encode_mp3(&self, input_wav: &Path, output: &Path) -> ToolResult<ToolOutput> {
        let args = commands::encode_mp3_args(input_wav, output);
        run_tool(&self.ffmpeg, "ffmpeg", &args, self.timeout)
    }

    /// Remux the original video stream with the shifted audio.
    pub fn remux(&self, video_input: &Path, audio_wav: &Path, output: &Path) -> ToolResult<ToolOutput> {
        let args = commands::remux_args(video_input, audio_wav, output);
        run_tool(&self.ffmpeg, "ffmpeg", &args, self.timeout)
    }
}
