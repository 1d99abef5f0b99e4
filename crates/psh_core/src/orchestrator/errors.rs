//! Error taxonomy for the processing pipeline.
//!
//! Every stage-local failure is wrapped with its stage's kind and the
//! lowest-level diagnostic available (transcoder stderr, or the DSP
//! routine's message). All kinds are terminal for the current job;
//! nothing is retried.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;

/// The kind of a pipeline failure, for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input extension matches neither the audio nor the video set.
    UnsupportedFormat,
    /// Video source has no audio track.
    NoAudioStream,
    /// Transcoder failed to demux/decode the audio track.
    ExtractionFailed,
    /// Input could not be decoded (or resampled) into samples.
    DecodeFailed,
    /// Pitch-shift routine failed.
    ShiftFailed,
    /// Output write or lossy conversion failed.
    EncodeFailed,
    /// Remuxing audio and video into the output container failed.
    MuxFailed,
    /// Job was cancelled at a stage boundary.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::NoAudioStream => "NoAudioStream",
            ErrorKind::ExtractionFailed => "ExtractionFailed",
            ErrorKind::DecodeFailed => "DecodeFailed",
            ErrorKind::ShiftFailed => "ShiftFailed",
            ErrorKind::EncodeFailed => "EncodeFailed",
            ErrorKind::MuxFailed => "MuxFailed",
            ErrorKind::Cancelled => "Cancelled",
        };
        write!(f, "{}", name)
    }
}

/// A pipeline failure: stage kind plus diagnostic message.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Unrecognized input extension; raised before any processing.
    #[error("unsupported file extension: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// The video source carries no audio track.
    #[error("no audio stream in {}", .path.display())]
    NoAudioStream { path: PathBuf },

    /// Audio extraction from the video container failed.
    #[error("audio extraction failed: {message}")]
    ExtractionFailed { message: String },

    /// Decoding (or loader-side resampling) failed.
    #[error("decode failed: {message}")]
    DecodeFailed { message: String },

    /// The pitch-shift routine failed, with channel index when known.
    #[error("pitch shift failed{}: {message}", fmt_channel(.channel))]
    ShiftFailed {
        channel: Option<usize>,
        message: String,
    },

    /// Writing or converting the output audio failed.
    #[error("encode failed: {message}")]
    EncodeFailed { message: String },

    /// Remuxing the shifted audio with the original video failed.
    #[error("remux failed: {message}")]
    MuxFailed { message: String },

    /// The job was cancelled between stages.
    #[error("job was cancelled")]
    Cancelled,
}

fn fmt_channel(channel: &Option<usize>) -> String {
    match channel {
        Some(index) => format!(" on channel {}", index),
        None => String::new(),
    }
}

impl PipelineError {
    /// Create an unsupported-format error for a path's extension.
    pub fn unsupported_format(path: &std::path::Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::UnsupportedFormat { extension }
    }

    /// Create a no-audio-stream error.
    pub fn no_audio_stream(path: impl Into<PathBuf>) -> Self {
        Self::NoAudioStream { path: path.into() }
    }

    /// Create an extraction-failed error.
    pub fn extraction_failed(message: impl ToString) -> Self {
        Self::ExtractionFailed {
            message: message.to_string(),
        }
    }

    /// Create a decode-failed error.
    pub fn decode_failed(message: impl ToString) -> Self {
        Self::DecodeFailed {
            message: message.to_string(),
        }
    }

    /// Create a shift-failed error without a channel index.
    pub fn shift_failed(message: impl ToString) -> Self {
        Self::ShiftFailed {
            channel: None,
            message: message.to_string(),
        }
    }

    /// Create an encode-failed error.
    pub fn encode_failed(message: impl ToString) -> Self {
        Self::EncodeFailed {
            message: message.to_string(),
        }
    }

    /// Create a mux-failed error.
    pub fn mux_failed(message: impl ToString) -> Self {
        Self::MuxFailed {
            message: message.to_string(),
        }
    }

    /// The failure kind, for presentation layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            PipelineError::NoAudioStream { .. } => ErrorKind::NoAudioStream,
            PipelineError::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            PipelineError::DecodeFailed { .. } => ErrorKind::DecodeFailed,
            PipelineError::ShiftFailed { .. } => ErrorKind::ShiftFailed,
            PipelineError::EncodeFailed { .. } => ErrorKind::EncodeFailed,
            PipelineError::MuxFailed { .. } => ErrorKind::MuxFailed,
            PipelineError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Audio-layer errors map to the kind of the stage they occur in:
/// decode and resample belong to the loader, shift to the shifter,
/// write to the writer.
impl From<AudioError> for PipelineError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Decode { .. } | AudioError::Buffer(_) => {
                PipelineError::decode_failed(err)
            }
            AudioError::Resample(_) => PipelineError::decode_failed(err),
            AudioError::Shift { channel, message } => PipelineError::ShiftFailed {
                channel: Some(channel),
                message,
            },
            AudioError::Write { .. } => PipelineError::encode_failed(err),
        }
    }
}

/// Result type for pipeline steps.
pub type StepResult<T> = Result<T, PipelineError>;

/// Result type for full pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(
            PipelineError::unsupported_format(Path::new("x.txt")).kind(),
            ErrorKind::UnsupportedFormat
        );
        assert_eq!(
            PipelineError::no_audio_stream("clip.mp4").kind(),
            ErrorKind::NoAudioStream
        );
        assert_eq!(
            PipelineError::extraction_failed("boom").kind(),
            ErrorKind::ExtractionFailed
        );
        assert_eq!(PipelineError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn shift_error_keeps_channel_index() {
        let err: PipelineError = AudioError::shift(1, "routine failed").into();
        assert_eq!(err.kind(), ErrorKind::ShiftFailed);
        assert!(err.to_string().contains("channel 1"));
    }

    #[test]
    fn resample_failure_is_decode_kind() {
        let err: PipelineError = AudioError::Resample("ratio unsupported".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::DecodeFailed);
        assert!(err.to_string().contains("ratio unsupported"));
    }

    #[test]
    fn display_carries_diagnostics() {
        let err = PipelineError::mux_failed("ffmpeg failed with exit code 1: moov atom");
        assert!(err.to_string().contains("moov atom"));
        assert_eq!(
            PipelineError::unsupported_format(Path::new("a.txt")).to_string(),
            "unsupported file extension: 'txt'"
        );
    }
}
