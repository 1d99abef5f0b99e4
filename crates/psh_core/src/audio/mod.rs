//! In-memory audio: WAV I/O, compressed decode, resampling, pitch shifting.
//!
//! The actual signal processing is delegated: resampling to rubato and
//! pitch shifting to signalsmith-dsp. This module only adapts buffers
//! to and from those routines.

mod loader;
mod resample;
mod shift;
mod wav;

pub use loader::load_samples;
pub use resample::resample;
pub use shift::PitchShifter;
pub use wav::{read_wav, write_wav};

use std::path::PathBuf;

use thiserror::Error;

use crate::models::BufferError;

/// Errors from audio decoding, resampling, shifting, and writing.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Input could not be decoded into a sample buffer.
    #[error("failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    /// The resampling routine reported an error.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// The pitch-shift routine failed for one channel.
    #[error("pitch shift failed on channel {channel}: {message}")]
    Shift { channel: usize, message: String },

    /// Samples could not be written to the target file.
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    /// A buffer invariant was violated.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl AudioError {
    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a shift error for a channel.
    pub fn shift(channel: usize, message: impl Into<String>) -> Self {
        Self::Shift {
            channel,
            message: message.into(),
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            message: message.into(),
        }
    }
}
