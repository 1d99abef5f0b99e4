//! Per-channel pitch shifting via the signalsmith-dsp stretch routine.

use signalsmith_dsp::stretch::{StretchConfig, Stretcher};

use crate::config::ProcessingSettings;
use crate::models::SampleBuffer;

use super::AudioError;

/// Per-channel pitch shifter.
///
/// Each channel is processed independently with a fresh stretcher, so
/// shifting a stereo buffer equals shifting each channel alone. A shift
/// of exactly 0 semitones still passes through the routine; behavior
/// stays uniform rather than short-circuiting.
#[derive(Debug, Clone)]
pub struct PitchShifter {
    fft_size: usize,
    overlap: usize,
}

impl PitchShifter {
    /// Create a shifter with the given FFT window and overlap factor.
    pub fn new(fft_size: u32, overlap: u32) -> Self {
        Self {
            fft_size: fft_size.max(2) as usize,
            overlap: overlap.max(1) as usize,
        }
    }

    /// Create a shifter from processing settings.
    pub fn from_settings(settings: &ProcessingSettings) -> Self {
        Self::new(settings.fft_size, settings.overlap)
    }

    /// The minimum channel length the routine analyzes; shorter input
    /// is zero-padded up to this.
    pub fn min_window(&self) -> usize {
        self.fft_size
    }

    /// Shift every channel of the buffer in place by `semitones`.
    pub fn shift_buffer(
        &self,
        buffer: &mut SampleBuffer,
        semitones: f64,
    ) -> Result<(), AudioError> {
        for channel in 0..buffer.channel_count() {
            let shifted = self.shift_channel(&buffer.channels()[channel], semitones, channel)?;
            buffer
                .set_channel(channel, shifted)
                .map_err(AudioError::from)?;
        }
        Ok(())
    }

    /// Shift a single channel, returning a vector of the same length.
    ///
    /// Channels below the analysis window are padded with trailing
    /// zeros to exactly one window and the routine's output is
    /// truncated back to the original sample count.
    pub fn shift_channel(
        &self,
        samples: &[f32],
        semitones: f64,
        channel: usize,
    ) -> Result<Vec<f32>, AudioError> {
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(AudioError::shift(
                channel,
                "input contains non-finite samples",
            ));
        }

        let original_len = samples.len();

        let padded;
        let input: &[f32] = if original_len < self.fft_size {
            let mut p = samples.to_vec();
            p.resize(self.fft_size, 0.0);
            padded = p;
            &padded
        } else {
            samples
        };

        let mut stretcher = Stretcher::<f32>::new(self.fft_size, self.overlap);
        let mut config = StretchConfig::default();
        config.pitch_shift = semitones as f32;
        config.stretch = 1.0;
        stretcher.set_config(config);

        let mut output = vec![0.0f32; input.len()];
        stretcher.process(input, &mut output);

        output.truncate(original_len);
        Ok(output)
    }
}
