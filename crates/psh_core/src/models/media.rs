//! In-memory multi-channel sample buffer.

use thiserror::Error;

/// Errors from sample buffer construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Buffer must contain at least one channel.
    #[error("sample buffer has no channels")]
    NoChannels,

    /// All channels must have equal length.
    #[error("channel {channel} has {got} samples, expected {expected}")]
    UnevenChannels {
        channel: usize,
        got: usize,
        expected: usize,
    },

    /// Sample rate must be a positive integer.
    #[error("sample rate must be positive")]
    ZeroSampleRate,
}

/// An ordered sequence of channels of `f32` samples at one sample rate.
///
/// Invariant: every channel has equal length; the sample rate is a
/// single positive integer shared across channels. Created by the
/// loader, mutated channel-by-channel by the shifter, consumed by the
/// writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer from per-channel sample vectors.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, BufferError> {
        if sample_rate == 0 {
            return Err(BufferError::ZeroSampleRate);
        }
        if channels.is_empty() {
            return Err(BufferError::NoChannels);
        }
        let expected = channels[0].len();
        for (channel, samples) in channels.iter().enumerate().skip(1) {
            if samples.len() != expected {
                return Err(BufferError::UnevenChannels {
                    channel,
                    got: samples.len(),
                    expected,
                });
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a buffer from interleaved samples (frame-major order).
    ///
    /// A trailing partial frame, if any, is discarded.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, BufferError> {
        if channel_count == 0 {
            return Err(BufferError::NoChannels);
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &sample) in frame.iter().enumerate() {
                channels[ch].push(sample);
            }
        }
        Self::from_channels(channels, sample_rate)
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// The buffer's sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Read access to the channel data.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Replace one channel's samples.
    ///
    /// The replacement must keep channel lengths equal, so all channels
    /// are replaced through [`SampleBuffer::replace_channels`] when the
    /// length changes; this method is for length-preserving updates.
    pub fn set_channel(&mut self, index: usize, samples: Vec<f32>) -> Result<(), BufferError> {
        let expected = self.frames();
        if samples.len() != expected {
            return Err(BufferError::UnevenChannels {
                channel: index,
                got: samples.len(),
                expected,
            });
        }
        self.channels[index] = samples;
        Ok(())
    }

    /// Replace all channels at once (lengths may change together).
    pub fn replace_channels(&mut self, channels: Vec<Vec<f32>>) -> Result<(), BufferError> {
        let replacement = Self::from_channels(channels, self.sample_rate)?;
        self.channels = replacement.channels;
        Ok(())
    }

    /// Interleave the channels into frame-major order for writing.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_uneven() {
        assert_eq!(
            SampleBuffer::from_channels(vec![], 44100),
            Err(BufferError::NoChannels)
        );
        assert_eq!(
            SampleBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]], 44100),
            Err(BufferError::UnevenChannels {
                channel: 1,
                got: 3,
                expected: 4
            })
        );
        assert_eq!(
            SampleBuffer::from_channels(vec![vec![0.0; 4]], 0),
            Err(BufferError::ZeroSampleRate)
        );
    }

    #[test]
    fn interleave_round_trip() {
        let buffer = SampleBuffer::from_channels(
            vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]],
            48000,
        )
        .unwrap();
        let interleaved = buffer.interleaved();
        assert_eq!(interleaved, vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);

        let rebuilt = SampleBuffer::from_interleaved(&interleaved, 2, 48000).unwrap();
        assert_eq!(rebuilt, buffer);
    }

    #[test]
    fn from_interleaved_drops_partial_frame() {
        let buffer = SampleBuffer::from_interleaved(&[1.0, 2.0, 3.0], 2, 44100).unwrap();
        assert_eq!(buffer.frames(), 1);
        assert_eq!(buffer.channels(), &[vec![1.0], vec![2.0]]);
    }

    #[test]
    fn set_channel_preserves_lengths() {
        let mut buffer =
            SampleBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 4]], 44100).unwrap();
        assert!(buffer.set_channel(0, vec![1.0; 4]).is_ok());
        assert!(buffer.set_channel(1, vec![1.0; 5]).is_err());
    }

    #[test]
    fn duration_follows_rate() {
        let buffer = SampleBuffer::from_channels(vec![vec![0.0; 44100]], 44100).unwrap();
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }
}
