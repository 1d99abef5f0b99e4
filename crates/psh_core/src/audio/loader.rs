//! Sample loader: decode an audio file into a sample buffer.
//!
//! WAV is read natively; every other supported format is decoded by
//! piping raw f32 PCM out of the external transcoder at the source's
//! native rate and channel count.

use std::path::Path;

use crate::models::SampleBuffer;
use crate::transcode::Transcoder;

use super::{wav, AudioError};

/// Decode an audio file into a sample buffer.
///
/// The buffer's declared sample rate is the source's native rate;
/// resampling (if requested) happens afterwards.
pub fn load_samples(transcoder: &Transcoder, path: &Path) -> Result<SampleBuffer, AudioError> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        return wav::read_wav(path);
    }

    decode_with_transcoder(transcoder, path)
}

/// Decode a compressed audio file via the transcoder's raw PCM pipe.
fn decode_with_transcoder(
    transcoder: &Transcoder,
    path: &Path,
) -> Result<SampleBuffer, AudioError> {
    // Probe first: the pipe output carries no rate/channel metadata.
    let info = transcoder
        .probe(path)
        .map_err(|e| AudioError::decode(path, e.to_string()))?;

    let audio = info
        .audio
        .ok_or_else(|| AudioError::decode(path, "no audio stream found"))?;

    let output = transcoder
        .decode_pcm(path)
        .map_err(|e| AudioError::decode(path, e.to_string()))?;

    let samples = bytes_to_f32_samples(&output.stdout);
    if samples.is_empty() {
        return Err(AudioError::decode(path, "decoder produced no samples"));
    }

    tracing::debug!(
        "Decoded {} samples ({} ch @ {} Hz) from {}",
        samples.len(),
        audio.channels,
        audio.sample_rate,
        path.display()
    );

    SampleBuffer::from_interleaved(&samples, audio.channels as usize, audio.sample_rate)
        .map_err(AudioError::from)
}

/// Convert raw bytes to f32 samples (little-endian).
fn bytes_to_f32_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let arr: [u8; 4] = chunk.try_into().unwrap();
            f32::from_le_bytes(arr)
        })
        .collect()
}
