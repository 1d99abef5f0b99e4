//! WAV reading and writing via hound.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::models::SampleBuffer;

use super::AudioError;

/// Read a WAV file into a sample buffer.
///
/// Integer PCM (8/16/24/32 bit) is scaled to [-1.0, 1.0]; float WAV is
/// read as-is.
pub fn read_wav(path: &Path) -> Result<SampleBuffer, AudioError> {
    let mut reader =
        WavReader::open(path).map_err(|e| AudioError::decode(path, e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::decode(path, e.to_string()))?,
        SampleFormat::Int => {
            // Full-scale value for the stored bit depth
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::decode(path, e.to_string()))?
        }
    };

    if interleaved.is_empty() {
        return Err(AudioError::decode(path, "file contains no samples"));
    }

    SampleBuffer::from_interleaved(&interleaved, spec.channels as usize, spec.sample_rate)
        .map_err(AudioError::from)
}

/// Write a sample buffer as 16-bit PCM WAV.
///
/// Samples are clamped to [-1.0, 1.0] before quantization.
pub fn write_wav(buffer: &SampleBuffer, path: &Path) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::write(path, e.to_string()))?;

    for sample in buffer.interleaved() {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| AudioError::write(path, e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::write(path, e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_preserves_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let samples: Vec<f32> = (0..4410)
            .map(|i| (i as f32 / 4410.0 * std::f32::consts::TAU * 10.0).sin() * 0.5)
            .collect();
        let buffer =
            SampleBuffer::from_channels(vec![samples.clone(), samples], 44100).unwrap();

        write_wav(&buffer, &path).unwrap();
        let read_back = read_wav(&path).unwrap();

        assert_eq!(read_back.channel_count(), 2);
        assert_eq!(read_back.frames(), 4410);
        assert_eq!(read_back.sample_rate(), 44100);
        // 16-bit quantization tolerance
        for (a, b) in buffer.channels()[0].iter().zip(&read_back.channels()[0]) {
            assert!((a - b).abs() < 2.0 / 32768.0);
        }
    }

    #[test]
    fn clipping_is_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let buffer = SampleBuffer::from_channels(vec![vec![2.0, -2.0, 0.0]], 48000).unwrap();
        write_wav(&buffer, &path).unwrap();

        let read_back = read_wav(&path).unwrap();
        assert!(read_back.channels()[0][0] <= 1.0);
        assert!(read_back.channels()[0][1] >= -1.0);
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"RIFFnot really a wav").unwrap();

        let result = read_wav(&path);
        assert!(matches!(result, Err(AudioError::Decode { .. })));
    }

    #[test]
    fn missing_file_is_decode_error() {
        let result = read_wav(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(AudioError::Decode { .. })));
    }
}
