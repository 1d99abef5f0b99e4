//! Channel-synchronous resampling via rubato.

use rubato::{FftFixedIn, Resampler};

use crate::models::SampleBuffer;

use super::AudioError;

/// Input chunk size fed to the resampler.
const CHUNK_FRAMES: usize = 1024;

/// Resample a buffer to the target rate.
///
/// Returns a clone when the target equals the source rate ("keep
/// original" never changes the buffer). Otherwise every channel is
/// resampled together; the resampler's filter delay is trimmed from
/// the front and the output is sized to `frames * target / source`
/// (rounded), so duration is preserved to within a frame.
pub fn resample(buffer: &SampleBuffer, target_rate: u32) -> Result<SampleBuffer, AudioError> {
    let source_rate = buffer.sample_rate();
    if target_rate == source_rate {
        return Ok(buffer.clone());
    }

    let channel_count = buffer.channel_count();
    let frames = buffer.frames();
    let expected =
        (frames as f64 * target_rate as f64 / source_rate as f64).round() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_FRAMES,
        2,
        channel_count,
    )
    .map_err(|e| AudioError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let mut collected: Vec<Vec<f32>> =
        vec![Vec::with_capacity(expected + delay); channel_count];

    let data = buffer.channels();
    let mut pos = 0;
    while pos < frames {
        let needed = resampler.input_frames_next();
        let produced = if frames - pos >= needed {
            let chunk: Vec<&[f32]> = data.iter().map(|c| &c[pos..pos + needed]).collect();
            pos += needed;
            resampler.process(&chunk, None)
        } else {
            let chunk: Vec<&[f32]> = data.iter().map(|c| &c[pos..]).collect();
            pos = frames;
            resampler.process_partial(Some(chunk.as_slice()), None)
        }
        .map_err(|e| AudioError::Resample(e.to_string()))?;
        append_chunk(&mut collected, produced);
    }

    // Drain the filter tail until the delayed region is fully flushed.
    while collected[0].len() < delay + expected {
        let produced = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        if produced.iter().all(|c| c.is_empty()) {
            break;
        }
        append_chunk(&mut collected, produced);
    }

    let channels: Vec<Vec<f32>> = collected
        .into_iter()
        .map(|mut channel| {
            let skip = delay.min(channel.len());
            channel.drain(..skip);
            channel.resize(expected, 0.0);
            channel
        })
        .collect();

    SampleBuffer::from_channels(channels, target_rate).map_err(AudioError::from)
}

fn append_chunk(collected: &mut [Vec<f32>], produced: Vec<Vec<f32>>) {
    for (sink, chunk) in collected.iter_mut().zip(produced) {
        sink.extend(chunk);
    }
}
