//! Argument builders for the ffmpeg invocations the pipeline makes.
//!
//! Kept separate from execution so the exact flag sets are unit-testable
//! without invoking the binary.

use std::path::Path;

/// Arguments to demux/decode a video's audio track into a lossless WAV.
///
/// Video and subtitle streams are dropped; sample rate and channel
/// layout are kept as-is.
pub fn extract_audio_args(input: &Path, output_wav: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        "pcm_s16le".to_string(),
        output_wav.display().to_string(),
    ]
}

/// Arguments to decode any audio input to raw interleaved f32 PCM on stdout,
/// keeping the native sample rate and channel count.
pub fn decode_pcm_args(input: &Path) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.display().to_string(),
        "-vn".to_string(),
        "-f".to_string(),
        "f32le".to_string(),
        "-acodec".to_string(),
        "pcm_f32le".to_string(),
        "pipe:1".to_string(),
    ]
}

/// Arguments to convert a lossless WAV into an MP3.
pub fn encode_mp3_args(input_wav: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input_wav.display().to_string(),
        "-codec:a".to_string(),
        "libmp3lame".to_string(),
        "-qscale:a".to_string(),
        "2".to_string(),
        output.display().to_string(),
    ]
}

/// Arguments to remux the original video stream (copied, never re-encoded)
/// with the shifted audio into the output container.
pub fn remux_args(video_input: &Path, audio_wav: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        video_input.display().to_string(),
        "-i".to_string(),
        audio_wav.display().to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-shortest".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        output.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_drops_video_and_keeps_pcm() {
        let args = extract_audio_args(Path::new("in.mp4"), Path::new("audio.wav"));
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"pcm_s16le".to_string()));
        assert_eq!(args.last().unwrap(), "audio.wav");
    }

    #[test]
    fn decode_pipes_raw_f32() {
        let args = decode_pcm_args(Path::new("song.mp3"));
        assert!(args.contains(&"f32le".to_string()));
        assert_eq!(args.last().unwrap(), "pipe:1");
        // Native rate and channels are preserved: no -ar / -ac flags
        assert!(!args.contains(&"-ar".to_string()));
        assert!(!args.contains(&"-ac".to_string()));
    }

    #[test]
    fn remux_stream_copies_video() {
        let args = remux_args(
            Path::new("in.mp4"),
            Path::new("shifted.wav"),
            Path::new("out.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-c:v copy"));
        assert!(joined.contains("-map 0:v:0"));
        assert!(joined.contains("-map 1:a:0"));
        assert!(joined.contains("-c:a aac"));
    }

    #[test]
    fn mp3_encode_uses_lame() {
        let args = encode_mp3_args(Path::new("tmp.wav"), Path::new("out.mp3"));
        assert!(args.contains(&"libmp3lame".to_string()));
    }
}
