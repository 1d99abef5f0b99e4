//! Media probing via ffprobe JSON output.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::runner::{run_tool, ToolError};

/// Errors from probing a media file.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// File does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// ffprobe invocation failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// ffprobe produced invalid JSON.
    #[error("failed to parse ffprobe output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Properties of the first audio stream in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    /// Index among the file's audio streams.
    pub index: usize,
    /// Codec name as reported by ffprobe.
    pub codec: String,
    /// Native sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Stream inventory of a media file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Probed file.
    pub path: PathBuf,
    /// Whether the container has a video stream.
    pub has_video: bool,
    /// First audio stream, if any.
    pub audio: Option<AudioStreamInfo>,
    /// Container duration in seconds, if reported.
    pub duration_secs: Option<f64>,
}

impl MediaInfo {
    /// Whether the container has at least one audio stream.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Build the ffprobe argument list for a full stream/format probe.
pub fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_streams".to_string(),
        "-show_format".to_string(),
        path.display().to_string(),
    ]
}

/// Probe a media file's streams with ffprobe.
pub fn probe_file(
    ffprobe: &str,
    path: &Path,
    timeout: Option<Duration>,
) -> Result<MediaInfo, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.to_path_buf()));
    }

    tracing::debug!("Probing file: {}", path.display());

    let args = probe_args(path);
    let output = run_tool(ffprobe, "ffprobe", &args, timeout)?;
    let json: Value = serde_json::from_slice(&output.stdout)?;

    Ok(parse_probe_json(&json, path))
}

/// Parse the JSON output from ffprobe.
fn parse_probe_json(json: &Value, path: &Path) -> MediaInfo {
    let mut info = MediaInfo {
        path: path.to_path_buf(),
        ..Default::default()
    };

    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        let mut audio_index = 0usize;
        for stream in streams {
            match stream.get("codec_type").and_then(|t| t.as_str()) {
                Some("video") => info.has_video = true,
                Some("audio") => {
                    if info.audio.is_none() {
                        info.audio = parse_audio_stream(stream, audio_index);
                    }
                    audio_index += 1;
                }
                _ => {}
            }
        }
    }

    // Duration lives in the format section, as a string
    info.duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.trim().parse::<f64>().ok());

    info
}

/// Parse a single audio stream's properties.
fn parse_audio_stream(stream: &Value, index: usize) -> Option<AudioStreamInfo> {
    // ffprobe reports sample_rate as a string
    let sample_rate = stream
        .get("sample_rate")
        .and_then(|r| r.as_str())
        .and_then(|r| r.parse::<u32>().ok())?;

    let channels = stream.get("channels").and_then(|c| c.as_u64()).unwrap_or(1) as u16;

    let codec = stream
        .get("codec_name")
        .and_then(|c| c.as_str())
        .unwrap_or("unknown")
        .to_string();

    Some(AudioStreamInfo {
        index,
        codec,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn parses_video_with_audio() {
        let json = probe_json(
            r#"{
                "streams": [
                    {"codec_type": "video", "codec_name": "h264"},
                    {"codec_type": "audio", "codec_name": "aac",
                     "sample_rate": "44100", "channels": 2}
                ],
                "format": {"duration": "12.480000"}
            }"#,
        );

        let info = parse_probe_json(&json, Path::new("clip.mp4"));
        assert!(info.has_video);
        let audio = info.audio.unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.codec, "aac");
        assert!((info.duration_secs.unwrap() - 12.48).abs() < 1e-9);
    }

    #[test]
    fn detects_missing_audio_track() {
        let json = probe_json(
            r#"{
                "streams": [{"codec_type": "video", "codec_name": "h264"}],
                "format": {}
            }"#,
        );

        let info = parse_probe_json(&json, Path::new("silent.mp4"));
        assert!(info.has_video);
        assert!(!info.has_audio());
    }

    #[test]
    fn first_audio_stream_wins() {
        let json = probe_json(
            r#"{
                "streams": [
                    {"codec_type": "audio", "codec_name": "flac",
                     "sample_rate": "96000", "channels": 1},
                    {"codec_type": "audio", "codec_name": "aac",
                     "sample_rate": "48000", "channels": 2}
                ]
            }"#,
        );

        let info = parse_probe_json(&json, Path::new("multi.mkv"));
        let audio = info.audio.unwrap();
        assert_eq!(audio.index, 0);
        assert_eq!(audio.codec, "flac");
    }

    #[test]
    fn probe_rejects_missing_file() {
        let result = probe_file("ffprobe", Path::new("/nonexistent/file.mp4"), None);
        assert!(matches!(result, Err(ProbeError::FileNotFound(_))));
    }

    #[test]
    fn probe_args_request_json() {
        let args = probe_args(Path::new("in.mp4"));
        assert!(args.contains(&"json".to_string()));
        assert!(args.contains(&"-show_streams".to_string()));
    }
}
