//! Core enums used throughout the application.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File extensions treated as pure audio sources.
pub const SUPPORTED_AUDIO_EXTS: &[&str] = &["wav", "mp3", "ogg", "flac", "m4a", "aac"];

/// File extensions treated as video sources (audio embedded in a container).
pub const SUPPORTED_VIDEO_EXTS: &[&str] = &["mp4", "mov", "mkv"];

/// Kind of media a job operates on, decided once from the input extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Pure audio file: decode, shift, write.
    Audio,
    /// Audio embedded in a video container: extract, shift, remux.
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Classify an input path by extension.
///
/// Returns `None` for unrecognized extensions; the pipeline driver
/// surfaces that as `UnsupportedFormat` before any processing starts.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if SUPPORTED_AUDIO_EXTS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else if SUPPORTED_VIDEO_EXTS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Output container format, derived from the output path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PCM WAV, written directly with no intermediate step.
    Wav,
    /// Lossy MP3, produced via the external transcoder.
    Mp3,
    /// MP4 video container (original video stream-copied, shifted audio).
    Mp4,
}

impl OutputFormat {
    /// Derive the output format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "wav" => Some(OutputFormat::Wav),
            "mp3" => Some(OutputFormat::Mp3),
            "mp4" => Some(OutputFormat::Mp4),
            _ => None,
        }
    }

    /// The canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Mp4 => "mp4",
        }
    }

    /// Whether this format is a video container.
    pub fn is_video(&self) -> bool {
        matches!(self, OutputFormat::Mp4)
    }

    /// Whether writing this format requires the external transcoder.
    pub fn needs_transcoder(&self) -> bool {
        !matches!(self, OutputFormat::Wav)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Unit for the user-facing shift amount.
///
/// One tone is two semitones by this system's convention; conversion
/// happens once, when the `PitchShift` is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchUnit {
    #[default]
    Semitones,
    Tones,
}

impl std::fmt::Display for PitchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PitchUnit::Semitones => write!(f, "semitones"),
            PitchUnit::Tones => write!(f, "tones"),
        }
    }
}

/// Sample-rate policy for the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatePolicy {
    /// Keep the source's native rate; no resampling is performed.
    #[default]
    KeepOriginal,
    /// Resample every channel to this target rate.
    Resample(u32),
}

impl RatePolicy {
    /// The fixed set of selectable target rates.
    pub const TARGET_RATES: [u32; 3] = [44100, 48000, 96000];

    /// The target rate, if this policy resamples.
    pub fn target(&self) -> Option<u32> {
        match self {
            RatePolicy::KeepOriginal => None,
            RatePolicy::Resample(rate) => Some(*rate),
        }
    }
}

impl std::fmt::Display for RatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatePolicy::KeepOriginal => write!(f, "keep original"),
            RatePolicy::Resample(rate) => write!(f, "{} Hz", rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn audio_extensions_classify_as_audio() {
        for ext in SUPPORTED_AUDIO_EXTS {
            let path = PathBuf::from(format!("song.{}", ext));
            assert_eq!(classify(&path), Some(MediaKind::Audio), "ext: {}", ext);
        }
    }

    #[test]
    fn video_extensions_classify_as_video() {
        for ext in SUPPORTED_VIDEO_EXTS {
            let path = PathBuf::from(format!("clip.{}", ext));
            assert_eq!(classify(&path), Some(MediaKind::Video), "ext: {}", ext);
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify(Path::new("SONG.WAV")), Some(MediaKind::Audio));
        assert_eq!(classify(Path::new("Clip.MkV")), Some(MediaKind::Video));
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert_eq!(classify(Path::new("notes.txt")), None);
        assert_eq!(classify(Path::new("archive.zip")), None);
        assert_eq!(classify(Path::new("no_extension")), None);
    }

    #[test]
    fn extension_sets_are_disjoint() {
        for ext in SUPPORTED_AUDIO_EXTS {
            assert!(!SUPPORTED_VIDEO_EXTS.contains(ext));
        }
    }

    #[test]
    fn output_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.wav")),
            Some(OutputFormat::Wav)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.MP3")),
            Some(OutputFormat::Mp3)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.mp4")),
            Some(OutputFormat::Mp4)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out.flac")), None);
    }

    #[test]
    fn rate_policy_targets() {
        assert_eq!(RatePolicy::KeepOriginal.target(), None);
        assert_eq!(RatePolicy::Resample(48000).target(), Some(48000));
    }
}
