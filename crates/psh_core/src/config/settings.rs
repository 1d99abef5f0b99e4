//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Processing settings (external tools, shifting parameters).
    #[serde(default)]
    pub processing: ProcessingSettings,
}

/// Identifies a settings section for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Logging,
    Processing,
}

impl ConfigSection {
    /// The TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Processing => "processing",
        }
    }
}

/// Path configuration for output, temp, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for job-scoped temporary directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last used input path (restored by front-ends).
    #[serde(default)]
    pub last_input_path: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            last_input_path: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool-output lines to show on error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Log the full transcoder argument list before each invocation.
    #[serde(default)]
    pub show_tool_args: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_tool_args: false,
        }
    }
}

/// Processing settings: external tool locations and shifter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Path or command name for the external transcoder.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Path or command name for the probe tool.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Deadline for external tool invocations, in seconds (0 disables).
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// FFT window of the pitch-shift routine; also the minimum channel
    /// length, below which input is zero-padded.
    #[serde(default = "default_fft_size")]
    pub fft_size: u32,

    /// Overlap factor of the pitch-shift routine.
    #[serde(default = "default_overlap")]
    pub overlap: u32,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_tool_timeout() -> u64 {
    600
}

fn default_fft_size() -> u32 {
    2048
}

fn default_overlap() -> u32 {
    4
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            tool_timeout_secs: default_tool_timeout(),
            fft_size: default_fft_size(),
            overlap: default_overlap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let settings = Settings::default();
        let serialized = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.paths.temp_root, ".temp");
        assert_eq!(parsed.processing.fft_size, 2048);
        assert_eq!(parsed.processing.tool_timeout_secs, 600);
    }

    #[test]
    fn missing_sections_get_defaults() {
        let parsed: Settings = toml::from_str("[paths]\ntemp_root = \"/tmp/psh\"\n").unwrap();
        assert_eq!(parsed.paths.temp_root, "/tmp/psh");
        assert_eq!(parsed.processing.ffmpeg_path, "ffmpeg");
        assert!(parsed.logging.compact);
    }
}
