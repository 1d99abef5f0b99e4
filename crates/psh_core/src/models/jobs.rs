//! Job specification: one pitch-shift request, immutable once processing starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::{MediaKind, OutputFormat, PitchUnit, RatePolicy};

/// Largest accepted shift magnitude, in semitones.
pub const MAX_SHIFT_SEMITONES: f64 = 24.0;

/// Errors raised while constructing a job spec.
///
/// These are pre-pipeline validation failures; runtime failures use the
/// pipeline's own error taxonomy.
#[derive(Error, Debug)]
pub enum JobSpecError {
    /// Shift magnitude exceeds ±24 semitones (or is not finite).
    #[error("pitch shift of {0} semitones is outside the ±{MAX_SHIFT_SEMITONES} range")]
    ShiftOutOfRange(f64),

    /// Requested target rate is not one of the fixed selectable rates.
    #[error("unsupported target sample rate: {0} Hz")]
    UnsupportedRate(u32),

    /// Output path has no recognized output extension.
    #[error("cannot derive an output format from '{}'", .0.display())]
    UnknownOutputFormat(PathBuf),
}

/// A pitch shift amount, stored in semitones.
///
/// Unit conversion (tones are two semitones) is resolved here, once;
/// downstream stages only ever see semitones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchShift {
    semitones: f64,
}

impl PitchShift {
    /// Create a shift from an amount in the given unit.
    pub fn new(amount: f64, unit: PitchUnit) -> Result<Self, JobSpecError> {
        let semitones = match unit {
            PitchUnit::Semitones => amount,
            PitchUnit::Tones => amount * 2.0,
        };
        if !semitones.is_finite() || semitones.abs() > MAX_SHIFT_SEMITONES {
            return Err(JobSpecError::ShiftOutOfRange(semitones));
        }
        Ok(Self { semitones })
    }

    /// Create a shift directly from semitones.
    pub fn semitones(amount: f64) -> Result<Self, JobSpecError> {
        Self::new(amount, PitchUnit::Semitones)
    }

    /// The resolved shift in semitones.
    pub fn as_semitones(&self) -> f64 {
        self.semitones
    }
}

impl std::fmt::Display for PitchShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+}", self.semitones)
    }
}

/// Specification for one pitch-shift job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Source media file.
    pub input: PathBuf,
    /// Requested output file; only created after the pipeline succeeds.
    pub output: PathBuf,
    /// Pitch shift to apply.
    pub shift: PitchShift,
    /// Sample-rate policy for the loader.
    pub rate: RatePolicy,
}

impl JobSpec {
    /// Create a validated job spec.
    ///
    /// Checks the rate policy against the fixed target set and that an
    /// output format can be derived from the output path. The input
    /// extension itself is classified by the pipeline, not here.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        shift: PitchShift,
        rate: RatePolicy,
    ) -> Result<Self, JobSpecError> {
        let output = output.into();

        if let Some(target) = rate.target() {
            if !RatePolicy::TARGET_RATES.contains(&target) {
                return Err(JobSpecError::UnsupportedRate(target));
            }
        }

        if OutputFormat::from_path(&output).is_none() {
            return Err(JobSpecError::UnknownOutputFormat(output));
        }

        Ok(Self {
            input: input.into(),
            output,
            shift,
            rate,
        })
    }

    /// The output format derived from the output path.
    ///
    /// Always derivable for a validated spec.
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_path(&self.output).expect("validated at construction")
    }

    /// Short job name (input file stem) for logs and error context.
    pub fn job_name(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "job".to_string())
    }
}

/// Suggest an output file name next to the input, encoding the shift.
///
/// `song.wav` with +4 semitones becomes `song_pitch+4semi.wav`.
pub fn suggest_output_name(input: &Path, amount: f64, unit: PitchUnit, kind: MediaKind) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let unit_tag = match unit {
        PitchUnit::Semitones => "semi",
        PitchUnit::Tones => "tone",
    };
    let ext = match kind {
        MediaKind::Audio => "wav",
        MediaKind::Video => "mp4",
    };
    let sign = if amount >= 0.0 { "+" } else { "-" };
    let name = format!("{}_pitch{}{}{}.{}", stem, sign, amount.abs(), unit_tag, ext);
    input.with_file_name(name)
}

/// Append the format's canonical extension when the output path has none
/// (or has one that derives no format).
pub fn fix_output_extension(output: &Path, format: OutputFormat) -> PathBuf {
    if OutputFormat::from_path(output) == Some(format) {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_os_string();
        name.push(format!(".{}", format.extension()));
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tones_are_two_semitones() {
        let semis = PitchShift::new(4.0, PitchUnit::Semitones).unwrap();
        let tones = PitchShift::new(2.0, PitchUnit::Tones).unwrap();
        assert_eq!(semis.as_semitones(), tones.as_semitones());
    }

    #[test]
    fn fractional_tones_convert() {
        let shift = PitchShift::new(-1.5, PitchUnit::Tones).unwrap();
        assert_eq!(shift.as_semitones(), -3.0);
    }

    #[test]
    fn shift_range_is_enforced() {
        assert!(PitchShift::semitones(24.0).is_ok());
        assert!(PitchShift::semitones(-24.0).is_ok());
        assert!(PitchShift::semitones(24.5).is_err());
        // 13 tones = 26 semitones, past the limit
        assert!(PitchShift::new(13.0, PitchUnit::Tones).is_err());
        assert!(PitchShift::semitones(f64::NAN).is_err());
    }

    #[test]
    fn spec_rejects_unknown_output_format() {
        let shift = PitchShift::semitones(1.0).unwrap();
        let err = JobSpec::new("in.wav", "out.xyz", shift, RatePolicy::KeepOriginal);
        assert!(matches!(err, Err(JobSpecError::UnknownOutputFormat(_))));
    }

    #[test]
    fn spec_rejects_off_list_rate() {
        let shift = PitchShift::semitones(1.0).unwrap();
        let err = JobSpec::new("in.wav", "out.wav", shift, RatePolicy::Resample(22050));
        assert!(matches!(err, Err(JobSpecError::UnsupportedRate(22050))));
    }

    #[test]
    fn spec_derives_output_format() {
        let shift = PitchShift::semitones(0.0).unwrap();
        let spec = JobSpec::new("in.mp4", "out.mp4", shift, RatePolicy::KeepOriginal).unwrap();
        assert_eq!(spec.output_format(), OutputFormat::Mp4);
        assert_eq!(spec.job_name(), "in");
    }

    #[test]
    fn suggested_name_encodes_shift() {
        let name = suggest_output_name(
            Path::new("/music/song.flac"),
            4.0,
            PitchUnit::Semitones,
            MediaKind::Audio,
        );
        assert_eq!(name, Path::new("/music/song_pitch+4semi.wav"));
    }

    #[test]
    fn output_extension_fixup() {
        assert_eq!(
            fix_output_extension(Path::new("out"), OutputFormat::Mp4),
            Path::new("out.mp4")
        );
        assert_eq!(
            fix_output_extension(Path::new("out.mp4"), OutputFormat::Mp4),
            Path::new("out.mp4")
        );
        assert_eq!(
            fix_output_extension(Path::new("out.wav"), OutputFormat::Mp3),
            Path::new("out.wav.mp3")
        );
    }
}
