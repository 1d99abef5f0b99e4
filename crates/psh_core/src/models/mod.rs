//! Data model: job specifications, media classification, sample buffers.

mod enums;
mod jobs;
mod media;

pub use enums::{
    classify, MediaKind, OutputFormat, PitchUnit, RatePolicy, SUPPORTED_AUDIO_EXTS,
    SUPPORTED_VIDEO_EXTS,
};
pub use jobs::{
    fix_output_extension, suggest_output_name, JobSpec, JobSpecError, PitchShift,
    MAX_SHIFT_SEMITONES,
};
pub use media::{BufferError, SampleBuffer};
