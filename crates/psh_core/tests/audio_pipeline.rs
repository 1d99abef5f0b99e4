//! End-to-end tests for the audio path (WAV in, WAV out).
//!
//! These run the real pipeline through the processor: decode, shift,
//! write. No external transcoder is needed for WAV-to-WAV jobs.

use std::fs;
use std::path::{Path, PathBuf};

use psh_core::audio::{read_wav, write_wav};
use psh_core::config::Settings;
use psh_core::models::{JobSpec, PitchShift, PitchUnit, RatePolicy, SampleBuffer};
use psh_core::orchestrator::{ErrorKind, JobProcessor, JobResult};

/// Generate a mono sine WAV at the given frequency.
fn write_sine_wav(path: &Path, freq: f32, rate: u32, seconds: f32) {
    let frames = (rate as f32 * seconds) as usize;
    let channel: Vec<f32> = (0..frames)
        .map(|i| (std::f32::consts::TAU * freq * i as f32 / rate as f32).sin() * 0.6)
        .collect();
    let buffer = SampleBuffer::from_channels(vec![channel], rate).unwrap();
    write_wav(&buffer, path).unwrap();
}

/// Estimate a tone's frequency from zero crossings over the middle of
/// the signal (edges carry windowing artifacts).
fn estimate_frequency(samples: &[f32], rate: u32) -> f64 {
    let len = samples.len();
    let mid = &samples[len / 4..len * 3 / 4];
    let crossings = mid
        .windows(2)
        .filter(|w| (w[0] <= 0.0) != (w[1] <= 0.0))
        .count();
    let seconds = mid.len() as f64 / rate as f64;
    crossings as f64 / (2.0 * seconds)
}

fn run_job(root: &Path, spec: &JobSpec) -> JobResult {
    let processor = JobProcessor::new(
        Settings::default(),
        root.join("logs"),
        root.join("temp"),
    );
    processor.process_job("e2e", spec, None, None, None)
}

fn temp_artifacts(root: &Path) -> Vec<PathBuf> {
    let temp = root.join("temp");
    if !temp.exists() {
        return Vec::new();
    }
    fs::read_dir(temp)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

#[test]
fn shift_up_keeps_rate_and_duration_and_raises_pitch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("tone_up.wav");
    write_sine_wav(&input, 440.0, 44100, 2.0);

    let spec = JobSpec::new(
        &input,
        &output,
        PitchShift::new(4.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();

    let result = run_job(dir.path(), &spec);
    assert!(result.success, "job failed: {:?}", result.error);
    assert_eq!(result.steps_completed, vec!["Load", "Shift", "Write"]);

    let out = read_wav(&output).unwrap();
    assert_eq!(out.sample_rate(), 44100);
    assert_eq!(out.channel_count(), 1);
    // Duration preserved to within one frame of the input
    assert_eq!(out.frames(), 2 * 44100);

    // +4 semitones is a factor of 2^(4/12) ~ 1.26
    let freq = estimate_frequency(&out.channels()[0], 44100);
    let expected = 440.0 * 2f64.powf(4.0 / 12.0);
    assert!(
        (freq / expected - 1.0).abs() < 0.08,
        "estimated {} Hz, expected about {} Hz",
        freq,
        expected
    );

    assert!(temp_artifacts(dir.path()).is_empty());
}

#[test]
fn two_tones_equal_four_semitones_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    write_sine_wav(&input, 440.0, 44100, 1.0);

    let out_semis = dir.path().join("semis.wav");
    let out_tones = dir.path().join("tones.wav");

    let semis = JobSpec::new(
        &input,
        &out_semis,
        PitchShift::new(4.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();
    let tones = JobSpec::new(
        &input,
        &out_tones,
        PitchShift::new(2.0, PitchUnit::Tones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();

    assert!(run_job(dir.path(), &semis).success);
    assert!(run_job(dir.path(), &tones).success);

    let bytes_semis = fs::read(&out_semis).unwrap();
    let bytes_tones = fs::read(&out_tones).unwrap();
    assert_eq!(bytes_semis, bytes_tones);
}

#[test]
fn resample_policy_sets_output_rate() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("tone_48k.wav");
    write_sine_wav(&input, 440.0, 44100, 1.0);

    let spec = JobSpec::new(
        &input,
        &output,
        PitchShift::new(0.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::Resample(48000),
    )
    .unwrap();

    let result = run_job(dir.path(), &spec);
    assert!(result.success, "job failed: {:?}", result.error);

    let out = read_wav(&output).unwrap();
    assert_eq!(out.sample_rate(), 48000);
    assert_eq!(out.frames(), 48000);
}

#[test]
fn stereo_input_stays_stereo() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("stereo.wav");
    let output = dir.path().join("stereo_down.wav");

    let frames = 44100;
    let left: Vec<f32> = (0..frames)
        .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / 44100.0).sin() * 0.5)
        .collect();
    let right: Vec<f32> = (0..frames)
        .map(|i| (std::f32::consts::TAU * 550.0 * i as f32 / 44100.0).sin() * 0.5)
        .collect();
    let buffer = SampleBuffer::from_channels(vec![left, right], 44100).unwrap();
    write_wav(&buffer, &input).unwrap();

    let spec = JobSpec::new(
        &input,
        &output,
        PitchShift::new(-3.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();

    let result = run_job(dir.path(), &spec);
    assert!(result.success, "job failed: {:?}", result.error);

    let out = read_wav(&output).unwrap();
    assert_eq!(out.channel_count(), 2);
    assert_eq!(out.frames(), frames);
}

#[test]
fn corrupt_input_fails_clean() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.wav");
    let output = dir.path().join("never.wav");
    fs::write(&input, b"RIFF....this is not audio").unwrap();

    let spec = JobSpec::new(
        &input,
        &output,
        PitchShift::new(2.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();

    let result = run_job(dir.path(), &spec);
    assert!(!result.success);
    assert_eq!(result.error.as_ref().unwrap().kind, ErrorKind::DecodeFailed);

    // No partial output, no leaked temp artifacts
    assert!(!output.exists());
    assert!(temp_artifacts(dir.path()).is_empty());
}

#[test]
fn very_short_input_round_trips_at_original_length() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blip.wav");
    let output = dir.path().join("blip_up.wav");

    // Well below one analysis window (2048 samples)
    write_sine_wav(&input, 1000.0, 44100, 0.01);
    let original = read_wav(&input).unwrap();
    assert!(original.frames() < 2048);

    let spec = JobSpec::new(
        &input,
        &output,
        PitchShift::new(5.0, PitchUnit::Semitones).unwrap(),
        RatePolicy::KeepOriginal,
    )
    .unwrap();

    let result = run_job(dir.path(), &spec);
    assert!(result.success, "job failed: {:?}", result.error);

    let out = read_wav(&output).unwrap();
    assert_eq!(out.frames(), original.frames());
}
