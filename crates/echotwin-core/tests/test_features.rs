//! Feature extraction integration tests.

use echotwin_core::config::{FeatureConfig, FFT_SIZE, HOP_LENGTH, MEL_BINS};
use echotwin_core::features::{extract_spectrogram, frame_count, track_pitch};
use echotwin_core::{EchoError, Waveform};

fn sine(freq: f32, amplitude: f32, len: usize) -> Waveform {
    let samples = (0..len)
        .map(|i| amplitude * (std::f32::consts::TAU * freq * i as f32 / 16000.0).sin())
        .collect();
    Waveform::new(samples, 16000)
}

#[test]
fn test_shapes_follow_frame_formula() {
    let config = FeatureConfig::default();
    for len in [FFT_SIZE, FFT_SIZE + 1, 3000, 16000, 20001] {
        let wave = sine(220.0, 0.5, len);
        let expected = (len - FFT_SIZE) / HOP_LENGTH + 1;

        let spec = extract_spectrogram(&wave, &config).unwrap();
        let pitch = track_pitch(&wave, &config).unwrap();

        assert_eq!(spec.shape(), (MEL_BINS, expected), "len {}", len);
        assert_eq!(pitch.len(), expected, "len {}", len);
        assert_eq!(frame_count(len, &config).unwrap(), expected);
    }
}

#[test]
fn test_silence() {
    let config = FeatureConfig::default();
    let wave = Waveform::new(vec![0.0; 16000], 16000);

    let spec = extract_spectrogram(&wave, &config).unwrap();
    let floor = (1e-8f32 + 1e-8f32).log10();
    assert!(spec.as_slice().iter().all(|&v| (v - floor).abs() < 1e-3));

    let pitch = track_pitch(&wave, &config).unwrap();
    assert_eq!(pitch.len(), 59);
    assert!(pitch.iter().all(|&f0| f0 == 0.0));
}

#[test]
fn test_sine_is_voiced_at_a_multiple_of_its_period() {
    let config = FeatureConfig::default();
    let wave = sine(200.0, 0.9, 8000);
    let pitch = track_pitch(&wave, &config).unwrap();

    for &f0 in &pitch {
        assert!(f0 > 0.0);
        // period is 80 samples; the peak may land on any multiple, give or take a sample
        let lag = (16000.0 / f0).round() as usize;
        let offset = lag % 80;
        assert!(offset <= 3 || offset >= 77, "lag {}", lag);
    }
}

#[test]
fn test_pitch_uses_waveform_sample_rate() {
    let config = FeatureConfig::default();
    let wave = Waveform::new(vec![1.0; 2048], 8000);
    let pitch = track_pitch(&wave, &config).unwrap();
    assert!(pitch.iter().all(|&f0| f0 == 8000.0));
}

#[test]
fn test_values_are_finite_for_loud_input() {
    let config = FeatureConfig::default();
    let wave = sine(440.0, 4.0, 4096);
    let spec = extract_spectrogram(&wave, &config).unwrap();
    assert!(spec.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn test_short_input_rejected_by_both_extractors() {
    let config = FeatureConfig::default();
    let wave = Waveform::new(vec![0.2; FFT_SIZE - 1], 16000);
    assert!(matches!(
        extract_spectrogram(&wave, &config),
        Err(EchoError::Data { .. })
    ));
    assert!(matches!(track_pitch(&wave, &config), Err(EchoError::Data { .. })));
}

#[test]
fn test_custom_layout() {
    let config = FeatureConfig {
        fft_size: 256,
        hop_length: 128,
        mel_bins: 16,
        ..FeatureConfig::default()
    };
    let wave = sine(300.0, 0.5, 1024);
    let spec = extract_spectrogram(&wave, &config).unwrap();
    assert_eq!(spec.shape(), (16, 7));
}
