//! Speaker embedding derivation tests.

use echotwin_core::config::{EmbeddingConfig, FeatureConfig, EMBED_DIM};
use echotwin_core::features::{extract_spectrogram, track_pitch};
use echotwin_core::rng::{create_component_rng, create_rng, TRAINING_STREAM};
use echotwin_core::speaker::derive_with_report;
use echotwin_core::{derive_embedding, FeatureMatrix, Waveform};
use pretty_assertions::assert_eq;

fn features(len: usize) -> (FeatureMatrix, Vec<f32>) {
    let samples: Vec<f32> = (0..len)
        .map(|i| 0.3 * (i as f32 * 0.05).sin() + 0.05 * (i as f32 * 0.9).cos())
        .collect();
    let wave = Waveform::new(samples, 16000);
    let config = FeatureConfig::default();
    (
        extract_spectrogram(&wave, &config).unwrap(),
        track_pitch(&wave, &config).unwrap(),
    )
}

#[test]
fn test_length_and_unit_norm() {
    let config = EmbeddingConfig::default();
    for len in [1024, 5000, 16000] {
        let (spec, pitch) = features(len);
        let embedding = derive_embedding(&spec, &pitch, &config, &mut create_rng(9)).unwrap();
        assert_eq!(embedding.len(), EMBED_DIM);
        assert!((embedding.norm() - 1.0).abs() < 1e-5, "norm {}", embedding.norm());
    }
}

#[test]
fn test_seeded_runs_are_identical() {
    let (spec, pitch) = features(8000);
    let config = EmbeddingConfig::default();

    let mut rng_a = create_component_rng(5, TRAINING_STREAM);
    let mut rng_b = create_component_rng(5, TRAINING_STREAM);
    let a = derive_embedding(&spec, &pitch, &config, &mut rng_a).unwrap();
    let b = derive_embedding(&spec, &pitch, &config, &mut rng_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_seeds_differ() {
    let (spec, pitch) = features(8000);
    let config = EmbeddingConfig::default();

    let a = derive_embedding(&spec, &pitch, &config, &mut create_rng(1)).unwrap();
    let b = derive_embedding(&spec, &pitch, &config, &mut create_rng(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_perturbation_stays_small() {
    // Annealed noise adds at most a few thousandths before normalization,
    // so the direction barely moves away from the zero-noise result.
    let (spec, pitch) = features(8000);
    let quiet = EmbeddingConfig {
        noise_std: 0.0,
        ..EmbeddingConfig::default()
    };
    let reference = derive_embedding(&spec, &pitch, &quiet, &mut create_rng(0)).unwrap();
    let noisy =
        derive_embedding(&spec, &pitch, &EmbeddingConfig::default(), &mut create_rng(0)).unwrap();

    let dot: f32 = reference
        .as_slice()
        .iter()
        .zip(noisy.as_slice())
        .map(|(a, b)| a * b)
        .sum();
    assert!(dot > 0.999, "cosine {}", dot);
}

#[test]
fn test_all_zero_spectrogram_stays_unnormalized() {
    let spec = FeatureMatrix::zeros(80, 10);
    let quiet = EmbeddingConfig {
        noise_std: 0.0,
        ..EmbeddingConfig::default()
    };
    let embedding = derive_embedding(&spec, &[0.0; 10], &quiet, &mut create_rng(0)).unwrap();
    assert_eq!(embedding.len(), EMBED_DIM);
    assert_eq!(embedding.norm(), 0.0);
}

#[test]
fn test_losses_reported_but_not_fed_back() {
    let (spec, pitch) = features(4000);
    let config = EmbeddingConfig {
        epochs: 5,
        ..EmbeddingConfig::default()
    };
    let report = derive_with_report(&spec, &pitch, &config, &mut create_rng(4)).unwrap();
    assert_eq!(report.epoch_losses.len(), 5);
    assert!((report.embedding.norm() - 1.0).abs() < 1e-5);
}
