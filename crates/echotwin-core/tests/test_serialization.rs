//! Array and embedding file round-trips and failure modes.

use std::fs;

use echotwin_core::config::FeatureConfig;
use echotwin_core::features::{extract_spectrogram, track_pitch};
use echotwin_core::serialize::{
    decode_array, encode_matrix, encode_vector, load_array, load_embedding, load_matrix,
    load_vector, save_embedding, save_matrix, save_vector, NpyArray,
};
use echotwin_core::{EchoError, FeatureMatrix, Waveform};
use pretty_assertions::assert_eq;

fn speech_like() -> Waveform {
    let samples = (0..6000)
        .map(|i| {
            let t = i as f32 / 16000.0;
            0.4 * (std::f32::consts::TAU * 150.0 * t).sin() + 0.1 * (t * 9000.0).sin()
        })
        .collect();
    Waveform::new(samples, 16000)
}

#[test]
fn test_feature_arrays_round_trip_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let config = FeatureConfig::default();
    let wave = speech_like();
    let spec = extract_spectrogram(&wave, &config).unwrap();
    let pitch = track_pitch(&wave, &config).unwrap();

    let mel_path = dir.path().join("mel.npy");
    let f0_path = dir.path().join("f0.npy");
    save_matrix(&mel_path, &spec).unwrap();
    save_vector(&f0_path, &pitch).unwrap();

    let spec_back = load_matrix(&mel_path).unwrap();
    let pitch_back = load_vector(&f0_path).unwrap();
    assert_eq!(spec_back.shape(), spec.shape());
    assert!(spec_back
        .as_slice()
        .iter()
        .zip(spec.as_slice())
        .all(|(a, b)| a.to_bits() == b.to_bits()));
    assert!(pitch_back
        .iter()
        .zip(&pitch)
        .all(|(a, b)| a.to_bits() == b.to_bits()));
    assert_eq!(pitch_back.len(), pitch.len());
}

#[test]
fn test_payload_is_16_byte_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f0.npy");
    save_vector(&path, &[1.0, 2.0, 3.0]).unwrap();

    let bytes = fs::read(&path).unwrap();
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    assert_eq!((10 + header_len) % 16, 0);
    assert_eq!(bytes[10 + header_len - 1], b'\n');
    assert_eq!(bytes.len(), 10 + header_len + 12);
}

#[test]
fn test_reads_header_with_unaligned_padding() {
    // Older writers padded one byte past the 16-byte boundary.
    let text = "{'descr': '<f4', 'fortran_order': False, 'shape': (2, 1), }";
    let padding = 16 - (text.len() + 10) % 16;
    let header = format!("{}{}\n", text, " ".repeat(padding));

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(&0.5f32.to_le_bytes());
    bytes.extend_from_slice(&(-0.5f32).to_le_bytes());

    match decode_array(&bytes).unwrap() {
        NpyArray::Matrix(m) => {
            assert_eq!(m.shape(), (2, 1));
            assert_eq!(m.get(1, 0), -0.5);
        }
        other => panic!("expected matrix, got {:?}", other),
    }
}

#[test]
fn test_reads_version_2_header_with_u32_length() {
    let text = "{'descr': '<f4', 'fortran_order': False, 'shape': (2,), }";
    let padding = (16 - (text.len() + 13) % 16) % 16;
    let header = format!("{}{}\n", text, " ".repeat(padding));

    let mut bytes = b"\x93NUMPY\x02\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u32).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    assert_eq!(bytes.len() % 16, 0);
    bytes.extend_from_slice(&1.5f32.to_le_bytes());
    bytes.extend_from_slice(&2.5f32.to_le_bytes());

    match decode_array(&bytes).unwrap() {
        NpyArray::Vector(values) => assert_eq!(values, vec![1.5, 2.5]),
        other => panic!("expected vector, got {:?}", other),
    }
}

#[test]
fn test_unknown_version_is_format_error() {
    let mut bytes = encode_vector(&[1.0]);
    bytes[6] = 4;
    assert!(matches!(decode_array(&bytes), Err(EchoError::Format { .. })));
}

#[test]
fn test_trailing_payload_is_format_error() {
    let mut bytes = encode_vector(&[1.0, 2.0]);
    bytes.extend_from_slice(&3.0f32.to_le_bytes());

    let err = decode_array(&bytes).unwrap_err();
    assert!(matches!(err, EchoError::Format { .. }));
    assert!(err.to_string().contains("12 bytes"));
}

#[test]
fn test_non_finite_embedding_file_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voice.vec");
    save_embedding(&path, &[0.25, f32::INFINITY]).unwrap();
    assert!(matches!(load_embedding(&path), Err(EchoError::Format { .. })));
}

#[test]
fn test_missing_shape_is_format_error() {
    let good = encode_matrix(&FeatureMatrix::zeros(2, 2));
    let text = String::from_utf8_lossy(&good[10..]).replace("'shape'", "'shape_'");
    let mut bytes = good[..10].to_vec();
    bytes.extend_from_slice(text.as_bytes());

    let err = decode_array(&bytes).unwrap_err();
    assert!(matches!(err, EchoError::Format { .. }));
    assert!(err.to_string().contains("shape"));
}

#[test]
fn test_truncated_payload_is_format_error() {
    let mut bytes = encode_matrix(&FeatureMatrix::zeros(4, 4));
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(decode_array(&bytes), Err(EchoError::Format { .. })));
}

#[test]
fn test_wrong_dtype_is_format_error() {
    let good = encode_matrix(&FeatureMatrix::zeros(1, 1));
    let text = String::from_utf8_lossy(&good[10..]).replace("<f4", "<f8");
    let mut bytes = good[..10].to_vec();
    bytes.extend_from_slice(text.as_bytes());
    assert!(matches!(decode_array(&bytes), Err(EchoError::Format { .. })));
}

#[test]
fn test_bad_magic_is_format_error() {
    let mut bytes = encode_matrix(&FeatureMatrix::zeros(1, 1));
    bytes[1] = b'X';
    assert!(matches!(decode_array(&bytes), Err(EchoError::Format { .. })));
}

#[test]
fn test_missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.npy");
    assert!(matches!(load_array(&absent), Err(EchoError::Io { .. })));
    assert!(matches!(load_embedding(&absent), Err(EchoError::Io { .. })));
}

#[test]
fn test_embedding_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voice.vec");
    let values: Vec<f32> = (0..256).map(|i| (i as f32 * 0.37).sin() / 16.0).collect();

    save_embedding(&path, &values).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 256);
    assert_eq!(bytes.len(), 4 + 256 * 4);

    let back = load_embedding(&path).unwrap();
    assert_eq!(back, values);
}
