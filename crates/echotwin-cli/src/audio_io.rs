//! WAV files at the CLI boundary.
//!
//! Recording happens outside EchoTwin; featurize reads whatever the
//! recorder left on disk and brings it to the analysis rate. Synthesized
//! speech goes out as 16-bit mono PCM, identified by the BLAKE3 hash of
//! its samples.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Context, Result};
use echotwin_core::serialize::atomic::write_atomic;
use echotwin_core::Waveform;
use tracing::{debug, info};

const PCM_BITS: u16 = 16;

/// Reads a WAV file as mono f32 samples at its own rate.
///
/// Integer PCM of any depth and 32-bit float are accepted. Multi-channel
/// input is averaged per frame.
pub fn read_wav(path: &Path) -> Result<Waveform> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("WAV file has no channels: {}", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<f32>, _>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>(),
    }
    .with_context(|| format!("Failed to read samples from {}", path.display()))?;

    let samples = downmix(&interleaved, spec.channels as usize);
    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        frames = samples.len(),
        "read wav"
    );
    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Averages interleaved frames to one channel; a trailing partial frame is dropped.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler for a whole mono buffer.
pub fn resample_linear(input: &[f32], src_hz: u32, dst_hz: u32) -> Vec<f32> {
    if src_hz == dst_hz || input.is_empty() || src_hz == 0 {
        return input.to_vec();
    }

    let new_len = (input.len() as u64 * u64::from(dst_hz) / u64::from(src_hz)) as usize;
    let step = src_hz as f64 / dst_hz as f64;
    (0..new_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = input.get(idx).copied().unwrap_or(0.0);
            let b = input.get(idx + 1).copied().unwrap_or(a);
            a * (1.0 - frac) + b * frac
        })
        .collect()
}

/// Reads `path` and resamples it to `sample_rate` when needed.
pub fn load_voice_sample(path: &Path, sample_rate: u32) -> Result<Waveform> {
    let wave = read_wav(path)?;
    if wave.sample_rate() == sample_rate {
        return Ok(wave);
    }

    debug!(from = wave.sample_rate(), to = sample_rate, "resampling");
    let resampled = resample_linear(wave.samples(), wave.sample_rate(), sample_rate);
    Ok(Waveform::new(resampled, sample_rate))
}

/// A WAV file held in memory.
#[derive(Debug)]
pub struct EncodedWav {
    /// Complete file bytes.
    pub bytes: Vec<u8>,
    /// BLAKE3 hex digest of the little-endian PCM samples.
    pub pcm_hash: String,
    pub sample_rate: u32,
    pub num_samples: usize,
}

impl EncodedWav {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples as f64 / self.sample_rate as f64
    }
}

/// Scales samples to 16-bit integers, clipping to [-1, 1].
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}

/// Encodes a waveform as 16-bit mono PCM.
///
/// Fails on NaN or infinite samples rather than writing them as silence.
pub fn encode_wav(waveform: &Waveform) -> Result<EncodedWav> {
    if let Some(index) = waveform.samples().iter().position(|s| !s.is_finite()) {
        bail!("sample {} is not finite", index);
    }
    let pcm = samples_to_pcm16(waveform.samples());

    let mut hasher = blake3::Hasher::new();
    for sample in &pcm {
        hasher.update(&sample.to_le_bytes());
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: PCM_BITS,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::with_capacity(44 + pcm.len() * 2));
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("Failed to start WAV stream")?;
        for &sample in &pcm {
            writer.write_sample(sample).context("Failed to encode sample")?;
        }
        writer.finalize().context("Failed to finish WAV stream")?;
    }

    Ok(EncodedWav {
        bytes: cursor.into_inner(),
        pcm_hash: hasher.finalize().to_hex().to_string(),
        sample_rate: waveform.sample_rate(),
        num_samples: pcm.len(),
    })
}

/// Encodes `waveform` and writes it to `path` atomically.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<EncodedWav> {
    let wav = encode_wav(waveform)?;
    write_atomic(path, &wav.bytes)?;
    info!(path = %path.display(), samples = wav.num_samples, "wrote wav");
    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_test_wav(path: &Path, spec: hound::WavSpec, frames: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_downmix_averages_frames() {
        assert_eq!(downmix(&[1.0, 0.0, 0.5, 0.5, 0.2], 2), vec![0.5, 0.5]);
        assert_eq!(downmix(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }

    #[test]
    fn test_resample_lengths() {
        let input = vec![0.0; 44100];
        assert_eq!(resample_linear(&input, 44100, 16000).len(), 16000);
        assert_eq!(resample_linear(&input[..8000], 8000, 16000).len(), 16000);
        assert_eq!(resample_linear(&input[..10], 16000, 16000).len(), 10);
    }

    #[test]
    fn test_upsample_interpolates() {
        let out = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_read_stereo_int_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_test_wav(&path, spec, &[16384, 0, -16384, -16384]);

        let wave = read_wav(&path).unwrap();
        assert_eq!(wave.sample_rate(), 16000);
        assert_eq!(wave.samples(), &[0.25, -0.5]);
    }

    #[test]
    fn test_load_voice_sample_resamples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("low.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_test_wav(&path, spec, &[0; 800]);

        let wave = load_voice_sample(&path, 16000).unwrap();
        assert_eq!(wave.sample_rate(), 16000);
        assert_eq!(wave.len(), 1600);
    }

    #[test]
    fn test_pcm_scaling_clips() {
        assert_eq!(samples_to_pcm16(&[2.0, -2.0, 0.0, 0.5]), vec![32767, -32767, 0, 16384]);
    }

    #[test]
    fn test_written_wav_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        let wave = Waveform::new(vec![0.0, 0.5, -0.5, 1.0], 16000);

        let wav = write_wav(&path, &wave).unwrap();
        assert_eq!(wav.num_samples, 4);
        assert_eq!(wav.pcm_hash.len(), 64);
        assert_eq!(std::fs::read(&path).unwrap(), wav.bytes);

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        let pcm: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(pcm, vec![0, 16384, -16384, 32767]);
    }

    #[test]
    fn test_pcm_hash_tracks_samples() {
        let a = Waveform::new(vec![0.1, -0.2, 0.3], 16000);
        let b = Waveform::new(vec![0.1, -0.2, 0.31], 16000);
        assert_eq!(encode_wav(&a).unwrap().pcm_hash, encode_wav(&a).unwrap().pcm_hash);
        assert_ne!(encode_wav(&a).unwrap().pcm_hash, encode_wav(&b).unwrap().pcm_hash);
        assert_eq!(encode_wav(&a).unwrap().duration_seconds(), 3.0 / 16000.0);
    }

    #[test]
    fn test_non_finite_samples_are_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let wave = Waveform::new(vec![0.0, f32::NAN], 16000);
        assert!(write_wav(&path, &wave).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(read_wav(&dir.path().join("nope.wav")).is_err());
    }
}
