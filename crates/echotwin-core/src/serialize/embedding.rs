//! Speaker embedding files.
//!
//! A little-endian u32 element count followed by exactly that many
//! little-endian f32 values. No header, no padding. Every value must be
//! finite.

use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::atomic::{read_file, write_atomic};
use crate::error::{EchoError, EchoResult};

/// Encodes a vector.
///
/// # Errors
/// Returns a data error if the vector has more than `u32::MAX` elements.
pub fn encode_embedding(values: &[f32]) -> EchoResult<Vec<u8>> {
    let count = u32::try_from(values.len())
        .map_err(|_| EchoError::data("embedding too long for a u32 count"))?;

    let mut out = Vec::with_capacity(4 + values.len() * 4);
    out.extend_from_slice(&count.to_le_bytes());
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    Ok(out)
}

/// Decodes a vector, requiring the payload to match the stored count exactly.
///
/// # Errors
/// Format error on a length mismatch or a NaN or infinite value.
pub fn decode_embedding(bytes: &[u8]) -> EchoResult<Vec<f32>> {
    let mut reader = bytes;
    let count = reader
        .read_u32::<LittleEndian>()
        .map_err(|_| EchoError::format("embedding file shorter than its 4-byte count"))?
        as usize;

    let expected = count
        .checked_mul(4)
        .ok_or_else(|| EchoError::format("embedding count overflows"))?;
    if reader.len() != expected {
        return Err(EchoError::format(format!(
            "embedding declares {} values ({} bytes) but holds {} bytes",
            count,
            expected,
            reader.len()
        )));
    }

    let mut values = vec![0.0f32; count];
    reader
        .read_f32_into::<LittleEndian>(&mut values)
        .map_err(|_| EchoError::format("embedding payload truncated"))?;

    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(EchoError::format(format!(
            "embedding value {} is {}",
            index, values[index]
        )));
    }
    Ok(values)
}

/// Writes an embedding file.
pub fn save_embedding(path: impl AsRef<Path>, values: &[f32]) -> EchoResult<()> {
    let path = path.as_ref();
    write_atomic(path, &encode_embedding(values)?)?;
    debug!(path = %path.display(), dim = values.len(), "wrote embedding");
    Ok(())
}

/// Reads an embedding file.
pub fn load_embedding(path: impl AsRef<Path>) -> EchoResult<Vec<f32>> {
    let path = path.as_ref();
    let values = decode_embedding(&read_file(path)?)?;
    debug!(path = %path.display(), dim = values.len(), "loaded embedding");
    Ok(values)
}
