//! Inspect command implementation
//!
//! Describes an array (`.npy`) or embedding (`.vec`) file.

use anyhow::{Context, Result};
use colored::Colorize;
use echotwin_core::serialize::atomic::read_file;
use echotwin_core::serialize::npy::NPY_MAGIC;
use echotwin_core::serialize::{decode_array, decode_embedding, NpyArray};
use std::path::Path;
use std::process::ExitCode;

/// Kind of file, decided by its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Array,
    Embedding,
}

/// Array files start with the array magic; anything else is read as an embedding.
pub fn detect_kind(bytes: &[u8]) -> FileKind {
    if bytes.starts_with(NPY_MAGIC) {
        FileKind::Array
    } else {
        FileKind::Embedding
    }
}

/// Builds the description lines printed for `bytes`.
pub fn describe(bytes: &[u8]) -> Result<Vec<String>> {
    let lines = match detect_kind(bytes) {
        FileKind::Array => match decode_array(bytes)? {
            NpyArray::Vector(values) => {
                let nonzero = values.iter().filter(|&&v| v != 0.0).count();
                vec![
                    format!("array <f4, shape ({},)", values.len()),
                    format!("{} non-zero values", nonzero),
                ]
            }
            NpyArray::Matrix(matrix) => {
                let (min, max) = matrix
                    .as_slice()
                    .iter()
                    .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                let mut lines = vec![format!(
                    "array <f4, shape ({}, {})",
                    matrix.rows(),
                    matrix.cols()
                )];
                if !matrix.is_empty() {
                    lines.push(format!("range [{:.4}, {:.4}]", min, max));
                }
                lines
            }
        },
        FileKind::Embedding => {
            let values = decode_embedding(bytes)?;
            let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
            vec![
                format!("embedding, {} dims", values.len()),
                format!("norm {:.6}", norm),
            ]
        }
    };
    Ok(lines)
}

/// Run the inspect command
pub fn run(file: &str) -> Result<ExitCode> {
    println!("{} {}", "Inspecting:".cyan().bold(), file);

    let bytes = read_file(Path::new(file))?;
    let lines = describe(&bytes).with_context(|| format!("Failed to decode {}", file))?;
    for line in lines {
        println!("  {}", line);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use echotwin_core::serialize::{encode_embedding, encode_matrix, encode_vector};
    use echotwin_core::FeatureMatrix;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_matrix() {
        let matrix = FeatureMatrix::from_row_major(2, 2, vec![-1.0, 0.0, 0.5, 2.0]).unwrap();
        let lines = describe(&encode_matrix(&matrix)).unwrap();
        assert_eq!(
            lines,
            vec!["array <f4, shape (2, 2)".to_string(), "range [-1.0000, 2.0000]".to_string()]
        );
    }

    #[test]
    fn test_describe_vector() {
        let lines = describe(&encode_vector(&[0.0, 120.0, 0.0])).unwrap();
        assert_eq!(lines[0], "array <f4, shape (3,)");
        assert_eq!(lines[1], "1 non-zero values");
    }

    #[test]
    fn test_describe_embedding() {
        let bytes = encode_embedding(&[0.6, 0.8]).unwrap();
        assert_eq!(detect_kind(&bytes), FileKind::Embedding);
        let lines = describe(&bytes).unwrap();
        assert_eq!(lines, vec!["embedding, 2 dims".to_string(), "norm 1.000000".to_string()]);
    }

    #[test]
    fn test_describe_garbage_fails() {
        assert!(describe(&[1, 2, 3]).is_err());
    }
}
