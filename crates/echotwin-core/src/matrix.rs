//! Dense row-major 2-D float array.

use crate::error::{EchoError, EchoResult};

/// A `rows x cols` array of `f32`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// Creates a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps row-major data, checking that its length matches the shape.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f32>) -> EchoResult<Self> {
        if data.len() != rows * cols {
            return Err(EchoError::data(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.cols + col] = value;
    }

    /// Mean over all rows of one column.
    pub fn column_mean(&self, col: usize) -> f32 {
        let sum: f32 = (0..self.rows).map(|row| self.get(row, col)).sum();
        sum / self.rows as f32
    }

    /// Row-major view of the values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
