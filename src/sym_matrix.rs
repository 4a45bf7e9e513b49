//! Packed symmetric matrix storage.
//!
//! Only the lower triangle (row-major, `j <= i`) is stored. Element `(i, j)` and
//! `(j, i)` share one slot, so symmetry holds by construction.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::error::{FumiOptError, Result};

/// An `n x n` symmetric matrix stored as a packed lower triangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PackedRepr")]
pub struct SymMatrix {
    dim: usize,
    data: Vec<f64>,
}

/// Serialized form, checked before it becomes a [`SymMatrix`].
#[derive(Deserialize)]
struct PackedRepr {
    dim: usize,
    data: Vec<f64>,
}

impl TryFrom<PackedRepr> for SymMatrix {
    type Error = FumiOptError;

    fn try_from(repr: PackedRepr) -> Result<Self> {
        SymMatrix::from_packed(repr.dim, repr.data)
    }
}

/// Position of `(i, j)` in the packed lower triangle.
#[inline]
fn packed_index(i: usize, j: usize) -> usize {
    let (row, col) = if i >= j { (i, j) } else { (j, i) };
    row * (row + 1) / 2 + col
}

impl SymMatrix {
    /// Create an `n x n` zero matrix.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * (dim + 1) / 2],
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::new(dim);
        for i in 0..dim {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from a dense square matrix, reading its lower triangle.
    ///
    /// The upper triangle of `dense` is ignored.
    pub fn from_array2(dense: &Array2<f64>) -> Result<Self> {
        let (rows, cols) = dense.dim();
        if rows != cols {
            return Err(FumiOptError::DimensionMismatch(format!(
                "Expected a square matrix, got {}x{}",
                rows, cols
            )));
        }

        let mut m = Self::new(rows);
        for i in 0..rows {
            for j in 0..=i {
                m.set(i, j, dense[[i, j]]);
            }
        }
        Ok(m)
    }

    /// Wrap an existing packed lower triangle.
    ///
    /// `data` must hold exactly `dim * (dim + 1) / 2` values.
    pub fn from_packed(dim: usize, data: Vec<f64>) -> Result<Self> {
        let expected = dim * (dim + 1) / 2;
        if data.len() != expected {
            return Err(FumiOptError::DimensionMismatch(format!(
                "Packed {}x{} matrix needs {} values, got {}",
                dim,
                dim,
                expected,
                data.len()
            )));
        }
        Ok(Self { dim, data })
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element `(i, j)`; `(j, i)` returns the same value.
    ///
    /// Panics when an index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.dim && j < self.dim,
            "index ({}, {}) out of range for {}x{} matrix",
            i,
            j,
            self.dim,
            self.dim
        );
        self.data[packed_index(i, j)]
    }

    /// Set element `(i, j)` and, implicitly, `(j, i)`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(
            i < self.dim && j < self.dim,
            "index ({}, {}) out of range for {}x{} matrix",
            i,
            j,
            self.dim,
            self.dim
        );
        self.data[packed_index(i, j)] = value;
    }

    /// The packed lower triangle, row by row.
    pub fn as_packed(&self) -> &[f64] {
        &self.data
    }

    /// Expand into a dense matrix.
    pub fn to_array2(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.dim, self.dim), |(i, j)| self.get(i, j))
    }
}

impl Index<(usize, usize)> for SymMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(
            i < self.dim && j < self.dim,
            "index ({}, {}) out of range for {}x{} matrix",
            i,
            j,
            self.dim,
            self.dim
        );
        &self.data[packed_index(i, j)]
    }
}

impl fmt::Display for SymMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.dim {
            let row: Vec<String> = (0..self.dim)
                .map(|j| format!("{:12.5e}", self.get(i, j)))
                .collect();
            writeln!(f, "[{}]", row.join(" "))?;
        }
        Ok(())
    }
}
