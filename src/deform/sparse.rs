//! Sparse matrix storage and conjugate gradient solve.
//!
//! The constrained Laplacian systems assembled by the solver are symmetric
//! positive definite, so a lightweight CSR matrix plus conjugate gradient
//! covers everything the deformation needs without a factorization library.

use nalgebra::DVector;

use crate::error::{DeformError, Result};

/// A square sparse matrix in compressed sparse row format.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    dim: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build a `dim` x `dim` matrix from (row, col, value) triplets.
    ///
    /// Duplicate entries at the same position are summed.
    pub fn from_triplets(dim: usize, triplets: &[(usize, usize, f64)]) -> Self {
        // Count entries per row, then fill in place.
        let mut counts = vec![0usize; dim + 1];
        for &(row, _, _) in triplets {
            debug_assert!(row < dim);
            counts[row + 1] += 1;
        }
        for i in 0..dim {
            counts[i + 1] += counts[i];
        }

        let mut cols = vec![0usize; triplets.len()];
        let mut vals = vec![0.0f64; triplets.len()];
        let mut cursor = counts.clone();
        for &(row, col, value) in triplets {
            debug_assert!(col < dim);
            let slot = cursor[row];
            cols[slot] = col;
            vals[slot] = value;
            cursor[row] += 1;
        }

        // Sort each row by column and merge duplicates.
        let mut row_ptr = vec![0usize; dim + 1];
        let mut col_idx = Vec::with_capacity(cols.len());
        let mut values = Vec::with_capacity(vals.len());
        for row in 0..dim {
            let span = counts[row]..counts[row + 1];
            let mut entries: Vec<(usize, f64)> = cols[span.clone()]
                .iter()
                .copied()
                .zip(vals[span].iter().copied())
                .collect();
            entries.sort_by_key(|&(col, _)| col);

            for (col, value) in entries {
                match values.last_mut() {
                    Some(last) if col_idx.len() > row_ptr[row] && col_idx.ends_with(&[col]) => {
                        *last += value;
                    }
                    _ => {
                        col_idx.push(col);
                        values.push(value);
                    }
                }
            }
            row_ptr[row + 1] = col_idx.len();
        }

        Self {
            dim,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Compute `y = A * x`.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.dim, "vector dimension mismatch");

        let mut y = DVector::zeros(self.dim);
        for row in 0..self.dim {
            let mut sum = 0.0;
            for k in self.row_ptr[row]..self.row_ptr[row + 1] {
                sum += self.values[k] * x[self.col_idx[k]];
            }
            y[row] = sum;
        }
        y
    }
}

/// Solve `A * x = b` by conjugate gradient, for symmetric positive definite `A`.
///
/// `x0` warm-starts the iteration; the solver returns once the relative
/// residual drops below `tolerance`, and errors with
/// [`DeformError::ConvergenceFailed`] when the budget runs out first.
pub fn conjugate_gradient(
    a: &CsrMatrix,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    max_iterations: usize,
    tolerance: f64,
) -> Result<DVector<f64>> {
    let n = b.len();
    assert_eq!(a.dim(), n, "matrix-vector dimension mismatch");

    let mut x = x0.cloned().unwrap_or_else(|| DVector::zeros(n));

    let b_norm = b.norm();
    if b_norm < 1e-15 {
        return Ok(DVector::zeros(n));
    }

    let mut r = b - a.mul_vec(&x);
    let mut rr = r.dot(&r);
    if rr.sqrt() / b_norm < tolerance {
        return Ok(x);
    }

    let mut p = r.clone();
    for _ in 0..max_iterations {
        let ap = a.mul_vec(&p);
        let p_ap = p.dot(&ap);
        if p_ap.abs() < 1e-15 {
            break;
        }

        let alpha = rr / p_ap;
        x += alpha * &p;
        r -= alpha * &ap;

        let rr_next = r.dot(&r);
        if rr_next.sqrt() / b_norm < tolerance {
            return Ok(x);
        }

        p = &r + (rr_next / rr) * &p;
        rr = rr_next;
    }

    Err(DeformError::ConvergenceFailed {
        iterations: max_iterations,
    })
}
