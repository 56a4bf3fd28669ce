/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the matrix-free operator trait shared by all sparse grid operators.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, MatRef};
use ferreus_updown::UpDownError;

/// A linear operator on sparse grid coefficient vectors, applied without
/// forming its matrix.
pub trait OperationMatrix: Send + Sync {
    /// Number of grid points; the operator is `size x size`.
    fn size(&self) -> usize;

    /// Overwrites `result` with the operator applied to `alpha`.
    ///
    /// ### Errors
    /// - `SizeMismatch` if `alpha` or `result` does not hold `size()` entries.
    fn mult(&self, alpha: &[f64], result: &mut [f64]) -> Result<(), UpDownError>;

    /// Applies the operator to every column of `weights`.
    fn matvec(&self, weights: &MatRef<f64>) -> Result<Mat<f64>, UpDownError> {
        let n = self.size();
        if weights.nrows() != n {
            return Err(UpDownError::SizeMismatch {
                what: "weights",
                expected: n,
                found: weights.nrows(),
            });
        }

        let mut out = Mat::<f64>::zeros(n, weights.ncols());
        let mut alpha = vec![0.0; n];
        let mut result = vec![0.0; n];

        for j in 0..weights.ncols() {
            for (i, a) in alpha.iter_mut().enumerate() {
                *a = weights[(i, j)];
            }
            self.mult(&alpha, &mut result)?;
            for (i, &r) in result.iter().enumerate() {
                out[(i, j)] = r;
            }
        }

        Ok(out)
    }
}
