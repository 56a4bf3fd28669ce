/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles dense operator matrices by probing and caches them behind the operator trait.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use faer::Mat;
use ferreus_updown::{check_len, UpDownError};
use rayon::prelude::*;

use crate::{
    operation::OperationMatrix,
    progress::{emit, ProgressMsg, ProgressSink},
};

/// Assembles the dense matrix of `op` by applying it to every unit vector.
///
/// Columns are assembled in parallel. If `progress` is set, one
/// `ColumnAssembled` message is emitted per column in completion order.
pub fn assemble_dense<O: OperationMatrix + ?Sized>(
    op: &O,
    progress: Option<Arc<dyn ProgressSink>>,
) -> Result<Mat<f64>, UpDownError> {
    let n = op.size();
    let done = AtomicUsize::new(0);

    let columns: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let mut unit = vec![0.0; n];
            unit[j] = 1.0;
            let mut column = vec![0.0; n];
            op.mult(&unit, &mut column)?;

            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            emit(
                &progress,
                ProgressMsg::ColumnAssembled {
                    column: j,
                    num_columns: n,
                    progress: finished as f64 / n as f64,
                },
            );
            Ok(column)
        })
        .collect::<Result<_, UpDownError>>()?;

    Ok(Mat::from_fn(n, n, |i, j| columns[j][i]))
}

/// Dense cache of an operator: the matrix is assembled once and every
/// subsequent `mult` is a dense matrix-vector product.
///
/// Worth it when an operator is applied many more times than it has rows.
#[derive(Debug, Clone)]
pub struct MaterializedOperator {
    matrix: Mat<f64>,
}

impl MaterializedOperator {
    pub fn new<O: OperationMatrix + ?Sized>(
        op: &O,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, UpDownError> {
        Ok(Self {
            matrix: assemble_dense(op, progress)?,
        })
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }
}

impl OperationMatrix for MaterializedOperator {
    fn size(&self) -> usize {
        self.matrix.nrows()
    }

    fn mult(&self, alpha: &[f64], result: &mut [f64]) -> Result<(), UpDownError> {
        check_len("alpha", alpha.len(), self.size())?;
        check_len("result", result.len(), self.size())?;

        let column = Mat::from_fn(alpha.len(), 1, |i, _| alpha[i]);
        let product = &self.matrix * &column;
        for (i, r) in result.iter_mut().enumerate() {
            *r = product[(i, 0)];
        }
        Ok(())
    }
}
