/////////////////////////////////////////////////////////////////////////////////////////////
//
// Walks every 1D line of a sparse grid along one dimension and applies a functor to its root.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_sparse_grid::{GridPosition, GridStorage};

use crate::error::{check_len, UpDownError};

/// Work applied to the root of one 1D line of the grid.
///
/// `pos` is the line root: `(0, 0)` in the swept dimension on grids with
/// boundary, `(1, 1)` otherwise. The functor is responsible for the whole
/// line below it and must only write `result` at sequence numbers on that line.
pub trait SweepFunctor: Sync {
    fn apply(&self, source: &[f64], result: &mut [f64], pos: &GridPosition<'_>, dim: usize);
}

/// Drives a [`SweepFunctor`] over every 1D line of a grid along one dimension.
pub struct Sweep<'a, F> {
    storage: &'a GridStorage,
    functor: F,
}

impl<'a, F: SweepFunctor> Sweep<'a, F> {
    pub fn new(storage: &'a GridStorage, functor: F) -> Self {
        Self { storage, functor }
    }

    /// Applies the functor to every line along `dim`.
    ///
    /// Entries of `result` on unvisited points are left untouched.
    ///
    /// ### Errors
    /// - `DimensionOutOfRange` if `dim` is not below the grid dimensionality.
    /// - `SizeMismatch` if `source` or `result` does not hold one entry per grid point.
    pub fn sweep_1d(
        &self,
        source: &[f64],
        result: &mut [f64],
        dim: usize,
    ) -> Result<(), UpDownError> {
        let num_dims = self.storage.dim();
        if dim >= num_dims {
            return Err(UpDownError::DimensionOutOfRange { dim, num_dims });
        }
        check_len("source", source.len(), self.storage.size())?;
        check_len("result", result.len(), self.storage.size())?;

        self.run(source, result, dim);
        Ok(())
    }

    /// Sweep without argument validation.
    pub(crate) fn run(&self, source: &[f64], result: &mut [f64], dim: usize) {
        if self.storage.size() == 0 {
            return;
        }

        let dim_list: Vec<usize> = (0..self.storage.dim()).filter(|&d| d != dim).collect();

        if self.storage.grid_type().has_boundary() {
            let start = GridPosition::level_zero(self.storage);
            if start.exists() {
                self.boundary_rec(source, result, &start, &dim_list, dim_list.len(), dim);
            }
        } else {
            let start = GridPosition::root(self.storage);
            if start.exists() {
                self.inner_rec(source, result, &start, &dim_list, dim_list.len(), dim);
            }
        }
    }

    // Visits every line root reachable by refining dimensions `dim_list[..dim_rem]`,
    // highest list position first, so each root is reached exactly once.
    fn inner_rec(
        &self,
        source: &[f64],
        result: &mut [f64],
        pos: &GridPosition<'_>,
        dim_list: &[usize],
        dim_rem: usize,
        dim_sweep: usize,
    ) {
        self.functor.apply(source, result, pos, dim_sweep);

        for d in 0..dim_rem {
            if pos.is_leaf() {
                continue;
            }

            let current_dim = dim_list[d];
            let left = pos.left_child(current_dim);
            if left.exists() {
                self.inner_rec(source, result, &left, dim_list, d + 1, dim_sweep);
            }

            let right = left.step_right(current_dim);
            if right.exists() {
                self.inner_rec(source, result, &right, dim_list, d + 1, dim_sweep);
            }
        }
    }

    fn boundary_rec(
        &self,
        source: &[f64],
        result: &mut [f64],
        pos: &GridPosition<'_>,
        dim_list: &[usize],
        dim_rem: usize,
        dim_sweep: usize,
    ) {
        if dim_rem == 0 {
            self.functor.apply(source, result, pos, dim_sweep);
            return;
        }

        let current_dim = dim_list[dim_rem - 1];
        let (level, _) = pos.get(current_dim);

        if level > 0 {
            self.boundary_rec(source, result, pos, dim_list, dim_rem - 1, dim_sweep);

            if !pos.is_leaf() {
                let left = pos.left_child(current_dim);
                if left.exists() {
                    self.boundary_rec(source, result, &left, dim_list, dim_rem, dim_sweep);
                }

                let right = left.step_right(current_dim);
                if right.exists() {
                    self.boundary_rec(source, result, &right, dim_list, dim_rem, dim_sweep);
                }
            }
        } else {
            self.boundary_rec(source, result, pos, dim_list, dim_rem - 1, dim_sweep);

            let right_zero = pos.right_level_zero(current_dim);
            if right_zero.exists() {
                self.boundary_rec(source, result, &right_zero, dim_list, dim_rem - 1, dim_sweep);
            }

            if !pos.is_leaf() {
                let top = pos.top(current_dim);
                if top.exists() {
                    self.boundary_rec(source, result, &top, dim_list, dim_rem, dim_sweep);
                }
            }
        }
    }
}
