/////////////////////////////////////////////////////////////////////////////////////////////
//
// Hierarchical up and down recursions along one dimension, generic over the bilinear form.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Up and down sweep functors.
//!
//! Along one 1D line, `up` accumulates for every hat the form tested against
//! it from all coefficients strictly below it in the hierarchy, and `down`
//! accumulates the contributions of all coefficients above it plus its own
//! diagonal term. Their sum applies the full 1D operator.
//!
//! Both recursions visit the left child before the right child. The order is
//! part of the result: floating point sums are not associative.

use ferreus_sparse_grid::GridPosition;

use crate::{
    kernel::{BilinearKernel, Cell},
    sweep::SweepFunctor,
};

/// Applies the "coarser test, finer trial" half of a 1D operator.
#[derive(Debug, Clone, Copy)]
pub struct UpSweep<K> {
    kernel: K,
}

impl<K: BilinearKernel> UpSweep<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    // Returns the contributions of the subtree under `pos` tested against
    // the two linear shape functions over the support of `pos`.
    fn rec(
        &self,
        source: &[f64],
        result: &mut [f64],
        pos: &GridPosition<'_>,
        dim: usize,
        q: f64,
        t: f64,
    ) -> (f64, f64) {
        let seq = pos.seq();
        let (level, index) = pos.get(dim);

        let (mut fl, mut fml, mut fmr, mut fr) = (0.0, 0.0, 0.0, 0.0);

        if !pos.is_leaf() {
            let left = pos.left_child(dim);
            if left.exists() {
                (fl, fml) = self.rec(source, result, &left, dim, q, t);
            }

            let right = pos.right_child(dim);
            if right.exists() {
                (fmr, fr) = self.rec(source, result, &right, dim, q, t);
            }
        }

        let fm = fml + fmr;
        result[seq] = fm;

        let (own_l, own_r) = self.kernel.up(&Cell::new(level, index, q, t), source[seq]);
        let half = 0.5 * fm;

        (fl + half + own_l, fr + half + own_r)
    }
}

impl<K: BilinearKernel> SweepFunctor for UpSweep<K> {
    fn apply(&self, source: &[f64], result: &mut [f64], pos: &GridPosition<'_>, dim: usize) {
        let bb = pos.storage().bounding_box();
        let (q, t) = (bb.interval_width(dim), bb.interval_offset(dim));

        if pos.get(dim).0 > 0 {
            self.rec(source, result, pos, dim, q, t);
            return;
        }

        let right = pos.right_level_zero(dim);
        if !right.exists() {
            return;
        }
        let (seq_l, seq_r) = (pos.seq(), right.seq());

        let (mut fl, mut fr) = (0.0, 0.0);
        if !pos.is_leaf() {
            let top = pos.top(dim);
            if top.exists() {
                (fl, fr) = self.rec(source, result, &top, dim, q, t);
            }
        }

        let couple = self.kernel.level_zero(q, t);

        result[seq_l] = if bb.has_dirichlet_boundary_left(dim) {
            0.0
        } else {
            fl + couple[0][1] * source[seq_r]
        };

        result[seq_r] = if bb.has_dirichlet_boundary_right(dim) {
            0.0
        } else {
            fr
        };
    }
}

/// Applies the "finer test, coarser or equal trial" half of a 1D operator.
#[derive(Debug, Clone, Copy)]
pub struct DownSweep<K> {
    kernel: K,
}

impl<K: BilinearKernel> DownSweep<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    // `fl` and `fr` are the values of the ancestors' interpolant at the ends
    // of the support of `pos`.
    #[allow(clippy::too_many_arguments)]
    fn rec(
        &self,
        source: &[f64],
        result: &mut [f64],
        pos: &GridPosition<'_>,
        dim: usize,
        fl: f64,
        fr: f64,
        q: f64,
        t: f64,
    ) {
        let seq = pos.seq();
        let (level, index) = pos.get(dim);
        let alpha = source[seq];

        result[seq] = self
            .kernel
            .down(&Cell::new(level, index, q, t), fl, fr, alpha);

        if pos.is_leaf() {
            return;
        }

        let fm = 0.5 * (fl + fr) + alpha;

        let left = pos.left_child(dim);
        if left.exists() {
            self.rec(source, result, &left, dim, fl, fm, q, t);
        }

        let right = pos.right_child(dim);
        if right.exists() {
            self.rec(source, result, &right, dim, fm, fr, q, t);
        }
    }
}

impl<K: BilinearKernel> SweepFunctor for DownSweep<K> {
    fn apply(&self, source: &[f64], result: &mut [f64], pos: &GridPosition<'_>, dim: usize) {
        let bb = pos.storage().bounding_box();
        let (q, t) = (bb.interval_width(dim), bb.interval_offset(dim));

        if pos.get(dim).0 > 0 {
            self.rec(source, result, pos, dim, 0.0, 0.0, q, t);
            return;
        }

        let right = pos.right_level_zero(dim);
        if !right.exists() {
            return;
        }
        let (seq_l, seq_r) = (pos.seq(), right.seq());
        let (src_l, src_r) = (source[seq_l], source[seq_r]);

        let couple = self.kernel.level_zero(q, t);

        result[seq_l] = if bb.has_dirichlet_boundary_left(dim) {
            0.0
        } else {
            couple[0][0] * src_l
        };

        result[seq_r] = if bb.has_dirichlet_boundary_right(dim) {
            0.0
        } else {
            couple[1][1] * src_r + couple[1][0] * src_l
        };

        if !pos.is_leaf() {
            let top = pos.top(dim);
            if top.exists() {
                self.rec(source, result, &top, dim, src_l, src_r, q, t);
            }
        }
    }
}
