/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the 1D bilinear form contract applied by the up and down sweeps.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_sparse_grid::{Index, Level};
use serde::{Deserialize, Serialize};

/// Geometry of one hierarchical hat function inside a physical interval.
///
/// `level` and `index` address the hat on the canonical unit interval; `q` and
/// `t` are the width and offset of the physical interval, so the physical
/// coordinate is `x = t + q * y`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cell {
    pub level: Level,
    pub index: Index,
    pub q: f64,
    pub t: f64,
}

impl Cell {
    #[inline(always)]
    pub fn new(level: Level, index: Index, q: f64, t: f64) -> Self {
        Self { level, index, q, t }
    }

    /// Half-width `h = 2^-level` of the hat's canonical support.
    #[inline(always)]
    pub fn h(&self) -> f64 {
        0.5f64.powi(self.level as i32)
    }

    /// Canonical centre `c = index * h`.
    #[inline(always)]
    pub fn centre(&self) -> f64 {
        self.index as f64 * self.h()
    }
}

/// Static properties of a bilinear form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelDescriptor {
    /// A derivative of the test or trial function enters the integrand.
    pub uses_gradient: bool,

    /// The form depends on the interval offset `t`, not only on the width `q`.
    pub uses_offset: bool,

    /// `B(u, v) == B(v, u)`.
    pub symmetric: bool,
}

/// A 1D bilinear form `B(test, trial)` expressed through the local quantities
/// the hierarchical up and down recursions need.
///
/// The recursion itself (boundary sample propagation, left-before-right order,
/// level-zero handling) is shared; implementors only supply the integrals of
/// a single hat against its neighbourhood.
pub trait BilinearKernel: Send + Sync {
    /// `B(phi, g) + alpha * B(phi, phi)` for the hat `phi` of `cell`, where `g`
    /// is linear over the support of `phi` with end values `fl` and `fr`.
    fn down(&self, cell: &Cell, fl: f64, fr: f64, alpha: f64) -> f64;

    /// `(alpha * B(psi_l, phi), alpha * B(psi_r, phi))` where `psi_l` and
    /// `psi_r` are the linear functions over the support of `phi` equal to
    /// one at its left and right end respectively.
    fn up(&self, cell: &Cell, alpha: f64) -> (f64, f64);

    /// `B(phi_a, phi_b)` between the two level-zero boundary hats on the
    /// physical interval `[t, t + q]`. Rows are the test function, columns
    /// the trial function, index 0 is the left hat.
    fn level_zero(&self, q: f64, t: f64) -> [[f64; 2]; 2];

    fn descriptor(&self) -> KernelDescriptor;
}
