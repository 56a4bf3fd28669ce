/////////////////////////////////////////////////////////////////////////////////////////////
//
// Brute-force dense operator matrices by Gauss quadrature of hierarchical hat functions.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Dense reference matrices for validating the up/down algorithm.
//!
//! Every entry is integrated directly with two-point Gauss rules on a mesh
//! finer than any hat in the grid. All integrands are piecewise polynomials
//! of degree at most three on that mesh, so the rule is exact up to rounding.
//! Cost is quadratic in the number of points; intended for small grids.

use std::collections::HashMap;

use faer::Mat;
use ferreus_sparse_grid::{GridStorage, Index, Level};

use crate::registry::KernelType;

const GAUSS_OFFSET: f64 = 0.211_324_865_405_187_1;

/// Canonical hat function of `(level, index)` evaluated at `y` in `[0, 1]`.
#[inline(always)]
pub fn hat(level: Level, index: Index, y: f64) -> f64 {
    match (level, index) {
        (0, 0) => 1.0 - y,
        (0, _) => y,
        _ => {
            let scaled = y * (1u64 << level) as f64 - index as f64;
            (1.0 - scaled.abs()).max(0.0)
        }
    }
}

/// Derivative with respect to `y` of [`hat`]. Kinks take the value of
/// either side; quadrature never samples them.
#[inline(always)]
pub fn hat_derivative(level: Level, index: Index, y: f64) -> f64 {
    match (level, index) {
        (0, 0) => -1.0,
        (0, _) => 1.0,
        _ => {
            let n = (1u64 << level) as f64;
            let scaled = y * n - index as f64;
            if scaled.abs() >= 1.0 {
                0.0
            } else if scaled < 0.0 {
                n
            } else {
                -n
            }
        }
    }
}

fn integrand(kernel: KernelType, test: (Level, Index), trial: (Level, Index), y: f64, q: f64, t: f64) -> f64 {
    let (lt, it) = test;
    let (lr, ir) = trial;

    match kernel {
        KernelType::Mass => q * hat(lt, it, y) * hat(lr, ir, y),
        KernelType::Stiffness => hat_derivative(lt, it, y) * hat_derivative(lr, ir, y) / q,
        KernelType::TrialGradient => hat(lt, it, y) * hat_derivative(lr, ir, y),
        KernelType::TestGradient => hat_derivative(lt, it, y) * hat(lr, ir, y),
        KernelType::WeightedMass => q * (t + q * y) * hat(lt, it, y) * hat(lr, ir, y),
    }
}

/// `B(phi_test, phi_trial)` for the physical interval `[t, t + q]`.
pub fn bilinear_form(
    kernel: KernelType,
    test: (Level, Index),
    trial: (Level, Index),
    q: f64,
    t: f64,
) -> f64 {
    let level = test.0.max(trial.0).max(1);
    let cells = 1u64 << level;
    let width = 1.0 / cells as f64;

    (0..cells)
        .map(|c| {
            let a = c as f64 * width;
            let y0 = a + GAUSS_OFFSET * width;
            let y1 = a + (1.0 - GAUSS_OFFSET) * width;
            0.5 * width * (integrand(kernel, test, trial, y0, q, t) + integrand(kernel, test, trial, y1, q, t))
        })
        .sum()
}

/// Dense 1D matrix `B[a, b] = B(phi_a, phi_b)` over the given hats.
pub fn reference_matrix_1d(points: &[(Level, Index)], kernel: KernelType, q: f64, t: f64) -> Mat<f64> {
    Mat::from_fn(points.len(), points.len(), |a, b| {
        bilinear_form(kernel, points[a], points[b], q, t)
    })
}

/// Dense matrix of the tensor product operator `kernels[0] ⊗ ... ⊗ kernels[d-1]`
/// over all grid points, in sequence order, ignoring Dirichlet flags.
///
/// Dimensions outside the grid's algorithmic dimensions contribute the identity.
pub fn reference_matrix(storage: &GridStorage, kernels: &[KernelType]) -> Mat<f64> {
    let n = storage.size();
    let bb = storage.bounding_box();
    let algorithmic = storage.algorithmic_dimensions();

    // One cache of 1D entries per dimension; grids repeat pairs heavily.
    let mut caches: Vec<HashMap<((Level, Index), (Level, Index)), f64>> =
        vec![HashMap::new(); storage.dim()];

    let mut matrix = Mat::<f64>::zeros(n, n);
    for a in 0..n {
        for b in 0..n {
            let (pa, pb) = (storage.point(a), storage.point(b));
            let mut value = 1.0;

            for (d, cache) in caches.iter_mut().enumerate() {
                let key = (pa.get(d), pb.get(d));
                let entry = *cache.entry(key).or_insert_with(|| {
                    if !algorithmic.contains(&d) {
                        return if key.0 == key.1 { 1.0 } else { 0.0 };
                    }
                    bilinear_form(kernels[d], key.0, key.1, bb.interval_width(d), bb.interval_offset(d))
                });
                value *= entry;
                if value == 0.0 {
                    break;
                }
            }

            matrix[(a, b)] = value;
        }
    }

    matrix
}
