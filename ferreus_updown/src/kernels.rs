/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the mass, stiffness, gradient and weighted mass bilinear forms.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::kernel::{BilinearKernel, Cell, KernelDescriptor};

/// L2 inner product `∫ phi_i phi_j dx`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MassKernel;

impl BilinearKernel for MassKernel {
    #[inline(always)]
    fn down(&self, cell: &Cell, fl: f64, fr: f64, alpha: f64) -> f64 {
        let h = cell.h();
        cell.q * (h * 0.5 * (fl + fr) + (2.0 / 3.0) * h * alpha)
    }

    #[inline(always)]
    fn up(&self, cell: &Cell, alpha: f64) -> (f64, f64) {
        let own = 0.5 * alpha * cell.q * cell.h();
        (own, own)
    }

    fn level_zero(&self, q: f64, _t: f64) -> [[f64; 2]; 2] {
        [[q / 3.0, q / 6.0], [q / 6.0, q / 3.0]]
    }

    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor {
            uses_gradient: false,
            uses_offset: false,
            symmetric: true,
        }
    }
}

/// Laplace stiffness `∫ phi_i' phi_j' dx`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StiffnessKernel;

impl BilinearKernel for StiffnessKernel {
    // The derivative of a linear interpolant is constant on the support, so
    // it integrates to zero against phi'. Only the diagonal survives.
    #[inline(always)]
    fn down(&self, cell: &Cell, _fl: f64, _fr: f64, alpha: f64) -> f64 {
        alpha * 2.0 / (cell.h() * cell.q)
    }

    #[inline(always)]
    fn up(&self, _cell: &Cell, _alpha: f64) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn level_zero(&self, q: f64, _t: f64) -> [[f64; 2]; 2] {
        [[1.0 / q, -1.0 / q], [-1.0 / q, 1.0 / q]]
    }

    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor {
            uses_gradient: true,
            uses_offset: false,
            symmetric: true,
        }
    }
}

/// Gradient on the trial function, `∫ phi_i phi_j' dx`.
///
/// Invariant under scaling of the interval width.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrialGradientKernel;

impl BilinearKernel for TrialGradientKernel {
    #[inline(always)]
    fn down(&self, _cell: &Cell, fl: f64, fr: f64, _alpha: f64) -> f64 {
        0.5 * (fr - fl)
    }

    #[inline(always)]
    fn up(&self, _cell: &Cell, alpha: f64) -> (f64, f64) {
        (0.5 * alpha, -0.5 * alpha)
    }

    fn level_zero(&self, _q: f64, _t: f64) -> [[f64; 2]; 2] {
        [[-0.5, 0.5], [-0.5, 0.5]]
    }

    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor {
            uses_gradient: true,
            uses_offset: false,
            symmetric: false,
        }
    }
}

/// Gradient on the test function, `∫ phi_i' phi_j dx`. Transpose of
/// [`TrialGradientKernel`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TestGradientKernel;

impl BilinearKernel for TestGradientKernel {
    #[inline(always)]
    fn down(&self, _cell: &Cell, fl: f64, fr: f64, _alpha: f64) -> f64 {
        0.5 * (fl - fr)
    }

    #[inline(always)]
    fn up(&self, _cell: &Cell, alpha: f64) -> (f64, f64) {
        (-0.5 * alpha, 0.5 * alpha)
    }

    fn level_zero(&self, _q: f64, _t: f64) -> [[f64; 2]; 2] {
        [[-0.5, -0.5], [0.5, 0.5]]
    }

    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor {
            uses_gradient: true,
            uses_offset: false,
            symmetric: false,
        }
    }
}

/// Coordinate weighted mass `∫ x phi_i phi_j dx`, with `x` the physical coordinate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedMassKernel;

impl BilinearKernel for WeightedMassKernel {
    #[inline(always)]
    fn down(&self, cell: &Cell, fl: f64, fr: f64, alpha: f64) -> f64 {
        let (h, c, q, t) = (cell.h(), cell.centre(), cell.q, cell.t);
        let mean = 0.5 * (fl + fr);
        let slope = 0.5 * (fr - fl);

        q * (t * h * mean + q * h * (c * mean + h * slope / 6.0))
            + alpha * q * (t + q * c) * (2.0 / 3.0) * h
    }

    #[inline(always)]
    fn up(&self, cell: &Cell, alpha: f64) -> (f64, f64) {
        let (h, c, q, t) = (cell.h(), cell.centre(), cell.q, cell.t);
        let base = 0.5 * t * h;

        (
            alpha * q * (base + q * h * (0.5 * c - h / 12.0)),
            alpha * q * (base + q * h * (0.5 * c + h / 12.0)),
        )
    }

    fn level_zero(&self, q: f64, t: f64) -> [[f64; 2]; 2] {
        let off_diagonal = q * (t / 6.0 + q / 12.0);
        [
            [q * (t / 3.0 + q / 12.0), off_diagonal],
            [off_diagonal, q * (t / 3.0 + q / 4.0)],
        ]
    }

    fn descriptor(&self) -> KernelDescriptor {
        KernelDescriptor {
            uses_gradient: false,
            uses_offset: true,
            symmetric: true,
        }
    }
}
