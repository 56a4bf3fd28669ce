/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the matrix-free Up/Down sparse grid operator crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Up/Down
//!
//! Matrix-free application of separable bilinear forms on sparse grids.
//!
//! Discretised operators such as mass, stiffness or advection matrices on a
//! sparse grid are dense in the hierarchical basis, so forming them costs
//! `O(N^2)`. The Up/Down algorithm instead splits each 1D form into a
//! bottom-up and a top-down recursion over the hierarchy, and combines the
//! 1D passes dimension by dimension, applying the operator in
//! `O(d 2^d N)` without ever assembling it.
//!
//! # Features:
//! - Generic sweep driver over every 1D line of a grid
//! - One recursion shared by all bilinear forms; kernels only supply local integrals
//! - Mass, stiffness, trial/test gradient and coordinate weighted mass kernels
//! - Dimension-recursive composer taking a per-dimension kernel mapping
//! - Operators restricted to a grid's algorithmic dimensions, identity elsewhere
//! - Fork-join parallelism with results independent of the thread count
//!
//! # Example
//!
//! ```
//! use ferreus_sparse_grid::{GridStorage, GridType};
//! use ferreus_updown::{Composer, KernelType, UpDownParams};
//!
//! let grid = GridStorage::regular(2, 4, GridType::LinearBoundary)?;
//! let composer = Composer::new(&grid, UpDownParams::default())?;
//!
//! // Apply (stiffness ⊗ mass) to a vector of ones
//! let alpha = vec![1.0; grid.size()];
//! let result = composer.updown(&alpha, &[KernelType::Stiffness, KernelType::Mass])?;
//! assert_eq!(result.len(), grid.size());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # References
//!
//! 1. Balder, R., & Zenger, C. (1996).
//!    *The solution of multidimensional real Helmholtz equations on sparse grids.*
//!    *SIAM Journal on Scientific Computing*, **17**(3), 631–646.
//!
//! 2. Pflüger, D. (2010).
//!    *Spatially Adaptive Sparse Grids for High-Dimensional Problems.*
//!    Verlag Dr. Hut, München.

mod composer;
mod config;
mod error;
mod kernel;
mod kernels;
pub mod reference;
mod registry;
mod sweep;
mod updown_sweep;

#[doc(inline)]
pub use {
    composer::Composer,
    config::{AccelerationMode, UpDownParams, UpDownParamsBuilder},
    error::{check_len, UpDownError},
    kernel::{BilinearKernel, Cell, KernelDescriptor},
    kernels::{
        MassKernel, StiffnessKernel, TestGradientKernel, TrialGradientKernel, WeightedMassKernel,
    },
    registry::KernelType,
    sweep::{Sweep, SweepFunctor},
    updown_sweep::{DownSweep, UpSweep},
};
