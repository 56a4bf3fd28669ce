/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the concrete sparse grid operator crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Sparse grid operators
//!
//! Matrix-free PDE operators on sparse grids, built as weighted sums of
//! tensor products of 1D bilinear forms and applied with the Up/Down
//! composer from [`ferreus_updown`].
//!
//! # Features:
//! - Mass, Laplace, heat equation, advection, anisotropic diffusion and
//!   coordinate weighted mass operators
//! - Arbitrary user-defined tensor product terms
//! - JSON-serializable operator descriptions
//! - Deterministic parallel evaluation of terms
//! - Optional dense caching of an operator for repeated application
//!
//! # Example
//!
//! ```
//! use ferreus_sparse_grid::{GridStorage, GridType};
//! use ferreus_updown::UpDownParams;
//! use ferreus_updown_ops::{OperationMatrix, SeparableOperator};
//!
//! let grid = GridStorage::regular(3, 4, GridType::LinearBoundary)?;
//!
//! // System matrix of one implicit Euler step of the heat equation
//! let dt = 0.01;
//! let op = SeparableOperator::mass_laplace(&grid, 1.0, dt, UpDownParams::default())?;
//!
//! let alpha = vec![1.0; grid.size()];
//! let mut result = vec![0.0; grid.size()];
//! op.mult(&alpha, &mut result)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
mod materialized;
mod operation;
pub mod progress;
mod separable;

#[doc(inline)]
pub use {
    config::{OperatorConfig, OperatorConfigBuilder, OperatorSpec},
    materialized::{assemble_dense, MaterializedOperator},
    operation::OperationMatrix,
    separable::{SeparableOperator, Term},
};
