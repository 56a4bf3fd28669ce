/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type raised by the up/down engine.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::fmt;

use ferreus_sparse_grid::{GridPoint, GridType};

use crate::config::AccelerationMode;

/// Errors raised when configuring or applying an up/down operator.
///
/// Configuration errors (`UnsupportedGridType`, `UnsupportedAcceleration`,
/// `MissingBoundaryPoint`, `MissingHierarchicalParent`) are reported when an
/// operator is constructed. The remaining variants reject malformed inputs
/// to an individual application.
#[derive(Debug, Clone, PartialEq)]
pub enum UpDownError {
    /// The grid's basis family has no up/down kernels.
    UnsupportedGridType { grid_type: GridType },

    /// The requested acceleration mode is recognised but not available.
    UnsupportedAcceleration { mode: AccelerationMode },

    /// A dimension index is not below the grid dimensionality.
    DimensionOutOfRange { dim: usize, num_dims: usize },

    /// A coefficient or result vector does not hold one entry per grid point.
    SizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A boundary grid point lacks one of its level-zero neighbours along `dim`.
    MissingBoundaryPoint { point: GridPoint, dim: usize },

    /// A grid point lacks its hierarchical parent along `dim`.
    MissingHierarchicalParent { point: GridPoint, dim: usize },

    /// The dimension-to-kernel mapping does not cover every grid dimension.
    KernelMapping { expected: usize, found: usize },

    /// An operator coefficient vector or matrix has the wrong shape.
    CoefficientShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for UpDownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpDownError::UnsupportedGridType { grid_type } => {
                write!(f, "unsupported configuration: grid type {:?} has no up/down kernels", grid_type)
            }
            UpDownError::UnsupportedAcceleration { mode } => {
                write!(f, "unsupported configuration: acceleration mode {:?} is not available", mode)
            }
            UpDownError::DimensionOutOfRange { dim, num_dims } => write!(
                f,
                "dimension {} is out of range for a grid with {} dimensions",
                dim, num_dims
            ),
            UpDownError::SizeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{} has {} entries, expected one per grid point ({})",
                what, found, expected
            ),
            UpDownError::MissingBoundaryPoint { point, dim } => write!(
                f,
                "grid point {} has no level-zero boundary neighbours in dimension {}",
                point, dim
            ),
            UpDownError::MissingHierarchicalParent { point, dim } => write!(
                f,
                "grid point {} has no hierarchical parent in dimension {}",
                point, dim
            ),
            UpDownError::KernelMapping { expected, found } => write!(
                f,
                "kernel mapping covers {} dimensions, grid has {}",
                found, expected
            ),
            UpDownError::CoefficientShape { expected, found } => write!(
                f,
                "operator coefficient has shape {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for UpDownError {}

/// Checks that the slice named `what` holds `expected` entries.
///
/// ### Errors
/// `SizeMismatch` otherwise.
#[inline]
pub fn check_len(what: &'static str, found: usize, expected: usize) -> Result<(), UpDownError> {
    if found != expected {
        return Err(UpDownError::SizeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
