/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the hierarchical sparse grid storage crate.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Sparse grid storage
//!
//! Stores d-dimensional sparse grid points, each addressed per dimension by a
//! hierarchical `(level, index)` pair, and assigns every point a dense sequence
//! number used to index flat coefficient vectors.
//!
//! # Features:
//! - Regular grids with and without level-zero boundary points
//! - Incremental leaf tracking on insertion
//! - Immutable [`GridPosition`] navigation (children, neighbours, parents, boundary points)
//! - Affine [`BoundingBox`] with optional Dirichlet boundaries
//! - Algorithmic dimension subsets selecting the dimensions operators act on
//! - Versioned JSON save/load
//!
//! # Example
//!
//! ```
//! use ferreus_sparse_grid::{GridPosition, GridStorage, GridType};
//!
//! let grid = GridStorage::regular(2, 3, GridType::LinearBoundary)?;
//!
//! // Walk from the corner point to the centre of the first dimension
//! let corner = GridPosition::level_zero(&grid);
//! let centre = corner.top(0);
//! assert!(centre.exists());
//! assert_eq!(centre.get(0), (1, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bounding_box;
mod grid_io;
mod point;
mod position;
mod storage;

#[doc(inline)]
pub use {
    bounding_box::{BoundingBox, BoundingInterval},
    grid_io::GridIOError,
    point::{is_valid_pair, GridPoint, Index, Level, MAX_LEVEL},
    position::GridPosition,
    storage::{GridError, GridStorage, GridType},
};
