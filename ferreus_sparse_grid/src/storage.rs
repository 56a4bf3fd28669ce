/////////////////////////////////////////////////////////////////////////////////////////////
//
// Stores sparse grid points with dense sequence numbers and incremental leaf tracking.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::{collections::HashMap, fmt};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bounding_box::BoundingBox,
    point::{GridPoint, Index, Level, MAX_LEVEL},
};

/// Errors raised while building or modifying a [`GridStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A point, level vector or bounding box does not match the grid dimensionality.
    DimensionMismatch { expected: usize, found: usize },

    /// A `(level, index)` pair does not address a hierarchical basis function
    /// supported by the grid.
    InvalidPoint {
        dim: usize,
        level: Level,
        index: Index,
    },

    /// The point is already stored under sequence number `seq`.
    DuplicatePoint { seq: usize },

    /// A bounding box has a different number of dimensions than the grid,
    /// or one of its intervals is empty.
    BoundingBoxDimension { expected: usize, found: usize },

    /// An algorithmic dimension is not a dimension of the grid.
    AlgorithmicDimension { dim: usize, num_dims: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::DimensionMismatch { expected, found } => write!(
                f,
                "dimension mismatch: expected {} dimensions, found {}",
                expected, found
            ),
            GridError::InvalidPoint { dim, level, index } => write!(
                f,
                "invalid grid point: (level {}, index {}) in dimension {} is not a supported basis function",
                level, index, dim
            ),
            GridError::DuplicatePoint { seq } => {
                write!(f, "grid point already stored with sequence number {}", seq)
            }
            GridError::BoundingBoxDimension { expected, found } => write!(
                f,
                "bounding box mismatch: grid has {} dimensions, bounding box has {} valid intervals",
                expected, found
            ),
            GridError::AlgorithmicDimension { dim, num_dims } => write!(
                f,
                "algorithmic dimension {} out of range for a grid with {} dimensions",
                dim, num_dims
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Basis family a grid is built for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridType {
    /// Piecewise linear hats, zero on the domain boundary.
    Linear,

    /// Piecewise linear hats with the two level-zero boundary functions per dimension.
    LinearBoundary,

    /// Modified linear hats that extrapolate towards the boundary.
    ModLinear,
}

impl GridType {
    /// `true` if the grid carries level-zero boundary points.
    pub fn has_boundary(&self) -> bool {
        matches!(self, GridType::LinearBoundary)
    }
}

/// Ordered set of d-dimensional grid points.
///
/// Each point is assigned a dense sequence number in insertion order. The
/// sequence number indexes flat coefficient and result vectors and stays
/// stable as long as no point is removed.
#[derive(Debug, Clone)]
pub struct GridStorage {
    dim: usize,
    grid_type: GridType,
    points: Vec<GridPoint>,
    leaves: Vec<bool>,
    seq_map: HashMap<GridPoint, usize>,
    bounding_box: BoundingBox,
    algorithmic_dims: Vec<usize>,
}

impl GridStorage {
    /// Creates an empty grid on the unit cube.
    pub fn new(dim: usize, grid_type: GridType) -> Self {
        Self {
            dim,
            grid_type,
            points: Vec::new(),
            leaves: Vec::new(),
            seq_map: HashMap::new(),
            bounding_box: BoundingBox::unit(dim),
            algorithmic_dims: (0..dim).collect(),
        }
    }

    /// Builds a regular sparse grid of the given level.
    ///
    /// For `Linear` and `ModLinear` grids this holds every point with
    /// `sum(l_k) <= level + dim - 1` and `l_k >= 1`. For `LinearBoundary`
    /// grids level-zero points are added and counted as level one in the sum.
    /// Points are inserted in ascending order of their level sum.
    pub fn regular(dim: usize, level: Level, grid_type: GridType) -> Result<Self, GridError> {
        let mut storage = Self::new(dim, grid_type);

        if dim == 0 || level == 0 {
            return Ok(storage);
        }

        let budget = level + dim as u32 - 1;
        let min_level = if grid_type.has_boundary() { 0 } else { 1 };
        let top_level = level.min(MAX_LEVEL);

        let mut level_vectors = Vec::new();
        push_level_vectors(
            dim,
            min_level,
            top_level,
            budget,
            &mut Vec::with_capacity(dim),
            &mut level_vectors,
        );
        level_vectors.sort_by_key(|levels| levels.iter().sum::<u32>());

        for levels in level_vectors {
            let index_vectors = levels
                .iter()
                .map(|&l| indices_on_level(l))
                .multi_cartesian_product();

            for indices in index_vectors {
                storage.insert(GridPoint::new(levels.clone(), indices)?)?;
            }
        }

        Ok(storage)
    }

    /// Inserts a point and returns its sequence number.
    pub fn insert(&mut self, point: GridPoint) -> Result<usize, GridError> {
        if point.dim() != self.dim {
            return Err(GridError::DimensionMismatch {
                expected: self.dim,
                found: point.dim(),
            });
        }

        if !self.grid_type.has_boundary() {
            if let Some(dim) = point.levels().iter().position(|&l| l == 0) {
                let (level, index) = point.get(dim);
                return Err(GridError::InvalidPoint { dim, level, index });
            }
        }

        if let Some(&seq) = self.seq_map.get(&point) {
            return Err(GridError::DuplicatePoint { seq });
        }

        let is_leaf = (0..self.dim).all(|d| {
            point
                .children(d)
                .iter()
                .all(|child| !self.seq_map.contains_key(child))
        });

        for d in 0..self.dim {
            for parent in point.parents(d) {
                if let Some(&parent_seq) = self.seq_map.get(&parent) {
                    self.leaves[parent_seq] = false;
                }
            }
        }

        let seq = self.points.len();
        self.seq_map.insert(point.clone(), seq);
        self.points.push(point);
        self.leaves.push(is_leaf);

        Ok(seq)
    }

    /// Number of stored points.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    /// `true` if `seq` is the end-of-storage sentinel or lies beyond it.
    #[inline(always)]
    pub fn end(&self, seq: usize) -> bool {
        seq >= self.points.len()
    }

    /// Sequence number of `point`, if stored.
    #[inline(always)]
    pub fn seq_of(&self, point: &GridPoint) -> Option<usize> {
        self.seq_map.get(point).copied()
    }

    /// The point stored under `seq`.
    ///
    /// # Panics
    /// Panics if `seq` is not a valid sequence number.
    pub fn point(&self, seq: usize) -> &GridPoint {
        &self.points[seq]
    }

    /// All points in sequence order.
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// `true` if the point under `seq` has no child in any dimension.
    #[inline(always)]
    pub fn is_leaf(&self, seq: usize) -> bool {
        self.leaves[seq]
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Replaces the bounding box. It must span every grid dimension.
    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) -> Result<(), GridError> {
        if bounding_box.dim() != self.dim {
            return Err(GridError::BoundingBoxDimension {
                expected: self.dim,
                found: bounding_box.dim(),
            });
        }
        self.bounding_box = bounding_box;
        Ok(())
    }

    /// Dimensions operators act on. The remaining dimensions are carried
    /// along unchanged. Defaults to every dimension.
    pub fn algorithmic_dimensions(&self) -> &[usize] {
        &self.algorithmic_dims
    }

    /// Restricts operators to `dims`. Duplicates are removed and the list is
    /// kept in ascending order.
    pub fn set_algorithmic_dimensions(&mut self, dims: &[usize]) -> Result<(), GridError> {
        if let Some(&dim) = dims.iter().find(|&&d| d >= self.dim) {
            return Err(GridError::AlgorithmicDimension {
                dim,
                num_dims: self.dim,
            });
        }
        self.algorithmic_dims = dims.iter().copied().sorted_unstable().dedup().collect();
        Ok(())
    }
}

// Appends, in lexicographic order, every level vector extending `current` whose
// cost `sum(max(l_k, 1))` fits in `budget`. Each unfilled dimension costs at least one.
fn push_level_vectors(
    dim: usize,
    min_level: Level,
    top_level: Level,
    budget: u32,
    current: &mut Vec<Level>,
    out: &mut Vec<Vec<Level>>,
) {
    let remaining = dim - current.len();
    if remaining == 0 {
        out.push(current.clone());
        return;
    }

    let spare = budget - (remaining as u32 - 1);
    for level in min_level..=top_level.min(spare) {
        current.push(level);
        push_level_vectors(dim, min_level, top_level, budget - level.max(1), current, out);
        current.pop();
    }
}

fn indices_on_level(level: Level) -> Vec<Index> {
    match level {
        0 => vec![0, 1],
        l => (1..(1u32 << l)).step_by(2).collect(),
    }
}
