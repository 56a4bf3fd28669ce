/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the hierarchical (level, index) grid point and its 1D tree relations.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::storage::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical level of a 1D basis function.
pub type Level = u32;

/// Hierarchical index of a 1D basis function.
pub type Index = u32;

/// Deepest level a point may carry. Keeps `2^level` inside a `u32` index.
pub const MAX_LEVEL: Level = 30;

/// Returns `true` if `(level, index)` addresses a valid hierarchical hat function.
///
/// Level zero holds the two boundary functions (index 0 and 1). Every level
/// `l >= 1` holds the odd indices `1, 3, ..., 2^l - 1`.
#[inline(always)]
pub fn is_valid_pair(level: Level, index: Index) -> bool {
    match level {
        0 => index <= 1,
        l if l > MAX_LEVEL => false,
        l => index % 2 == 1 && index < (1 << l),
    }
}

/// A d-dimensional sparse grid point, addressed per dimension by a `(level, index)` pair.
///
/// Points are immutable once created; navigation produces new points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    levels: Vec<Level>,
    indices: Vec<Index>,
}

impl GridPoint {
    /// Creates a point from per-dimension levels and indices, validating every pair.
    pub fn new(levels: Vec<Level>, indices: Vec<Index>) -> Result<Self, GridError> {
        if levels.len() != indices.len() {
            return Err(GridError::DimensionMismatch {
                expected: levels.len(),
                found: indices.len(),
            });
        }

        for (dim, (&level, &index)) in levels.iter().zip(indices.iter()).enumerate() {
            if !is_valid_pair(level, index) {
                return Err(GridError::InvalidPoint { dim, level, index });
            }
        }

        Ok(Self { levels, indices })
    }

    /// The point with `(0, 0)` in every dimension.
    pub fn level_zero(dim: usize) -> Self {
        Self {
            levels: vec![0; dim],
            indices: vec![0; dim],
        }
    }

    /// The point with `(1, 1)` in every dimension.
    pub fn root(dim: usize) -> Self {
        Self {
            levels: vec![1; dim],
            indices: vec![1; dim],
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.levels.len()
    }

    /// Returns the `(level, index)` pair in dimension `dim`.
    #[inline(always)]
    pub fn get(&self, dim: usize) -> (Level, Index) {
        (self.levels[dim], self.indices[dim])
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// Returns a copy of this point with dimension `dim` replaced by `(level, index)`.
    ///
    /// The pair is not validated; callers move along the hierarchy with it.
    #[inline(always)]
    pub fn with_pair(&self, dim: usize, level: Level, index: Index) -> Self {
        let mut point = self.clone();
        point.levels[dim] = level;
        point.indices[dim] = index;
        point
    }

    /// Sum of the levels over all dimensions.
    pub fn level_sum(&self) -> u32 {
        self.levels.iter().sum()
    }

    /// Coordinate of the point in the canonical unit interval of dimension `dim`.
    pub fn coordinate(&self, dim: usize) -> f64 {
        let (level, index) = self.get(dim);
        index as f64 * 0.5f64.powi(level as i32)
    }

    /// Hierarchical children of the point in dimension `dim`.
    ///
    /// Both level-zero functions share the single level-one child `(1, 1)`.
    pub fn children(&self, dim: usize) -> Vec<GridPoint> {
        let (level, index) = self.get(dim);

        match level {
            0 => vec![self.with_pair(dim, 1, 1)],
            l if l >= MAX_LEVEL => Vec::new(),
            l => vec![
                self.with_pair(dim, l + 1, 2 * index - 1),
                self.with_pair(dim, l + 1, 2 * index + 1),
            ],
        }
    }

    /// Hierarchical parents of the point in dimension `dim`.
    ///
    /// A level-one point hangs below both level-zero boundary functions.
    pub fn parents(&self, dim: usize) -> Vec<GridPoint> {
        let (level, index) = self.get(dim);

        match level {
            0 => Vec::new(),
            1 => vec![self.with_pair(dim, 0, 0), self.with_pair(dim, 0, 1)],
            l => vec![self.with_pair(dim, l - 1, (index >> 1) | 1)],
        }
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (dim, (level, index)) in self.levels.iter().zip(self.indices.iter()).enumerate() {
            if dim > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", level, index)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pairs() {
        assert!(is_valid_pair(0, 0));
        assert!(is_valid_pair(0, 1));
        assert!(!is_valid_pair(0, 2));
        assert!(is_valid_pair(1, 1));
        assert!(!is_valid_pair(1, 0));
        assert!(!is_valid_pair(2, 2));
        assert!(is_valid_pair(3, 7));
        assert!(!is_valid_pair(3, 9));
    }

    #[test]
    fn new_rejects_invalid_pairs() {
        match GridPoint::new(vec![1, 2], vec![1, 4]) {
            Err(GridError::InvalidPoint { dim, level, index }) => {
                assert_eq!((dim, level, index), (1, 2, 4));
            }
            other => panic!("Expected InvalidPoint, got {:?}", other),
        }

        assert!(matches!(
            GridPoint::new(vec![1, 2], vec![1]),
            Err(GridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn children_and_parents_are_inverse() {
        let point = GridPoint::new(vec![2, 1], vec![3, 1]).unwrap();

        for child in point.children(0) {
            assert_eq!(child.parents(0), vec![point.clone()]);
        }

        let top = GridPoint::new(vec![1], vec![1]).unwrap();
        let parents = top.parents(0);
        assert_eq!(parents.len(), 2);
        for parent in parents {
            assert_eq!(parent.children(0), vec![top.clone()]);
        }
    }

    #[test]
    fn coordinate_matches_level_index() {
        let point = GridPoint::new(vec![3, 0], vec![5, 1]).unwrap();
        assert_eq!(point.coordinate(0), 0.625);
        assert_eq!(point.coordinate(1), 1.0);
        assert_eq!(point.to_string(), "[3:5, 0:1]");
    }
}
