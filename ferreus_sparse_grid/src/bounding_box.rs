/////////////////////////////////////////////////////////////////////////////////////////////
//
// Affine map from the canonical unit cube to the physical problem domain.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::storage::GridError;

/// One dimension of a [`BoundingBox`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingInterval {
    pub left: f64,
    pub right: f64,
    #[serde(default)]
    pub dirichlet_left: bool,
    #[serde(default)]
    pub dirichlet_right: bool,
}

impl BoundingInterval {
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left,
            right,
            dirichlet_left: false,
            dirichlet_right: false,
        }
    }

    pub fn with_dirichlet(mut self, left: bool, right: bool) -> Self {
        self.dirichlet_left = left;
        self.dirichlet_right = right;
        self
    }
}

impl Default for BoundingInterval {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Per-dimension physical extents of a sparse grid, with optional Dirichlet
/// boundary flags on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    intervals: Vec<BoundingInterval>,
}

impl BoundingBox {
    /// Builds a bounding box, rejecting empty or inverted intervals.
    pub fn new(intervals: Vec<BoundingInterval>) -> Result<Self, GridError> {
        let valid = intervals
            .iter()
            .filter(|iv| iv.left.is_finite() && iv.right.is_finite() && iv.right > iv.left)
            .count();

        if valid != intervals.len() {
            return Err(GridError::BoundingBoxDimension {
                expected: intervals.len(),
                found: valid,
            });
        }

        Ok(Self { intervals })
    }

    /// The canonical `[0, 1]^dim` domain without Dirichlet boundaries.
    pub fn unit(dim: usize) -> Self {
        Self {
            intervals: vec![BoundingInterval::default(); dim],
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.intervals.len()
    }

    pub fn interval(&self, dim: usize) -> &BoundingInterval {
        &self.intervals[dim]
    }

    pub fn intervals(&self) -> &[BoundingInterval] {
        &self.intervals
    }

    /// Width `q` of the interval in dimension `dim`.
    #[inline(always)]
    pub fn interval_width(&self, dim: usize) -> f64 {
        self.intervals[dim].right - self.intervals[dim].left
    }

    /// Offset `t` of the interval in dimension `dim`.
    #[inline(always)]
    pub fn interval_offset(&self, dim: usize) -> f64 {
        self.intervals[dim].left
    }

    #[inline(always)]
    pub fn has_dirichlet_boundary_left(&self, dim: usize) -> bool {
        self.intervals[dim].dirichlet_left
    }

    #[inline(always)]
    pub fn has_dirichlet_boundary_right(&self, dim: usize) -> bool {
        self.intervals[dim].dirichlet_right
    }

    /// Maps a canonical coordinate in `[0, 1]` to the physical domain.
    pub fn to_physical(&self, dim: usize, x: f64) -> f64 {
        self.interval_offset(dim) + self.interval_width(dim) * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_offset() {
        let bb = BoundingBox::new(vec![
            BoundingInterval::new(-1.0, 3.0),
            BoundingInterval::new(0.5, 1.0).with_dirichlet(true, false),
        ])
        .unwrap();

        assert_eq!(bb.interval_width(0), 4.0);
        assert_eq!(bb.interval_offset(0), -1.0);
        assert_eq!(bb.to_physical(0, 0.25), 0.0);
        assert!(bb.has_dirichlet_boundary_left(1));
        assert!(!bb.has_dirichlet_boundary_right(1));
    }

    #[test]
    fn rejects_empty_interval() {
        let result = BoundingBox::new(vec![
            BoundingInterval::new(0.0, 1.0),
            BoundingInterval::new(2.0, 2.0),
        ]);
        assert_eq!(
            result,
            Err(GridError::BoundingBoxDimension {
                expected: 2,
                found: 1
            })
        );
    }
}
