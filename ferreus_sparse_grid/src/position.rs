/////////////////////////////////////////////////////////////////////////////////////////////
//
// Immutable grid position used to navigate the hierarchy one dimension at a time.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    point::{GridPoint, Index, Level},
    storage::GridStorage,
};

/// A point of the level/index hierarchy together with its sequence number.
///
/// Navigation never mutates a position, it returns a new one. Positions that
/// address a point missing from the storage carry the end-of-storage sentinel
/// (`storage.size()`) as sequence number, so `exists()` is `false`.
#[derive(Debug, Clone)]
pub struct GridPosition<'a> {
    storage: &'a GridStorage,
    point: GridPoint,
    seq: usize,
}

impl<'a> GridPosition<'a> {
    pub fn new(storage: &'a GridStorage, point: GridPoint) -> Self {
        let seq = storage.seq_of(&point).unwrap_or(storage.size());
        Self {
            storage,
            point,
            seq,
        }
    }

    /// The all-`(1, 1)` point, root of a grid without boundary.
    pub fn root(storage: &'a GridStorage) -> Self {
        Self::new(storage, GridPoint::root(storage.dim()))
    }

    /// The all-`(0, 0)` point, corner of a grid with boundary.
    pub fn level_zero(storage: &'a GridStorage) -> Self {
        Self::new(storage, GridPoint::level_zero(storage.dim()))
    }

    #[inline(always)]
    fn moved(&self, dim: usize, level: Level, index: Index) -> Self {
        Self::new(self.storage, self.point.with_pair(dim, level, index))
    }

    #[inline(always)]
    pub fn seq(&self) -> usize {
        self.seq
    }

    #[inline(always)]
    pub fn exists(&self) -> bool {
        !self.storage.end(self.seq)
    }

    #[inline(always)]
    pub fn get(&self, dim: usize) -> (Level, Index) {
        self.point.get(dim)
    }

    pub fn point(&self) -> &GridPoint {
        &self.point
    }

    pub fn storage(&self) -> &'a GridStorage {
        self.storage
    }

    /// `true` if the point has no child in any dimension. Missing points are leaves.
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        !self.exists() || self.storage.is_leaf(self.seq)
    }

    /// Left hierarchical child. From level zero this is the top `(1, 1)`.
    pub fn left_child(&self, dim: usize) -> Self {
        match self.get(dim) {
            (0, _) => self.top(dim),
            (level, index) => self.moved(dim, level + 1, 2 * index - 1),
        }
    }

    /// Right hierarchical child. From level zero this is the top `(1, 1)`.
    pub fn right_child(&self, dim: usize) -> Self {
        match self.get(dim) {
            (0, _) => self.top(dim),
            (level, index) => self.moved(dim, level + 1, 2 * index + 1),
        }
    }

    /// Next point to the right on the same level.
    pub fn step_right(&self, dim: usize) -> Self {
        let (level, index) = self.get(dim);
        match level {
            0 => self.moved(dim, 0, index + 1),
            _ => self.moved(dim, level, index + 2),
        }
    }

    /// Hierarchical parent. Level one climbs to the left level-zero point,
    /// level zero stays in place.
    pub fn up(&self, dim: usize) -> Self {
        match self.get(dim) {
            (0, _) => self.clone(),
            (1, _) => self.left_level_zero(dim),
            (level, index) => self.moved(dim, level - 1, (index >> 1) | 1),
        }
    }

    /// Same point with `(1, 1)` in dimension `dim`.
    pub fn top(&self, dim: usize) -> Self {
        self.moved(dim, 1, 1)
    }

    /// Same point with `(0, 0)` in dimension `dim`.
    pub fn left_level_zero(&self, dim: usize) -> Self {
        self.moved(dim, 0, 0)
    }

    /// Same point with `(0, 1)` in dimension `dim`.
    pub fn right_level_zero(&self, dim: usize) -> Self {
        self.moved(dim, 0, 1)
    }
}
