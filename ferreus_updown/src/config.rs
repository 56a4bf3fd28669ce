/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for the up/down engine.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for the up/down engine.
use serde::{Deserialize, Serialize};

/// How the dimension-recursive composer schedules its work.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccelerationMode {
    /// Single-threaded recursion.
    Sequential,

    /// Fork-join over the up and down branches of the outermost
    /// dimensions.
    TaskParallel,

    /// SIMD / accelerator dataset kernels. Recognised, not supported.
    Vectorized,
}

/// Parameters controlling how an up/down operator is applied.
///
/// ### Default Values
/// - `acceleration`: `TaskParallel`
/// - `max_parallel_dims`: `4`
/// - `parallel_terms`: `true`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct UpDownParams {
    /// Scheduling strategy for the composer.
    pub acceleration: AccelerationMode,

    /// Number of outermost dimension recursion levels whose up and down
    /// branches are forked into separate tasks. Deeper levels run sequentially.
    pub max_parallel_dims: usize,

    /// Whether the terms of a separable operator are evaluated in parallel.
    pub parallel_terms: bool,
}

impl Default for UpDownParams {
    fn default() -> Self {
        UpDownParams {
            acceleration: AccelerationMode::TaskParallel,
            max_parallel_dims: 4,
            parallel_terms: true,
        }
    }
}

impl UpDownParams {
    /// Returns a new [`UpDownParamsBuilder`] initialised with the defaults.
    pub fn builder() -> UpDownParamsBuilder {
        UpDownParamsBuilder {
            params: UpDownParams::default(),
        }
    }

    /// Single-threaded parameters.
    pub fn sequential() -> Self {
        UpDownParams {
            acceleration: AccelerationMode::Sequential,
            max_parallel_dims: 0,
            parallel_terms: false,
        }
    }
}

/// Builder for [`UpDownParams`]. Obtain one with [`UpDownParams::builder`].
#[derive(Debug, Clone)]
pub struct UpDownParamsBuilder {
    params: UpDownParams,
}

impl UpDownParamsBuilder {
    /// Sets the acceleration mode.
    pub fn acceleration(mut self, acceleration: AccelerationMode) -> Self {
        self.params.acceleration = acceleration;
        self
    }

    /// Sets how many recursion levels fork into parallel tasks.
    pub fn max_parallel_dims(mut self, max_parallel_dims: usize) -> Self {
        self.params.max_parallel_dims = max_parallel_dims;
        self
    }

    /// Enables or disables parallel evaluation of operator terms.
    pub fn parallel_terms(mut self, parallel_terms: bool) -> Self {
        self.params.parallel_terms = parallel_terms;
        self
    }

    /// Builds and returns an [`UpDownParams`] instance.
    pub fn build(self) -> UpDownParams {
        self.params
    }
}
