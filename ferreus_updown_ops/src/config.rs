/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares serializable operator descriptions and their builder.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares serializable operator descriptions and their builder.
use ferreus_sparse_grid::GridStorage;
use ferreus_updown::{UpDownError, UpDownParams};
use serde::{Deserialize, Serialize};

use crate::separable::{SeparableOperator, Term};

/// Which separable operator to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorSpec {
    /// L2 inner product.
    Mass,

    /// Laplace operator, optionally with one coefficient per dimension.
    Laplace {
        #[serde(default)]
        coefficients: Option<Vec<f64>>,
    },

    /// `mass_weight * M + laplace_weight * L`.
    MassLaplace { mass_weight: f64, laplace_weight: f64 },

    /// Advection with a constant velocity per dimension.
    Advection { velocity: Vec<f64> },

    /// Anisotropic diffusion with a full `d x d` coefficient matrix.
    Diffusion { matrix: Vec<Vec<f64>> },

    /// Coordinate weighted mass, one coefficient per dimension.
    WeightedMass { coefficients: Vec<f64> },

    /// Arbitrary tensor product terms.
    Terms { terms: Vec<Term> },
}

/// A complete operator description: what to build and how to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub operator: OperatorSpec,

    #[serde(default)]
    pub params: UpDownParams,
}

impl OperatorConfig {
    /// Returns a new [`OperatorConfigBuilder`] for `operator` with default parameters.
    pub fn builder(operator: OperatorSpec) -> OperatorConfigBuilder {
        OperatorConfigBuilder {
            operator,
            params: UpDownParams::default(),
        }
    }

    /// Builds the described operator on `storage`.
    ///
    /// ### Errors
    /// Configuration and coefficient shape errors of the selected constructor.
    pub fn build_operator<'a>(
        &self,
        storage: &'a GridStorage,
    ) -> Result<SeparableOperator<'a>, UpDownError> {
        let params = self.params;
        match &self.operator {
            OperatorSpec::Mass => SeparableOperator::mass(storage, params),
            OperatorSpec::Laplace { coefficients } => {
                SeparableOperator::laplace(storage, coefficients.as_deref(), params)
            }
            OperatorSpec::MassLaplace {
                mass_weight,
                laplace_weight,
            } => SeparableOperator::mass_laplace(storage, *mass_weight, *laplace_weight, params),
            OperatorSpec::Advection { velocity } => {
                SeparableOperator::advection(storage, velocity, params)
            }
            OperatorSpec::Diffusion { matrix } => {
                SeparableOperator::diffusion(storage, matrix, params)
            }
            OperatorSpec::WeightedMass { coefficients } => {
                SeparableOperator::weighted_mass(storage, coefficients, params)
            }
            OperatorSpec::Terms { terms } => {
                SeparableOperator::from_terms(storage, terms.clone(), params)
            }
        }
    }
}

/// Builder for [`OperatorConfig`]. Obtain one with [`OperatorConfig::builder`].
#[derive(Debug, Clone)]
pub struct OperatorConfigBuilder {
    operator: OperatorSpec,
    params: UpDownParams,
}

impl OperatorConfigBuilder {
    /// Sets the application parameters.
    pub fn params(mut self, params: UpDownParams) -> Self {
        self.params = params;
        self
    }

    /// Builds and returns an [`OperatorConfig`] instance.
    pub fn build(self) -> OperatorConfig {
        OperatorConfig {
            operator: self.operator,
            params: self.params,
        }
    }
}
