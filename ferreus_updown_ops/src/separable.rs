/////////////////////////////////////////////////////////////////////////////////////////////
//
// Separable sparse grid operators: weighted sums of tensor products of 1D bilinear forms.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::sync::Arc;

use ferreus_sparse_grid::GridStorage;
use ferreus_updown::{
    check_len, BilinearKernel, Composer, KernelDescriptor, KernelType, UpDownError, UpDownParams,
};
use itertools::iproduct;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    operation::OperationMatrix,
    progress::{emit, ProgressMsg, ProgressSink},
};

/// One tensor product term `coefficient * (kernels[0] ⊗ ... ⊗ kernels[d-1])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub coefficient: f64,
    pub kernels: Vec<KernelType>,
}

impl Term {
    pub fn new(coefficient: f64, kernels: Vec<KernelType>) -> Self {
        Self {
            coefficient,
            kernels,
        }
    }

    /// Mass in every dimension except the listed ones, which take the
    /// given kernels.
    fn with_special(coefficient: f64, num_dims: usize, special: &[(usize, KernelType)]) -> Self {
        let mut kernels = vec![KernelType::Mass; num_dims];
        for &(dim, kernel) in special {
            kernels[dim] = kernel;
        }
        Self::new(coefficient, kernels)
    }

    /// The term whose operator is the transpose of this one.
    pub fn transpose(&self) -> Self {
        Self::new(
            self.coefficient,
            self.kernels.iter().map(|k| k.transpose()).collect(),
        )
    }
}

/// Matrix-free operator `sum_k c_k (B_k0 ⊗ ... ⊗ B_k(d-1))`.
///
/// Terms are evaluated independently, in parallel when
/// `UpDownParams::parallel_terms` is set, and added to the result in term
/// order, so the output does not depend on the number of threads.
///
/// The named constructors only create terms for the grid's algorithmic
/// dimensions; coefficient vectors and matrices still span every dimension
/// and entries of the other dimensions are unused.
#[derive(Debug, Clone)]
pub struct SeparableOperator<'a> {
    composer: Composer<'a>,
    terms: Vec<Term>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl<'a> SeparableOperator<'a> {
    /// Builds an operator from arbitrary terms.
    ///
    /// ### Errors
    /// - Any configuration error of [`Composer::new`].
    /// - `KernelMapping` if a term does not list one kernel per grid dimension.
    pub fn from_terms(
        storage: &'a GridStorage,
        terms: Vec<Term>,
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let composer = Composer::new(storage, params)?;

        if let Some(term) = terms.iter().find(|t| t.kernels.len() != storage.dim()) {
            return Err(UpDownError::KernelMapping {
                expected: storage.dim(),
                found: term.kernels.len(),
            });
        }

        Ok(Self {
            composer,
            terms,
            progress: None,
        })
    }

    /// L2 inner product `∫ phi_i phi_j dx`.
    pub fn mass(storage: &'a GridStorage, params: UpDownParams) -> Result<Self, UpDownError> {
        let terms = vec![Term::with_special(1.0, storage.dim(), &[])];
        Self::from_terms(storage, terms, params)
    }

    /// Laplace operator `sum_k a_k ∫ ∂_k phi_i ∂_k phi_j dx`, with all
    /// `a_k = 1` when `coefficients` is `None`.
    pub fn laplace(
        storage: &'a GridStorage,
        coefficients: Option<&[f64]>,
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let dim = storage.dim();
        let coefficients = match coefficients {
            Some(c) => check_vector(c, dim)?.to_vec(),
            None => vec![1.0; dim],
        };

        let terms = laplace_terms(storage, &coefficients, 1.0);
        Self::from_terms(storage, terms, params)
    }

    /// `mass_weight * M + laplace_weight * L`, the system matrix of an
    /// implicit heat equation step.
    pub fn mass_laplace(
        storage: &'a GridStorage,
        mass_weight: f64,
        laplace_weight: f64,
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let dim = storage.dim();
        let mut terms = vec![Term::with_special(mass_weight, dim, &[])];
        terms.extend(laplace_terms(storage, &vec![1.0; dim], laplace_weight));
        Self::from_terms(storage, terms, params)
    }

    /// Advection `sum_k b_k ∫ phi_i ∂_k phi_j dx`.
    pub fn advection(
        storage: &'a GridStorage,
        velocity: &[f64],
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let dim = storage.dim();
        let velocity = check_vector(velocity, dim)?;
        let terms = storage
            .algorithmic_dimensions()
            .iter()
            .map(|&k| Term::with_special(velocity[k], dim, &[(k, KernelType::TrialGradient)]))
            .collect();
        Self::from_terms(storage, terms, params)
    }

    /// Anisotropic diffusion `sum_{k,l} C_kl ∫ ∂_k phi_i ∂_l phi_j dx`,
    /// with `matrix[k][l] = C_kl`.
    pub fn diffusion(
        storage: &'a GridStorage,
        matrix: &[Vec<f64>],
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let dim = storage.dim();
        check_matrix(matrix, dim)?;

        let dims = storage.algorithmic_dimensions();
        let terms = iproduct!(dims.iter().copied(), dims.iter().copied())
            .map(|(k, l)| {
                let special = if k == l {
                    vec![(k, KernelType::Stiffness)]
                } else {
                    vec![(k, KernelType::TestGradient), (l, KernelType::TrialGradient)]
                };
                Term::with_special(matrix[k][l], dim, &special)
            })
            .collect();
        Self::from_terms(storage, terms, params)
    }

    /// Coordinate weighted mass `sum_k c_k ∫ x_k phi_i phi_j dx`.
    pub fn weighted_mass(
        storage: &'a GridStorage,
        coefficients: &[f64],
        params: UpDownParams,
    ) -> Result<Self, UpDownError> {
        let dim = storage.dim();
        let coefficients = check_vector(coefficients, dim)?;
        let terms = storage
            .algorithmic_dimensions()
            .iter()
            .map(|&k| Term::with_special(coefficients[k], dim, &[(k, KernelType::WeightedMass)]))
            .collect();
        Self::from_terms(storage, terms, params)
    }

    /// Reports one `TermApplied` message per evaluated term to `sink`.
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn composer(&self) -> &Composer<'a> {
        &self.composer
    }

    /// Properties of the whole operator over its non-zero terms.
    ///
    /// `symmetric` is set when the terms are closed under transposition,
    /// which makes the operator matrix symmetric. Dimensions outside the
    /// algorithmic subset are ignored.
    pub fn descriptor(&self) -> KernelDescriptor {
        let dims = self.composer.storage().algorithmic_dimensions();
        let active: Vec<&Term> = self.active_terms().collect();

        let kernels = || {
            active
                .iter()
                .flat_map(|term| dims.iter().map(move |&d| term.kernels[d].descriptor()))
        };

        let count = |target: &Term| {
            active
                .iter()
                .filter(|term| dims.iter().all(|&d| term.kernels[d] == target.kernels[d]))
                .filter(|term| term.coefficient == target.coefficient)
                .count()
        };

        KernelDescriptor {
            uses_gradient: kernels().any(|k| k.uses_gradient),
            uses_offset: kernels().any(|k| k.uses_offset),
            symmetric: active
                .iter()
                .all(|&term| count(term) == count(&term.transpose())),
        }
    }

    fn active_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter().filter(|t| t.coefficient != 0.0)
    }
}

impl OperationMatrix for SeparableOperator<'_> {
    fn size(&self) -> usize {
        self.composer.storage().size()
    }

    fn mult(&self, alpha: &[f64], result: &mut [f64]) -> Result<(), UpDownError> {
        check_len("alpha", alpha.len(), self.size())?;
        check_len("result", result.len(), self.size())?;

        result.fill(0.0);

        let active: Vec<&Term> = self.active_terms().collect();
        let num_terms = active.len();

        let buffers: Vec<Result<Vec<f64>, UpDownError>> = if self.composer.params().parallel_terms {
            active
                .par_iter()
                .map(|term| self.composer.updown(alpha, &term.kernels))
                .collect()
        } else {
            active
                .iter()
                .map(|term| self.composer.updown(alpha, &term.kernels))
                .collect()
        };

        for (k, (term, buffer)) in active.iter().zip(buffers).enumerate() {
            let buffer = buffer?;
            for (r, b) in result.iter_mut().zip(buffer.iter()) {
                *r += term.coefficient * b;
            }
            emit(
                &self.progress,
                ProgressMsg::TermApplied {
                    term: k,
                    num_terms,
                },
            );
        }

        Ok(())
    }
}

fn laplace_terms(storage: &GridStorage, coefficients: &[f64], scale: f64) -> Vec<Term> {
    let dim = storage.dim();
    storage
        .algorithmic_dimensions()
        .iter()
        .map(|&k| Term::with_special(scale * coefficients[k], dim, &[(k, KernelType::Stiffness)]))
        .collect()
}

fn check_vector(values: &[f64], dim: usize) -> Result<&[f64], UpDownError> {
    if values.len() != dim {
        return Err(UpDownError::CoefficientShape {
            expected: (dim, 1),
            found: (values.len(), 1),
        });
    }
    Ok(values)
}

fn check_matrix(matrix: &[Vec<f64>], dim: usize) -> Result<(), UpDownError> {
    let ncols = matrix.first().map_or(0, |row| row.len());
    if matrix.len() != dim || matrix.iter().any(|row| row.len() != dim) {
        return Err(UpDownError::CoefficientShape {
            expected: (dim, dim),
            found: (matrix.len(), ncols),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{materialized::assemble_dense, progress::closure_sink};
    use equator::assert;
    use faer::{utils::approx::*, Mat};
    use ferreus_sparse_grid::{BoundingBox, BoundingInterval, GridPoint, GridType};
    use ferreus_updown::reference::reference_matrix;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::Mutex;

    fn boundary_grid() -> GridStorage {
        let mut grid = GridStorage::regular(2, 3, GridType::LinearBoundary).unwrap();
        grid.set_bounding_box(
            BoundingBox::new(vec![
                BoundingInterval::new(0.0, 2.0),
                BoundingInterval::new(-1.0, 0.5),
            ])
            .unwrap(),
        )
        .unwrap();
        grid
    }

    /// Dense reference of `sum_k c_k (B_k0 ⊗ ... )` by quadrature.
    fn reference(grid: &GridStorage, terms: &[Term]) -> Mat<f64> {
        let n = grid.size();
        let mut total = Mat::<f64>::zeros(n, n);
        for term in terms {
            let m = reference_matrix(grid, &term.kernels);
            total = Mat::from_fn(n, n, |i, j| total[(i, j)] + term.coefficient * m[(i, j)]);
        }
        total
    }

    #[test]
    fn constructors_match_quadrature() {
        let grid = boundary_grid();
        let params = UpDownParams::default();
        let n = grid.size();
        let approx_eq = CwiseMat(ApproxEq::eps() * 4096.0 * n as f64);

        let diffusion = vec![vec![1.0, 0.3], vec![-0.2, 0.7]];
        let operators = [
            SeparableOperator::mass(&grid, params).unwrap(),
            SeparableOperator::laplace(&grid, Some(&[2.0, 0.5]), params).unwrap(),
            SeparableOperator::mass_laplace(&grid, 1.0, 0.1, params).unwrap(),
            SeparableOperator::advection(&grid, &[1.0, -3.0], params).unwrap(),
            SeparableOperator::diffusion(&grid, &diffusion, params).unwrap(),
            SeparableOperator::weighted_mass(&grid, &[0.5, 1.5], params).unwrap(),
        ];

        for op in operators.iter() {
            let dense = assemble_dense(op, None).unwrap();
            let expected = reference(&grid, op.terms());
            assert!(&dense ~ &expected);
        }
    }

    #[test]
    fn laplace_mult_on_three_point_grid() {
        // Sequence order: left boundary, centre, right boundary.
        let mut grid = GridStorage::new(1, GridType::LinearBoundary);
        grid.insert(GridPoint::new(vec![0], vec![0]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![1], vec![1]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![0], vec![1]).unwrap()).unwrap();

        let op = SeparableOperator::laplace(&grid, None, UpDownParams::default()).unwrap();
        let mut result = vec![0.0; 3];
        op.mult(&[1.0, 1.0, 1.0], &mut result).unwrap();

        assert_eq!(result, vec![0.0, 4.0, 0.0]);
    }

    #[test]
    fn constructors_follow_algorithmic_dimensions() {
        let mut grid = GridStorage::regular(3, 3, GridType::LinearBoundary).unwrap();
        grid.set_algorithmic_dimensions(&[0, 2]).unwrap();
        let params = UpDownParams::default();
        let n = grid.size();
        let approx_eq = CwiseMat(ApproxEq::eps() * 4096.0 * n as f64);

        let laplace = SeparableOperator::laplace(&grid, Some(&[1.0, 5.0, 2.0]), params).unwrap();
        assert_eq!(
            laplace.terms(),
            &[
                Term::new(1.0, vec![KernelType::Stiffness, KernelType::Mass, KernelType::Mass]),
                Term::new(2.0, vec![KernelType::Mass, KernelType::Mass, KernelType::Stiffness]),
            ]
        );

        let diffusion = vec![vec![1.0, 9.0, 0.5], vec![9.0, 9.0, 9.0], vec![0.5, 9.0, 2.0]];
        let operators = [
            laplace,
            SeparableOperator::advection(&grid, &[1.0, 7.0, -2.0], params).unwrap(),
            SeparableOperator::diffusion(&grid, &diffusion, params).unwrap(),
        ];
        assert_eq!(operators[2].terms().len(), 4);

        for op in operators.iter() {
            let dense = assemble_dense(op, None).unwrap();
            let expected = reference(&grid, op.terms());
            assert!(&dense ~ &expected);
        }

        // Points differing only in dimension 1 never couple.
        let dense = assemble_dense(&operators[0], None).unwrap();
        let a = grid.seq_of(&GridPoint::new(vec![1, 0, 1], vec![1, 0, 1]).unwrap()).unwrap();
        let b = grid.seq_of(&GridPoint::new(vec![1, 1, 1], vec![1, 1, 1]).unwrap()).unwrap();
        assert_eq!(dense[(a, b)], 0.0);
    }

    #[test]
    fn descriptor_summarises_terms() {
        let grid = boundary_grid();
        let params = UpDownParams::default();

        let heat = SeparableOperator::mass_laplace(&grid, 1.0, 0.5, params).unwrap();
        assert_eq!(
            heat.descriptor(),
            KernelDescriptor {
                uses_gradient: true,
                uses_offset: false,
                symmetric: true
            }
        );

        let symmetric = vec![vec![1.0, 0.4], vec![0.4, 2.0]];
        let skewed = vec![vec![1.0, 0.4], vec![0.1, 2.0]];
        assert!(SeparableOperator::diffusion(&grid, &symmetric, params)
            .unwrap()
            .descriptor()
            .symmetric);
        assert!(!SeparableOperator::diffusion(&grid, &skewed, params)
            .unwrap()
            .descriptor()
            .symmetric);

        let advection = SeparableOperator::advection(&grid, &[0.0, 1.0], params).unwrap();
        assert!(!advection.descriptor().symmetric);
        let still = SeparableOperator::advection(&grid, &[0.0, 0.0], params).unwrap();
        assert!(still.descriptor().symmetric);

        let weighted = SeparableOperator::weighted_mass(&grid, &[1.0, 0.0], params).unwrap();
        assert!(weighted.descriptor().uses_offset);
        assert!(!weighted.descriptor().uses_gradient);
    }

    #[test]
    fn diffusion_terms_use_gradient_pairs() {
        let grid = GridStorage::regular(3, 2, GridType::Linear).unwrap();
        let matrix = vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let op = SeparableOperator::diffusion(&grid, &matrix, UpDownParams::default()).unwrap();

        assert_eq!(op.terms().len(), 9);
        assert_eq!(
            op.terms()[2],
            Term::new(
                2.0,
                vec![KernelType::TestGradient, KernelType::Mass, KernelType::TrialGradient]
            )
        );
        assert_eq!(
            op.terms()[4],
            Term::new(1.0, vec![KernelType::Mass, KernelType::Stiffness, KernelType::Mass])
        );
    }

    #[test]
    fn symmetric_diffusion_is_symmetric() {
        let grid = boundary_grid();
        let matrix = vec![vec![1.0, 0.4], vec![0.4, 2.0]];
        let op = SeparableOperator::diffusion(&grid, &matrix, UpDownParams::default()).unwrap();

        let dense = assemble_dense(&op, None).unwrap();
        let transposed = dense.transpose().to_owned();
        let approx_eq = CwiseMat(ApproxEq::eps() * 4096.0 * grid.size() as f64);
        assert!(&dense ~ &transposed);
    }

    #[test]
    fn zero_terms_are_skipped() {
        let grid = boundary_grid();
        let messages = Arc::new(Mutex::new(Vec::new()));
        let store = messages.clone();
        let (sink, handle) = closure_sink(64, move |msg| store.lock().unwrap().push(msg));

        let op = SeparableOperator::advection(&grid, &[0.0, 2.0], UpDownParams::default())
            .unwrap()
            .with_progress(sink);

        let alpha = vec![1.0; grid.size()];
        let mut result = vec![f64::NAN; grid.size()];
        op.mult(&alpha, &mut result).unwrap();
        drop(op);
        handle.join().unwrap();

        assert!(result.iter().all(|r| r.is_finite()));
        assert_eq!(
            *messages.lock().unwrap(),
            vec![ProgressMsg::TermApplied {
                term: 0,
                num_terms: 1
            }]
        );

        let op = SeparableOperator::advection(&grid, &[0.0, 0.0], UpDownParams::default()).unwrap();
        op.mult(&alpha, &mut result).unwrap();
        assert!(result.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn term_parallelism_does_not_change_results() {
        let grid = GridStorage::regular(3, 4, GridType::LinearBoundary).unwrap();
        let matrix = vec![vec![1.0, 0.2, 0.1], vec![0.2, 1.0, 0.3], vec![0.1, 0.3, 1.0]];

        let parallel = SeparableOperator::diffusion(&grid, &matrix, UpDownParams::default()).unwrap();
        let sequential =
            SeparableOperator::diffusion(&grid, &matrix, UpDownParams::sequential()).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let alpha: Vec<f64> = (0..grid.size()).map(|_| rng.random_range(-1.0..1.0)).collect();

        let mut a = vec![0.0; grid.size()];
        let mut b = vec![0.0; grid.size()];
        parallel.mult(&alpha, &mut a).unwrap();
        sequential.mult(&alpha, &mut b).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn matvec_applies_every_column() {
        let grid = boundary_grid();
        let op = SeparableOperator::mass_laplace(&grid, 1.0, 0.5, UpDownParams::default()).unwrap();
        let n = grid.size();

        let mut rng = StdRng::seed_from_u64(42);
        let weights = Mat::from_fn(n, 3, |_, _| rng.random_range(0.0..1.0));

        let product = op.matvec(&weights.as_ref()).unwrap();
        let dense = assemble_dense(&op, None).unwrap();
        let expected = &dense * &weights;

        let approx_eq = CwiseMat(ApproxEq::eps() * 4096.0 * n as f64);
        assert!(&product ~ &expected);
    }

    #[test]
    fn rejects_bad_shapes() {
        let grid = boundary_grid();
        let params = UpDownParams::default();

        assert_eq!(
            SeparableOperator::laplace(&grid, Some(&[1.0]), params).err(),
            Some(UpDownError::CoefficientShape {
                expected: (2, 1),
                found: (1, 1)
            })
        );
        assert_eq!(
            SeparableOperator::diffusion(&grid, &[vec![1.0, 0.0]], params).err(),
            Some(UpDownError::CoefficientShape {
                expected: (2, 2),
                found: (1, 2)
            })
        );
        assert_eq!(
            SeparableOperator::from_terms(&grid, vec![Term::new(1.0, vec![KernelType::Mass])], params)
                .err(),
            Some(UpDownError::KernelMapping {
                expected: 2,
                found: 1
            })
        );

        let op = SeparableOperator::mass(&grid, params).unwrap();
        let mut result = vec![0.0; grid.size() + 1];
        assert!(matches!(
            op.mult(&vec![0.0; grid.size()], &mut result),
            Err(UpDownError::SizeMismatch { what: "result", .. })
        ));
    }
}
