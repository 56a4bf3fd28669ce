/////////////////////////////////////////////////////////////////////////////////////////////
//
// Composes 1D up and down sweeps into a separable d-dimensional operator application.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use ferreus_sparse_grid::{GridStorage, GridType};

use crate::{
    config::{AccelerationMode, UpDownParams},
    error::{check_len, UpDownError},
    registry::KernelType,
    sweep::Sweep,
    updown_sweep::{DownSweep, UpSweep},
};

/// Applies tensor products of 1D bilinear forms on a sparse grid.
///
/// A kernel mapping assigns one [`KernelType`] to every grid dimension; the
/// composer applies the operator `B_0 ⊗ B_1 ⊗ ... ⊗ B_{d-1}` to a coefficient
/// vector without assembling it. Each level of the dimension recursion splits
/// into an up branch and a down branch, giving `2^d` sweep chains in total.
///
/// Only the grid's algorithmic dimensions
/// ([`GridStorage::algorithmic_dimensions`]) are swept. The operator acts as
/// the identity along every other dimension, and their kernel entries are
/// ignored.
///
/// The grid must be closed under hierarchical parents and, for grids with
/// boundary, carry both level-zero points of every 1D line. Both conditions
/// are checked by [`Composer::new`].
#[derive(Debug, Clone)]
pub struct Composer<'a> {
    storage: &'a GridStorage,
    params: UpDownParams,
}

impl<'a> Composer<'a> {
    /// Creates a composer over `storage`, validating the configuration and
    /// the grid structure.
    ///
    /// ### Errors
    /// - `UnsupportedGridType` for grids other than `Linear` and `LinearBoundary`.
    /// - `UnsupportedAcceleration` for `AccelerationMode::Vectorized`.
    /// - `MissingBoundaryPoint` / `MissingHierarchicalParent` if the grid is
    ///   not closed under the hierarchy.
    pub fn new(storage: &'a GridStorage, params: UpDownParams) -> Result<Self, UpDownError> {
        match storage.grid_type() {
            GridType::Linear | GridType::LinearBoundary => {}
            grid_type => return Err(UpDownError::UnsupportedGridType { grid_type }),
        }

        if params.acceleration == AccelerationMode::Vectorized {
            return Err(UpDownError::UnsupportedAcceleration {
                mode: params.acceleration,
            });
        }

        validate_closure(storage)?;

        Ok(Self { storage, params })
    }

    pub fn storage(&self) -> &'a GridStorage {
        self.storage
    }

    pub fn params(&self) -> &UpDownParams {
        &self.params
    }

    /// Applies the operator given by `kernels` (one per dimension) to `alpha`.
    ///
    /// Without algorithmic dimensions the operator is the identity.
    ///
    /// ### Errors
    /// - `KernelMapping` if `kernels.len()` differs from the grid dimensionality.
    /// - `SizeMismatch` if `alpha` does not hold one entry per grid point.
    pub fn updown(&self, alpha: &[f64], kernels: &[KernelType]) -> Result<Vec<f64>, UpDownError> {
        let num_dims = self.storage.dim();
        if kernels.len() != num_dims {
            return Err(UpDownError::KernelMapping {
                expected: num_dims,
                found: kernels.len(),
            });
        }
        check_len("alpha", alpha.len(), self.storage.size())?;

        let dims = self.storage.algorithmic_dimensions();
        if dims.is_empty() || self.storage.size() == 0 {
            return Ok(alpha.to_vec());
        }

        Ok(self.updown_rec(alpha, kernels, dims, dims.len() - 1))
    }

    /// Single up sweep of `kernel` along `dim`.
    pub fn up(&self, alpha: &[f64], dim: usize, kernel: KernelType) -> Result<Vec<f64>, UpDownError> {
        let mut result = vec![0.0; self.storage.size()];
        Sweep::new(self.storage, UpSweep::new(kernel)).sweep_1d(alpha, &mut result, dim)?;
        Ok(result)
    }

    /// Single down sweep of `kernel` along `dim`.
    pub fn down(&self, alpha: &[f64], dim: usize, kernel: KernelType) -> Result<Vec<f64>, UpDownError> {
        let mut result = vec![0.0; self.storage.size()];
        Sweep::new(self.storage, DownSweep::new(kernel)).sweep_1d(alpha, &mut result, dim)?;
        Ok(result)
    }

    fn up_unchecked(&self, alpha: &[f64], dim: usize, kernel: KernelType) -> Vec<f64> {
        let mut result = vec![0.0; self.storage.size()];
        Sweep::new(self.storage, UpSweep::new(kernel)).run(alpha, &mut result, dim);
        result
    }

    fn down_unchecked(&self, alpha: &[f64], dim: usize, kernel: KernelType) -> Vec<f64> {
        let mut result = vec![0.0; self.storage.size()];
        Sweep::new(self.storage, DownSweep::new(kernel)).run(alpha, &mut result, dim);
        result
    }

    // Recursion runs over `dims` from the last entry to the first. The up
    // branch sweeps `dim` before the remaining dimensions, the down branch
    // after them; with a hierarchically closed grid this ordering loses no
    // coupling between points.
    fn updown_rec(
        &self,
        alpha: &[f64],
        kernels: &[KernelType],
        dims: &[usize],
        pos: usize,
    ) -> Vec<f64> {
        let dim = dims[pos];
        let kernel = kernels[dim];

        if pos == 0 {
            let mut result = self.up_unchecked(alpha, dim, kernel);
            let down = self.down_unchecked(alpha, dim, kernel);
            add_assign(&mut result, &down);
            return result;
        }

        let up_branch = || {
            let temp = self.up_unchecked(alpha, dim, kernel);
            self.updown_rec(&temp, kernels, dims, pos - 1)
        };

        let down_branch = || {
            let temp = self.updown_rec(alpha, kernels, dims, pos - 1);
            self.down_unchecked(&temp, dim, kernel)
        };

        let depth = dims.len() - pos;
        let parallel = self.params.acceleration == AccelerationMode::TaskParallel
            && depth <= self.params.max_parallel_dims;

        let (mut result, down) = if parallel {
            rayon::join(up_branch, down_branch)
        } else {
            (up_branch(), down_branch())
        };

        add_assign(&mut result, &down);
        result
    }
}

#[inline(always)]
fn add_assign(target: &mut [f64], other: &[f64]) {
    for (t, &o) in target.iter_mut().zip(other.iter()) {
        *t += o;
    }
}

fn validate_closure(storage: &GridStorage) -> Result<(), UpDownError> {
    let boundary = storage.grid_type().has_boundary();

    for point in storage.points() {
        for dim in 0..storage.dim() {
            if boundary {
                let (level, index) = point.get(dim);
                let left = if (level, index) == (0, 0) {
                    true
                } else {
                    storage.seq_of(&point.with_pair(dim, 0, 0)).is_some()
                };
                let right = if (level, index) == (0, 1) {
                    true
                } else {
                    storage.seq_of(&point.with_pair(dim, 0, 1)).is_some()
                };

                if !(left && right) {
                    return Err(UpDownError::MissingBoundaryPoint {
                        point: point.clone(),
                        dim,
                    });
                }
            }

            if point.get(dim).0 >= 2 {
                let has_parent = point
                    .parents(dim)
                    .iter()
                    .all(|parent| storage.seq_of(parent).is_some());

                if !has_parent {
                    return Err(UpDownError::MissingHierarchicalParent {
                        point: point.clone(),
                        dim,
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{bilinear_form, reference_matrix};
    use equator::assert;
    use faer::{utils::approx::*, Mat};
    use ferreus_sparse_grid::{BoundingBox, BoundingInterval, GridPoint};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Dense matrix of the composed operator, one unit-vector application per column.
    fn assemble(composer: &Composer, kernels: &[KernelType]) -> Mat<f64> {
        let n = composer.storage().size();
        let mut matrix = Mat::<f64>::zeros(n, n);
        let mut unit = vec![0.0; n];

        for j in 0..n {
            unit[j] = 1.0;
            let column = composer.updown(&unit, kernels).unwrap();
            for (i, value) in column.into_iter().enumerate() {
                matrix[(i, j)] = value;
            }
            unit[j] = 0.0;
        }

        matrix
    }

    fn with_box(mut grid: GridStorage, intervals: &[(f64, f64)]) -> GridStorage {
        let bb = BoundingBox::new(
            intervals
                .iter()
                .map(|&(l, r)| BoundingInterval::new(l, r))
                .collect(),
        )
        .unwrap();
        grid.set_bounding_box(bb).unwrap();
        grid
    }

    /// 1D grid with sequence order left boundary, centre, right boundary.
    fn three_point_grid() -> GridStorage {
        let mut grid = GridStorage::new(1, GridType::LinearBoundary);
        grid.insert(GridPoint::new(vec![0], vec![0]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![1], vec![1]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![0], vec![1]).unwrap()).unwrap();
        grid
    }

    fn random_vector(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    #[test]
    fn laplace_on_three_point_grid() {
        let grid = three_point_grid();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();

        let result = composer
            .updown(&[1.0, 1.0, 1.0], &[KernelType::Stiffness])
            .unwrap();

        assert_eq!(result, vec![0.0, 4.0, 0.0]);
    }

    #[test]
    fn mass_on_two_point_grid_is_textbook() {
        let mut grid = GridStorage::new(1, GridType::LinearBoundary);
        grid.insert(GridPoint::new(vec![0], vec![0]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![0], vec![1]).unwrap()).unwrap();
        let grid = with_box(grid, &[(1.0, 4.0)]);

        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let m = assemble(&composer, &[KernelType::Mass]);

        let q = 3.0;
        let expected = faer::mat![[q / 3.0, q / 6.0], [q / 6.0, q / 3.0]];
        let approx_eq = CwiseMat(ApproxEq::eps() * 16.0);
        assert!(&m ~ &expected);
    }

    #[test]
    fn one_dimensional_kernels_match_quadrature() {
        for grid_type in [GridType::Linear, GridType::LinearBoundary] {
            let grid = with_box(GridStorage::regular(1, 5, grid_type).unwrap(), &[(-1.0, 2.0)]);
            let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
            let n = grid.size();

            for &kernel in KernelType::ALL {
                let m = assemble(&composer, &[kernel]);
                let expected = reference_matrix(&grid, &[kernel]);
                let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
                assert!(&m ~ &expected);
            }
        }
    }

    #[test]
    fn two_dimensional_operators_are_kronecker_products() {
        for grid_type in [GridType::Linear, GridType::LinearBoundary] {
            let grid = with_box(
                GridStorage::regular(2, 4, grid_type).unwrap(),
                &[(0.0, 1.0), (0.5, 2.5)],
            );
            let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
            let n = grid.size();

            for &k0 in KernelType::ALL {
                for &k1 in KernelType::ALL {
                    let kernels = [k0, k1];
                    let m = assemble(&composer, &kernels);
                    let expected = reference_matrix(&grid, &kernels);
                    let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
                    assert!(&m ~ &expected);
                }
            }
        }
    }

    #[test]
    fn three_dimensional_mixed_operator() {
        let grid = with_box(
            GridStorage::regular(3, 3, GridType::LinearBoundary).unwrap(),
            &[(0.0, 1.0), (-1.0, 1.0), (2.0, 3.0)],
        );
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let n = grid.size();

        let kernels = [KernelType::TestGradient, KernelType::WeightedMass, KernelType::TrialGradient];
        let m = assemble(&composer, &kernels);
        let expected = reference_matrix(&grid, &kernels);
        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
        assert!(&m ~ &expected);
    }

    #[test]
    fn adaptive_grid_matches_quadrature() {
        let mut grid = GridStorage::regular(2, 3, GridType::LinearBoundary).unwrap();
        // Refine towards the left edge of dimension 0 along the full boundary line.
        for (l0, i0) in [(4, 1), (5, 1)] {
            for (l1, i1) in [(0, 0), (0, 1), (1, 1)] {
                grid.insert(GridPoint::new(vec![l0, l1], vec![i0, i1]).unwrap()).unwrap();
            }
        }

        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let n = grid.size();

        for kernels in [
            [KernelType::Mass, KernelType::Stiffness],
            [KernelType::TrialGradient, KernelType::Mass],
        ] {
            let m = assemble(&composer, &kernels);
            let expected = reference_matrix(&grid, &kernels);
            let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
            assert!(&m ~ &expected);
        }
    }

    #[test]
    fn updown_is_linear() {
        let grid = GridStorage::regular(3, 4, GridType::LinearBoundary).unwrap();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let kernels = [KernelType::Mass, KernelType::Stiffness, KernelType::TrialGradient];
        let n = grid.size();

        let mut rng = StdRng::seed_from_u64(42);
        let a1 = random_vector(&mut rng, n);
        let a2 = random_vector(&mut rng, n);
        let (c1, c2) = (1.5, -0.25);

        let combined: Vec<f64> = a1.iter().zip(&a2).map(|(x, y)| c1 * x + c2 * y).collect();
        let lhs = composer.updown(&combined, &kernels).unwrap();
        let r1 = composer.updown(&a1, &kernels).unwrap();
        let r2 = composer.updown(&a2, &kernels).unwrap();

        let lhs = Mat::from_fn(n, 1, |i, _| lhs[i]);
        let rhs = Mat::from_fn(n, 1, |i, _| c1 * r1[i] + c2 * r2[i]);
        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
        assert!(&lhs ~ &rhs);
    }

    #[test]
    fn symmetric_forms_give_symmetric_matrices() {
        let grid = with_box(
            GridStorage::regular(2, 4, GridType::LinearBoundary).unwrap(),
            &[(1.0, 3.0), (0.0, 0.5)],
        );
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let n = grid.size();

        for kernels in [
            [KernelType::Mass, KernelType::Mass],
            [KernelType::Stiffness, KernelType::Mass],
            [KernelType::WeightedMass, KernelType::Stiffness],
        ] {
            let m = assemble(&composer, &kernels);
            let mt = m.transpose().to_owned();
            let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
            assert!(&m ~ &mt);
        }
    }

    #[test]
    fn trial_gradient_is_antisymmetric_up_to_boundary() {
        // Integration by parts: B + B^T = [phi_i phi_j] evaluated at the ends.
        let grid = with_box(GridStorage::regular(1, 4, GridType::LinearBoundary).unwrap(), &[(0.0, 5.0)]);
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let n = grid.size();

        let m = assemble(&composer, &[KernelType::TrialGradient]);
        let sum = m.as_ref() + m.transpose();

        let left = grid.seq_of(&GridPoint::new(vec![0], vec![0]).unwrap()).unwrap();
        let right = grid.seq_of(&GridPoint::new(vec![0], vec![1]).unwrap()).unwrap();
        let expected = Mat::from_fn(n, n, |i, j| match (i == j, i) {
            (true, s) if s == left => -1.0,
            (true, s) if s == right => 1.0,
            _ => 0.0,
        });

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
        assert!(&sum ~ &expected);

        let inner = GridStorage::regular(1, 4, GridType::Linear).unwrap();
        let composer = Composer::new(&inner, UpDownParams::default()).unwrap();
        let m = assemble(&composer, &[KernelType::TrialGradient]);
        let sum = m.as_ref() + m.transpose();
        let zeros = Mat::<f64>::zeros(inner.size(), inner.size());
        assert!(&sum ~ &zeros);
    }

    #[test]
    fn dirichlet_boundaries_zero_boundary_rows() {
        let mut grid = GridStorage::regular(1, 3, GridType::LinearBoundary).unwrap();
        let free = Composer::new(&grid, UpDownParams::default())
            .map(|c| assemble(&c, &[KernelType::Mass]))
            .unwrap();

        grid.set_bounding_box(
            BoundingBox::new(vec![BoundingInterval::new(0.0, 1.0).with_dirichlet(true, true)]).unwrap(),
        )
        .unwrap();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let clamped = assemble(&composer, &[KernelType::Mass]);

        for seq in 0..grid.size() {
            for j in 0..grid.size() {
                let expected = if grid.point(seq).get(0).0 == 0 { 0.0 } else { free[(seq, j)] };
                assert_eq!(clamped[(seq, j)], expected);
            }
        }
    }

    #[test]
    fn parallel_and_sequential_are_bit_identical() {
        let grid = GridStorage::regular(4, 4, GridType::LinearBoundary).unwrap();
        let kernels = [
            KernelType::Mass,
            KernelType::Stiffness,
            KernelType::WeightedMass,
            KernelType::TestGradient,
        ];

        let mut rng = StdRng::seed_from_u64(42);
        let alpha = random_vector(&mut rng, grid.size());

        let parallel = Composer::new(&grid, UpDownParams::default()).unwrap();
        let sequential = Composer::new(&grid, UpDownParams::sequential()).unwrap();

        let first = parallel.updown(&alpha, &kernels).unwrap();
        let second = parallel.updown(&alpha, &kernels).unwrap();
        let reference = sequential.updown(&alpha, &kernels).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, reference);
    }

    #[test]
    fn non_algorithmic_dimensions_act_as_identity() {
        let mut grid = with_box(
            GridStorage::regular(3, 3, GridType::LinearBoundary).unwrap(),
            &[(0.0, 2.0), (-1.0, 1.0), (1.0, 1.5)],
        );
        grid.set_algorithmic_dimensions(&[0, 2]).unwrap();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let n = grid.size();
        let bb = grid.bounding_box();

        // The kernel in dimension 1 is ignored.
        let kernels = [KernelType::TrialGradient, KernelType::Stiffness, KernelType::WeightedMass];
        let m = assemble(&composer, &kernels);

        let expected = Mat::from_fn(n, n, |a, b| {
            let (pa, pb) = (grid.point(a), grid.point(b));
            if pa.get(1) != pb.get(1) {
                return 0.0;
            }
            [0, 2]
                .iter()
                .map(|&d| {
                    bilinear_form(
                        kernels[d],
                        pa.get(d),
                        pb.get(d),
                        bb.interval_width(d),
                        bb.interval_offset(d),
                    )
                })
                .product()
        });

        let approx_eq = CwiseMat(ApproxEq::eps() * 1024.0 * n as f64);
        assert!(&m ~ &expected);
    }

    #[test]
    fn no_algorithmic_dimensions_is_identity() {
        let mut grid = GridStorage::regular(2, 3, GridType::Linear).unwrap();
        grid.set_algorithmic_dimensions(&[]).unwrap();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let alpha = random_vector(&mut rng, grid.size());
        let result = composer
            .updown(&alpha, &[KernelType::Stiffness, KernelType::Mass])
            .unwrap();

        assert_eq!(result, alpha);
    }

    #[test]
    fn rejects_unsupported_configuration() {
        let grid = GridStorage::regular(2, 2, GridType::ModLinear).unwrap();
        assert_eq!(
            Composer::new(&grid, UpDownParams::default()).err(),
            Some(UpDownError::UnsupportedGridType {
                grid_type: GridType::ModLinear
            })
        );

        let grid = GridStorage::regular(2, 2, GridType::Linear).unwrap();
        let params = UpDownParams::builder()
            .acceleration(AccelerationMode::Vectorized)
            .build();
        assert!(matches!(
            Composer::new(&grid, params),
            Err(UpDownError::UnsupportedAcceleration { .. })
        ));
    }

    #[test]
    fn rejects_incomplete_grids() {
        let mut grid = GridStorage::new(1, GridType::LinearBoundary);
        grid.insert(GridPoint::new(vec![0], vec![0]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![1], vec![1]).unwrap()).unwrap();
        assert!(matches!(
            Composer::new(&grid, UpDownParams::default()),
            Err(UpDownError::MissingBoundaryPoint { dim: 0, .. })
        ));

        let mut grid = GridStorage::new(2, GridType::Linear);
        grid.insert(GridPoint::new(vec![1, 1], vec![1, 1]).unwrap()).unwrap();
        grid.insert(GridPoint::new(vec![1, 3], vec![1, 5]).unwrap()).unwrap();
        assert!(matches!(
            Composer::new(&grid, UpDownParams::default()),
            Err(UpDownError::MissingHierarchicalParent { dim: 1, .. })
        ));
    }

    #[test]
    fn rejects_malformed_arguments() {
        let grid = GridStorage::regular(2, 3, GridType::Linear).unwrap();
        let composer = Composer::new(&grid, UpDownParams::default()).unwrap();
        let alpha = vec![1.0; grid.size()];

        assert_eq!(
            composer.updown(&alpha, &[KernelType::Mass]),
            Err(UpDownError::KernelMapping {
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(
            composer.updown(&alpha[1..], &[KernelType::Mass, KernelType::Mass]),
            Err(UpDownError::SizeMismatch { what: "alpha", .. })
        ));
        assert!(matches!(
            composer.up(&alpha, 5, KernelType::Mass),
            Err(UpDownError::DimensionOutOfRange { dim: 5, num_dims: 2 })
        ));
    }
}
