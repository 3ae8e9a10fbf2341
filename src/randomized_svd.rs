//! Randomized SVD on the streaming sketch.
//!
//! An orthonormal basis $Q$ of the sketch range is obtained as in
//! [`crate::randomized_qr`]. The full history is then projected,
//! $B = Q^TX \in\mathbb{R}^{s\times M}$, and the basis is $QU_B(:, 1:k)$ for the
//! left singular vectors $U_B$ of $B$. Only $U_B$ is computed. Compared to the
//! range finder this costs an extra $O(dMs)$ for forming $B$ and is more
//! accurate for the same sketch size.

use crate::config::{ReductionConfig, StrategyKind};
use crate::pivoted_qr::PivotedQR;
use crate::sketch::{sketch_update, Sketch};
use crate::strategy::OrderReduction;
use crate::types::{ReductionError, Result, ScalarType};
use ndarray::linalg::general_mat_mul;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2};
use ndarray_linalg::SVDInplace;
use rand::Rng;
use tracing::trace;

pub struct RandomizedSVD<A: ScalarType, R: Rng> {
    solutions: Array2<A>,
    basis: Array2<A>,
    singular_values: Array1<A>,
    sketch: Sketch<A, R>,
    /// The (samples, window) projection $Q^TX$, overwritten by its SVD.
    projection: Array2<A>,
}

impl<A: ScalarType, R: Rng> RandomizedSVD<A, R> {
    pub fn new(config: &ReductionConfig, rng: R) -> Result<Self> {
        config.validate(StrategyKind::RandomizedSVD)?;

        Ok(Self {
            solutions: Array2::zeros((config.dim, config.window)),
            basis: Array2::zeros((config.dim, config.rank)),
            singular_values: Array1::zeros(config.rank),
            sketch: Sketch::from_config(config, rng)?,
            projection: Array2::zeros((config.samples(), config.window)),
        })
    }

    pub fn sketch(&self) -> &Sketch<A, R> {
        &self.sketch
    }

    /// Approximations of the leading singular values of the history.
    pub fn singular_values(&self) -> ArrayView1<A> {
        self.singular_values.view()
    }
}

impl<A: ScalarType, R: Rng> OrderReduction for RandomizedSVD<A, R> {
    type A = A;

    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomizedSVD
    }

    fn order_reduction(&mut self) -> Result<()> {
        let rank = self.basis.ncols();

        let mode = sketch_update(self.solutions.view(), &mut self.sketch)?;
        let q = self.sketch.sketch().pivoted_qr()?.q;

        general_mat_mul(
            num::one(),
            &q.t(),
            &self.solutions,
            num::zero(),
            &mut self.projection,
        );
        let (u, sigma, _) = self.projection.svd_inplace(true, false)?;
        let u = u.ok_or(ReductionError::MissingFactor("U"))?;

        let basis = q.dot(&u.slice(s![.., 0..rank]));
        self.basis.assign(&basis);
        self.singular_values.assign(&sigma.slice(s![0..rank]));
        trace!(?mode, rank, "randomized SVD basis updated");

        Ok(())
    }

    fn get_solutions(&self) -> ArrayView2<A> {
        self.solutions.view()
    }

    fn get_solutions_mut(&mut self) -> ArrayViewMut2<A> {
        self.solutions.view_mut()
    }

    fn get_basis(&self) -> ArrayView2<A> {
        self.basis.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::{orthonormality_defect, projection_residual, truncation_error};
    use crate::pod::POD;
    use crate::random_matrix::RandomMatrix;
    use crate::randomized_qr::RandomizedQR;
    use crate::types::RelDiff;
    use ndarray::Array1;
    use ndarray_linalg::SVD;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    macro_rules! randomized_svd_tests {
        ($($name:ident: $scalar:ty, $dim:expr, $rank:expr, $oversampling:expr, $tol:expr,)*) => {
            $(
            #[test]
            fn $name() {
                let (dim, window) = $dim;
                let rank = $rank;

                let mut rng = StdRng::seed_from_u64(0);
                let mat = <$scalar>::random_approximate_low_rank_matrix((dim, window), 1.0, 1E-8, &mut rng).unwrap();

                let config = ReductionConfig::new(dim, window, rank).oversampling($oversampling);
                let mut strategy = RandomizedSVD::<$scalar, _>::new(&config, StdRng::seed_from_u64(1)).unwrap();
                strategy.set_solutions(mat.view()).unwrap();
                strategy.order_reduction().unwrap();

                let basis = strategy.get_basis();
                assert_eq!(basis.dim(), (dim, rank));
                assert!(orthonormality_defect(basis) < $tol);

                // Singular value estimates never exceed the true ones.
                let (_, sigma, _) = mat.svd(false, false).unwrap();
                for (estimate, exact) in strategy.singular_values().iter().zip(sigma.iter()) {
                    assert!(*estimate <= *exact * (1.0 + $tol));
                }
            }
            )*
        };
    }

    randomized_svd_tests! {
        test_randomized_svd_no_oversampling_f64: f64, (80, 20), 6, 0, 1E-10,
        test_randomized_svd_oversampling_f64: f64, (80, 20), 6, 5, 1E-10,
        test_randomized_svd_no_oversampling_f32: f32, (80, 20), 6, 0, 1E-4,
        test_randomized_svd_oversampling_f32: f32, (80, 20), 6, 5, 1E-4,
    }

    #[test]
    fn test_randomized_svd_close_to_pod() {
        let (dim, window, rank) = (120, 30, 6);
        let mut rng = StdRng::seed_from_u64(2);
        let mat = f64::random_approximate_low_rank_matrix((dim, window), 1.0, 1E-6, &mut rng).unwrap();

        let config = ReductionConfig::new(dim, window, rank).oversampling(6);

        let mut pod = POD::<f64>::new(&config).unwrap();
        pod.set_solutions(mat.view()).unwrap();
        pod.order_reduction().unwrap();
        let optimal = truncation_error(pod.singular_values(), rank);

        let mut rsvd = RandomizedSVD::<f64, _>::new(&config, StdRng::seed_from_u64(3)).unwrap();
        rsvd.set_solutions(mat.view()).unwrap();
        rsvd.order_reduction().unwrap();
        let rsvd_error = projection_residual(rsvd.get_basis(), mat.view()).unwrap();

        let mut rqr = RandomizedQR::<f64, _>::new(&config, StdRng::seed_from_u64(3)).unwrap();
        rqr.set_solutions(mat.view()).unwrap();
        rqr.order_reduction().unwrap();
        let rqr_error = projection_residual(rqr.get_basis(), mat.view()).unwrap();

        assert!(rsvd_error >= optimal * (1.0 - 1E-10));
        assert!(rsvd_error <= 3.0 * optimal);

        // Same seed, same sketch: projecting the full history can only help.
        assert!(rsvd_error <= rqr_error * (1.0 + 1E-10));

        for (estimate, exact) in rsvd.singular_values().iter().zip(pod.singular_values().iter()) {
            assert!((estimate - exact).abs() < 1E-2 * exact);
        }
    }

    #[test]
    fn test_randomized_svd_streaming_matches_direct_projection() {
        let (dim, window, rank) = (60, 12, 4);
        let config = ReductionConfig::new(dim, window, rank)
            .oversampling(3)
            .resync_freq(4);
        let mut strategy = RandomizedSVD::<f64, _>::new(&config, StdRng::seed_from_u64(8)).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let mut snapshot = Array1::<f64>::zeros(dim);
        for _ in 0..2 * window {
            f64::fill_gaussian(&mut snapshot, &mut rng);
            strategy.push_snapshot(snapshot.view()).unwrap();
            strategy.order_reduction().unwrap();

            // Recompute the basis from the current sketch without any scratch space.
            let q = strategy.sketch().sketch().pivoted_qr().unwrap().q;
            let (u, sigma, _) = q.t().dot(&strategy.get_solutions()).svd(true, false).unwrap();
            let expected = q.dot(&u.unwrap().slice(s![.., 0..rank]));

            let basis = strategy.get_basis();
            let projector = basis.dot(&basis.t());
            let expected_projector = expected.dot(&expected.t());
            assert!(f64::rel_diff_fro(projector.view(), expected_projector.view()) < 1E-8);
            assert!(
                f64::rel_diff_l2(strategy.singular_values(), sigma.slice(s![0..rank])) < 1E-10
            );
        }
    }
}
