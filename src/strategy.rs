//! The common interface of all reduction strategies.
//!
//! A host solver owns one strategy. Every cycle it writes the newest snapshot
//! into the history (see [`OrderReduction::push_snapshot`]), calls
//! [`OrderReduction::order_reduction`] and reads the refreshed basis.
//! [`Strategy`] bundles the four implementations into one type so that the
//! host can pick the algorithm at runtime without changing its call sites.

use crate::config::{ReductionConfig, StrategyKind};
use crate::history;
use crate::nystrom::Nystrom;
use crate::pod::POD;
use crate::randomized_qr::RandomizedQR;
use crate::randomized_svd::RandomizedSVD;
use crate::types::{ReductionError, Result, ScalarType};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2};
use rand::Rng;

pub trait OrderReduction {
    type A: ScalarType;

    /// Which algorithm this is.
    fn kind(&self) -> StrategyKind;

    /// Recompute the basis from the current history.
    ///
    /// On error the basis keeps its previous content.
    fn order_reduction(&mut self) -> Result<()>;

    /// Return the (dim, window) history, oldest snapshot first.
    fn get_solutions(&self) -> ArrayView2<Self::A>;

    fn get_solutions_mut(&mut self) -> ArrayViewMut2<Self::A>;

    /// Return the (dim, rank) basis of the last reduction.
    fn get_basis(&self) -> ArrayView2<Self::A>;

    /// Length of a snapshot
    fn dim(&self) -> usize {
        self.get_solutions().nrows()
    }

    /// Number of snapshots in the history
    fn window(&self) -> usize {
        self.get_solutions().ncols()
    }

    /// Number of basis vectors
    fn rank(&self) -> usize {
        self.get_basis().ncols()
    }

    /// Append `snapshot` to the history and evict the oldest snapshot.
    fn push_snapshot(&mut self, snapshot: ArrayView1<Self::A>) -> Result<()> {
        history::push_snapshot(self.get_solutions_mut(), snapshot)
    }

    /// Overwrite the whole history.
    fn set_solutions(&mut self, solutions: ArrayView2<Self::A>) -> Result<()> {
        let expected = (self.dim(), self.window());
        if solutions.dim() != expected {
            return Err(ReductionError::DimensionMismatch {
                expected,
                found: solutions.dim(),
            });
        }
        self.get_solutions_mut().assign(&solutions);
        Ok(())
    }
}

/// Runtime selection of a reduction strategy.
pub enum Strategy<A: ScalarType, R: Rng> {
    POD(POD<A>),
    RandomizedQR(RandomizedQR<A, R>),
    RandomizedSVD(RandomizedSVD<A, R>),
    Nystrom(Nystrom<A>),
}

impl<A: ScalarType, R: Rng> Strategy<A, R> {
    /// Construct a strategy of the given kind.
    ///
    /// The random number generator drives all random draws of the strategy.
    /// POD ignores it and Nystrom only uses it during construction.
    pub fn new(kind: StrategyKind, config: &ReductionConfig, mut rng: R) -> Result<Self> {
        match kind {
            StrategyKind::POD => Ok(Strategy::POD(POD::new(config)?)),
            StrategyKind::RandomizedQR => Ok(Strategy::RandomizedQR(RandomizedQR::new(config, rng)?)),
            StrategyKind::RandomizedSVD => {
                Ok(Strategy::RandomizedSVD(RandomizedSVD::new(config, rng)?))
            }
            StrategyKind::Nystrom => Ok(Strategy::Nystrom(Nystrom::new(config, &mut rng)?)),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $strategy:ident => $body:expr) => {
        match $self {
            Strategy::POD($strategy) => $body,
            Strategy::RandomizedQR($strategy) => $body,
            Strategy::RandomizedSVD($strategy) => $body,
            Strategy::Nystrom($strategy) => $body,
        }
    };
}

impl<A: ScalarType, R: Rng> OrderReduction for Strategy<A, R> {
    type A = A;

    fn kind(&self) -> StrategyKind {
        dispatch!(self, strategy => strategy.kind())
    }

    fn order_reduction(&mut self) -> Result<()> {
        dispatch!(self, strategy => strategy.order_reduction())
    }

    fn get_solutions(&self) -> ArrayView2<A> {
        dispatch!(self, strategy => strategy.get_solutions())
    }

    fn get_solutions_mut(&mut self) -> ArrayViewMut2<A> {
        dispatch!(self, strategy => strategy.get_solutions_mut())
    }

    fn get_basis(&self) -> ArrayView2<A> {
        dispatch!(self, strategy => strategy.get_basis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CadencePolicy;
    use crate::helpers::{orthonormality_defect, projection_residual, truncation_error};
    use crate::random_matrix::RandomMatrix;
    use ndarray::{Array1, Array2, Axis};
    use ndarray_linalg::{Norm, SVD};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const KINDS: [StrategyKind; 4] = [
        StrategyKind::POD,
        StrategyKind::RandomizedQR,
        StrategyKind::RandomizedSVD,
        StrategyKind::Nystrom,
    ];

    fn random_unit_vectors(dim: usize, count: usize, rng: &mut StdRng) -> Array2<f64> {
        let mut mat = f64::random_gaussian((dim, count), rng);
        for mut col in mat.axis_iter_mut(Axis(1)) {
            let norm = col.norm_l2();
            col.mapv_inplace(|item| item / norm);
        }
        mat
    }

    #[test]
    fn test_end_to_end_randomized_svd() {
        let (dim, window, rank) = (50, 12, 4);
        let config = ReductionConfig::new(dim, window, rank)
            .oversampling(2)
            .resync_freq(5);

        let mut rng = StdRng::seed_from_u64(2024);
        let solutions = random_unit_vectors(dim, window, &mut rng);

        let mut strategy =
            Strategy::new(StrategyKind::RandomizedSVD, &config, StdRng::seed_from_u64(7)).unwrap();
        strategy.set_solutions(solutions.view()).unwrap();

        for _ in 0..6 {
            strategy.order_reduction().unwrap();
        }

        if let Strategy::RandomizedSVD(inner) = &strategy {
            assert_eq!(inner.sketch().counter(), 6);
        } else {
            panic!("Expected a randomized SVD strategy.");
        }

        let basis = strategy.get_basis();
        assert_eq!(basis.dim(), (dim, rank));
        assert!(orthonormality_defect(basis) < 1E-10);

        let (_, sigma, _) = solutions.svd(false, false).unwrap();
        let optimal = truncation_error(sigma.view(), rank);
        let error = projection_residual(basis, solutions.view()).unwrap();

        assert!(error >= optimal * (1.0 - 1E-10));
        assert!(error <= 3.0 * optimal);
    }

    #[test]
    fn test_every_kind_through_the_facade() {
        let (dim, window, rank) = (40, 10, 3);
        let config = ReductionConfig::new(dim, window, rank).oversampling(2);

        for (index, &kind) in KINDS.iter().enumerate() {
            let mut strategy =
                Strategy::<f64, StdRng>::new(kind, &config, StdRng::seed_from_u64(index as u64))
                    .unwrap();

            assert_eq!(strategy.kind(), kind);
            assert_eq!(strategy.dim(), dim);
            assert_eq!(strategy.window(), window);
            assert_eq!(strategy.rank(), rank);

            // The basis starts out as zero.
            assert!(strategy.get_basis().iter().all(|&item| item == 0.0));

            let mut rng = StdRng::seed_from_u64(100);
            for _ in 0..window + 3 {
                let mut snapshot = Array1::<f64>::zeros(dim);
                f64::fill_gaussian(&mut snapshot, &mut rng);
                strategy.push_snapshot(snapshot.view()).unwrap();
                strategy.order_reduction().unwrap();
            }

            let basis = strategy.get_basis();
            assert_eq!(basis.dim(), (dim, rank));
            assert!(basis.iter().all(|item| item.is_finite()));
            if kind.is_orthonormal() {
                assert!(orthonormality_defect(basis) < 1E-10);
            }
        }
    }

    #[test]
    fn test_invalid_configuration_is_rejected_for_every_kind() {
        let config = ReductionConfig::new(40, 4, 5);

        for &kind in KINDS.iter() {
            assert!(matches!(
                Strategy::<f64, StdRng>::new(kind, &config, StdRng::seed_from_u64(0)),
                Err(ReductionError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_cadence_violation_keeps_previous_basis() {
        let (dim, window, rank) = (30, 8, 3);
        let config = ReductionConfig::new(dim, window, rank)
            .oversampling(2)
            .cadence(CadencePolicy::Strict);

        for &kind in [StrategyKind::RandomizedQR, StrategyKind::RandomizedSVD].iter() {
            let mut rng = StdRng::seed_from_u64(21);
            let mut strategy =
                Strategy::<f64, StdRng>::new(kind, &config, StdRng::seed_from_u64(22)).unwrap();
            strategy
                .set_solutions(f64::random_gaussian((dim, window), &mut rng).view())
                .unwrap();
            strategy.order_reduction().unwrap();

            let mut snapshot = Array1::<f64>::zeros(dim);
            f64::fill_gaussian(&mut snapshot, &mut rng);
            strategy.push_snapshot(snapshot.view()).unwrap();
            strategy.order_reduction().unwrap();

            let basis = strategy.get_basis().to_owned();

            // Reducing again without a new snapshot breaks the cadence.
            assert!(matches!(
                strategy.order_reduction(),
                Err(ReductionError::CadenceViolation { counter: 2 })
            ));
            assert_eq!(strategy.get_basis(), basis);

            // The sketch state is untouched, so a proper cycle succeeds again.
            f64::fill_gaussian(&mut snapshot, &mut rng);
            strategy.push_snapshot(snapshot.view()).unwrap();
            strategy.order_reduction().unwrap();
            assert!(orthonormality_defect(strategy.get_basis()) < 1E-10);
        }
    }

    #[test]
    fn test_history_shape_is_enforced() {
        let config = ReductionConfig::new(20, 6, 2);
        let mut strategy =
            Strategy::<f64, StdRng>::new(StrategyKind::POD, &config, StdRng::seed_from_u64(0))
                .unwrap();

        let wrong = Array2::<f64>::zeros((20, 5));
        assert!(matches!(
            strategy.set_solutions(wrong.view()),
            Err(ReductionError::DimensionMismatch {
                expected: (20, 6),
                found: (20, 5)
            })
        ));

        let short = Array1::<f64>::zeros(19);
        assert!(matches!(
            strategy.push_snapshot(short.view()),
            Err(ReductionError::DimensionMismatch { .. })
        ));
    }
}
