//! Proper orthogonal decomposition of the snapshot history.
//!
//! The basis consists of the leading `rank` left singular vectors of the
//! history $X = U\Sigma V^T$. This is the best rank `rank` subspace in the
//! Frobenius norm and the reference the randomized strategies are measured
//! against. Every call computes a new SVD of the whole history.

use crate::config::{ReductionConfig, StrategyKind};
use crate::strategy::OrderReduction;
use crate::types::{ReductionError, Result, ScalarType};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut2};
use ndarray_linalg::{JobSvd, SVDDCInto};
use tracing::trace;

pub struct POD<A: ScalarType> {
    solutions: Array2<A>,
    basis: Array2<A>,
    singular_values: Array1<A>,
}

impl<A: ScalarType> POD<A> {
    pub fn new(config: &ReductionConfig) -> Result<Self> {
        config.validate(StrategyKind::POD)?;

        Ok(Self {
            solutions: Array2::zeros((config.dim, config.window)),
            basis: Array2::zeros((config.dim, config.rank)),
            singular_values: Array1::zeros(config.dim.min(config.window)),
        })
    }

    /// Singular values of the history at the last reduction, in non-increasing order.
    pub fn singular_values(&self) -> ArrayView1<A> {
        self.singular_values.view()
    }
}

impl<A: ScalarType> OrderReduction for POD<A> {
    type A = A;

    fn kind(&self) -> StrategyKind {
        StrategyKind::POD
    }

    fn order_reduction(&mut self) -> Result<()> {
        let rank = self.basis.ncols();

        let (u, sigma, _) = self.solutions.to_owned().svddc_into(JobSvd::Some)?;
        let u = u.ok_or(ReductionError::MissingFactor("U"))?;

        self.basis.assign(&u.slice(s![.., 0..rank]));
        self.singular_values.assign(&sigma);
        trace!(rank, "POD basis updated");

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
