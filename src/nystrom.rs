//! Generalized Nystrom approximation of the snapshot history.
//!
//! Two Gaussian matrices are drawn once at construction: a column sampling
//! matrix $\Omega_1 \in\mathbb{R}^{M\times(k+p)}$ and a row sampling matrix
//! $\Omega_2 \in\mathbb{R}^{d\times k}$. With $Y = X\Omega_1$ the basis is
//!
//! $$B = Y\left(\Omega_2^TY\right)^\dagger \in\mathbb{R}^{d\times k}$$
//!
//! and $X \approx B\,\Omega_2^TX$. The basis is not orthonormal. Exact
//! recovery holds whenever the history has rank at most $k$.

use crate::config::{ReductionConfig, StrategyKind};
use crate::pinv::PseudoInverse;
use crate::random_matrix::RandomMatrix;
use crate::strategy::OrderReduction;
use crate::types::{Result, ScalarType};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use rand::Rng;
use tracing::trace;

pub struct Nystrom<A: ScalarType> {
    solutions: Array2<A>,
    basis: Array2<A>,
    column_sampling: Array2<A>,
    row_sampling: Array2<A>,
    /// $Y = X\Omega_1$
    column_product: Array2<A>,
    /// $\Omega_2^TY$
    core: Array2<A>,
}

impl<A: ScalarType> Nystrom<A> {
    /// Draw both sampling matrices from `rng`. They stay fixed for the
    /// lifetime of the strategy.
    pub fn new<R: Rng>(config: &ReductionConfig, rng: &mut R) -> Result<Self> {
        config.validate(StrategyKind::Nystrom)?;

        let column_sampling = A::random_gaussian((config.window, config.samples()), rng);
        let row_sampling = A::random_gaussian((config.dim, config.rank), rng);

        Ok(Self {
            solutions: Array2::zeros((config.dim, config.window)),
            basis: Array2::zeros((config.dim, config.rank)),
            column_sampling,
            row_sampling,
            column_product: Array2::zeros((config.dim, config.samples())),
            core: Array2::zeros((config.rank, config.samples())),
        })
    }

    /// The (window, rank + oversampling) column sampling matrix
    pub fn column_sampling(&self) -> ArrayView2<A> {
        self.column_sampling.view()
    }

    /// The (dim, rank) row sampling matrix
    pub fn row_sampling(&self) -> ArrayView2<A> {
        self.row_sampling.view()
    }

    /// Return the low-rank approximation $B\,\Omega_2^TX$ of the current history.
    pub fn reconstruct(&self) -> Array2<A> {
        let coefficients = self.row_sampling.t().dot(&self.solutions);
        self.basis.dot(&coefficients)
    }
}

impl<A: ScalarType> OrderReduction for Nystrom<A> {
    type A = A;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Nystrom
    }

    fn order_reduction(&mut self) -> Result<()> {
        general_mat_mul(
            num::one(),
            &self.solutions,
            &self.column_sampling,
            num::zero(),
            &mut self.column_product,
        );
        general_mat_mul(
            num::one(),
            &self.row_sampling.t(),
            &self.column_product,
            num::zero(),
            &mut self.core,
        );

        let basis = self.column_product.dot(&self.core.pinv()?);
        self.basis.assign(&basis);
        trace!(rank = self.basis.ncols(), "Nystrom basis updated");

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
