//! Randomized range finder on the streaming sketch.
//!
//! The sketch $\Omega = XZ$ with $s = k + p$ columns is factorized as
//! $\Omega P = QR$. Without oversampling $Q$ is the basis. With oversampling
//! the range estimate is truncated to rank $k$ through the SVD
//! $R = U_R\Sigma_R V_R^T$, giving the basis $QU_R(:, 1:k)$, the leading $k$
//! left singular vectors of $\Omega$.
//!
//! A rank-deficient sketch still yields an orthonormal basis, but its
//! trailing columns then carry no information about the history.

use crate::config::{ReductionConfig, StrategyKind};
use crate::pivoted_qr::PivotedQR;
use crate::sketch::{sketch_update, Sketch};
use crate::strategy::OrderReduction;
use crate::types::{ReductionError, Result, ScalarType};
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2};
use ndarray_linalg::SVDInplace;
use rand::Rng;
use tracing::trace;

pub struct RandomizedQR<A: ScalarType, R: Rng> {
    solutions: Array2<A>,
    basis: Array2<A>,
    sketch: Sketch<A, R>,
    /// Leading (samples, samples) block of R, overwritten by its SVD.
    truncation: Array2<A>,
}

impl<A: ScalarType, R: Rng> RandomizedQR<A, R> {
    pub fn new(config: &ReductionConfig, rng: R) -> Result<Self> {
        config.validate(StrategyKind::RandomizedQR)?;

        Ok(Self {
            solutions: Array2::zeros((config.dim, config.window)),
            basis: Array2::zeros((config.dim, config.rank)),
            sketch: Sketch::from_config(config, rng)?,
            truncation: Array2::zeros((config.samples(), config.samples())),
        })
    }

    pub fn sketch(&self) -> &Sketch<A, R> {
        &self.sketch
    }

    pub fn oversampling(&self) -> usize {
        self.sketch.samples() - self.basis.ncols()
    }
}

impl<A: ScalarType, R: Rng> OrderReduction for RandomizedQR<A, R> {
    type A = A;

    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomizedQR
    }

    fn order_reduction(&mut self) -> Result<()> {
        let rank = self.basis.ncols();
        let samples = self.sketch.samples();

        let mode = sketch_update(self.solutions.view(), &mut self.sketch)?;
        let qr = self.sketch.sketch().pivoted_qr()?;

        if samples == rank {
            self.basis.assign(&qr.q);
        } else {
            self.truncation
                .assign(&qr.r.slice(s![0..samples, 0..samples]));
            let (u, _, _) = self.truncation.svd_inplace(true, false)?;
            let u = u.ok_or(ReductionError::MissingFactor("U"))?;
            let basis = qr.q.dot(&u.slice(s![.., 0..rank]));
            self.basis.assign(&basis);
        }
        trace!(?mode, rank, samples, "randomized QR basis updated");

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
