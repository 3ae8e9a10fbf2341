//! Moore-Penrose pseudo-inverse through the divide and conquer SVD.
//!
//! Let $A = U\Sigma V^T$. The pseudo-inverse is $A^\dagger = V\Sigma^\dagger U^T$,
//! where singular values $\sigma_i \leq \max(m, n)\, \epsilon\, \sigma_1$ are treated as zero.
//! A zero matrix therefore has the zero matrix as its pseudo-inverse.

use crate::types::{ReductionError, Result, ScalarType};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_linalg::{JobSvd, SVDDCInto};
use num::Float;
use tracing::debug;

pub trait PseudoInverse {
    type A: ScalarType;

    /// Return the (n, m) pseudo-inverse of an (m, n) matrix.
    fn pinv(&self) -> Result<Array2<Self::A>>;
}

impl<A, S> PseudoInverse for ArrayBase<S, Ix2>
where
    A: ScalarType,
    S: Data<Elem = A>,
{
    type A = A;

    fn pinv(&self) -> Result<Array2<A>> {
        let (nrows, ncols) = self.dim();
        if nrows == 0 || ncols == 0 {
            return Ok(Array2::zeros((ncols, nrows)));
        }

        let (u, sigma, vt) = self.to_owned().svddc_into(JobSvd::Some)?;
        let u = u.ok_or(ReductionError::MissingFactor("U"))?;
        let vt = vt.ok_or(ReductionError::MissingFactor("VT"))?;

        let sigma_max = sigma
            .iter()
            .fold(num::zero(), |acc: A, &item| Float::max(acc, item));
        let cutoff = A::real(nrows.max(ncols)) * <A as Float>::epsilon() * sigma_max;

        let mut v = vt.reversed_axes();
        let mut truncated = 0;
        for (mut col, &sigma_elem) in v.axis_iter_mut(Axis(1)).zip(sigma.iter()) {
            if sigma_elem > cutoff {
                let inv: A = num::one::<A>() / sigma_elem;
                col.map_inplace(|item| *item = *item * inv);
            } else {
                col.fill(num::zero());
                truncated += 1;
            }
        }

        if truncated > 0 {
            debug!(
                truncated,
                retained = sigma.len() - truncated,
                "pseudo-inverse dropped singular values below cutoff"
            );
        }

        Ok(v.dot(&u.t()))
    }
}
