//! Generation of random matrices for the sketching strategies and their tests

use crate::types::{ReductionError, Result};
use ndarray::{Array, Array2, ArrayBase, DataMut, Dimension};
use ndarray_linalg::{JobSvd, Lapack, SVDDCInto, Scalar};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

pub trait RandomMatrix
where
    Self: Scalar + Lapack,
{
    /// Overwrite every entry of `arr` with an independent standard normal sample.
    ///
    /// Sketch buffers are refreshed through this function so that no new
    /// allocation is needed on a resync.
    fn fill_gaussian<S, D, R>(arr: &mut ArrayBase<S, D>, rng: &mut R)
    where
        S: DataMut<Elem = Self>,
        D: Dimension,
        R: Rng;

    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let mut mat = Array2::<Self>::zeros(dimension);
        Self::fill_gaussian(&mut mat, rng);
        mat
    }

    /// Generate a random matrix with orthogonal rows or columns.
    ///
    /// If m > n then the returned matrix has orthogonal columns. If n > m
    /// the returned matrix has orthogonalized rows.
    fn random_orthogonal_matrix<R: Rng>(
        dimension: (usize, usize),
        rng: &mut R,
    ) -> Result<Array2<Self>> {
        let mut m = dimension.0;
        let mut n = dimension.1;

        // Always orthogonalize a long and skinny matrix
        if dimension.1 > dimension.0 {
            std::mem::swap(&mut m, &mut n);
        }

        let mat = Self::random_gaussian((m, n), rng);

        let (u, _, _) = mat.svddc_into(JobSvd::Some)?;
        let u = u.ok_or(ReductionError::MissingFactor("U"))?;

        if dimension.1 > dimension.0 {
            Ok(u.reversed_axes())
        } else {
            Ok(u)
        }
    }

    /// Generate a random approximate low-rank matrix.
    ///
    /// The singular values are logarithmically distributed between
    /// `sigma_max` and `sigma_min`.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `sigma_max`: Maximum singular value.
    /// * `sigma_min`: Minimum singular value.
    /// * `rng`: The random number generator to use.
    fn random_approximate_low_rank_matrix<R: Rng>(
        dimension: (usize, usize),
        sigma_max: f64,
        sigma_min: f64,
        rng: &mut R,
    ) -> Result<Array2<Self>> {
        if !(sigma_min > 0.0 && sigma_min < sigma_max) {
            return Err(ReductionError::InvalidParameter(format!(
                "require 0 < sigma_min < sigma_max, got sigma_min = {}, sigma_max = {}",
                sigma_min, sigma_max
            )));
        }

        let min_dim = std::cmp::min(dimension.0, dimension.1);

        let u = Self::random_orthogonal_matrix((dimension.0, min_dim), rng)?;
        let vt = Self::random_orthogonal_matrix((min_dim, dimension.1), rng)?;
        let singvals = Array::geomspace(sigma_max, sigma_min, min_dim)
            .ok_or_else(|| ReductionError::InvalidParameter("empty singular value range".into()))?
            .map(|&item| Self::from_real(Self::real(item)));
        let sigma = Array2::from_diag(&singvals);
        Ok(u.dot(&sigma.dot(&vt)))
    }
}

macro_rules! random_matrix_impl {
    ($scalar:ty) => {
        impl RandomMatrix for $scalar {
            fn fill_gaussian<S, D, R>(arr: &mut ArrayBase<S, D>, rng: &mut R)
            where
                S: DataMut<Elem = Self>,
                D: Dimension,
                R: Rng,
            {
                arr.map_inplace(|item| {
                    *item = <StandardNormal as Distribution<$scalar>>::sample(&StandardNormal, &mut *rng)
                });
            }
        }
    };
}

random_matrix_impl!(f32);
random_matrix_impl!(f64);
