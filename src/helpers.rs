//! Diagnostics for reduced bases.

use crate::types::{ReductionError, Result, ScalarType};
use ndarray::{ArrayView1, ArrayView2};
use ndarray_linalg::Norm;
use num::Float;

/// Largest entry of $|B^TB - I|$.
///
/// Zero for a basis with exactly orthonormal columns.
pub fn orthonormality_defect<A: ScalarType>(basis: ArrayView2<A>) -> A {
    let gram = basis.t().dot(&basis);

    gram.indexed_iter()
        .fold(num::zero(), |acc: A, ((row, col), &item)| {
            let target = if row == col { num::one() } else { num::zero() };
            Float::max(acc, Float::abs(item - target))
        })
}

/// Frobenius norm of $X - BB^TX$.
///
/// This is the orthogonal projection error of `mat` onto the span of `basis`
/// and is only meaningful for a basis with orthonormal columns.
pub fn projection_residual<A: ScalarType>(basis: ArrayView2<A>, mat: ArrayView2<A>) -> Result<A> {
    if basis.nrows() != mat.nrows() {
        return Err(ReductionError::DimensionMismatch {
            expected: (mat.nrows(), basis.ncols()),
            found: basis.dim(),
        });
    }

    let residual = &mat - &basis.dot(&basis.t().dot(&mat));
    Ok(residual.norm_l2())
}

/// Error of the best rank `rank` approximation in the Frobenius norm.
///
/// By Eckart-Young this is $\sqrt{\sum_{i > rank} \sigma_i^2}$ for the
/// singular values `sigma` in non-increasing order.
pub fn truncation_error<A: ScalarType>(sigma: ArrayView1<A>, rank: usize) -> A {
    let tail = sigma
        .iter()
        .skip(rank)
        .fold(num::zero(), |acc: A, &item| acc + item * item);
    Float::sqrt(tail)
}
