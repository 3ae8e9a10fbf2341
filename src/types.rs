//! This module collects the error type and the scalar trait shared by all strategies.

use crate::pivoted_qr::PivotedQRImpl;
use crate::random_matrix::RandomMatrix;
use ndarray::{ArrayView1, ArrayView2};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{Lapack, Norm};
use num::Float;
use thiserror::Error;

pub use ndarray_linalg::Scalar;

#[derive(Error, Debug)]
pub enum ReductionError {
    #[error("Lapack Error: {0}")]
    LinalgError(#[from] LinalgError),
    #[error("Lapack routine `{routine}` failed with info = {info}")]
    LapackError { routine: &'static str, info: i32 },
    #[error("Incompatible memory layout")]
    LayoutError,
    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("History was not advanced by exactly one snapshot before sketch update {counter}")]
    CadenceViolation { counter: usize },
    #[error("Factorization did not return the {0} factor")]
    MissingFactor(&'static str),
}

pub type Result<T> = std::result::Result<T, ReductionError>;

/// Real scalar types for which all reduction strategies are available.
///
/// This is implemented for `f32` and `f64`.
pub trait ScalarType: Scalar<Real = Self> + Lapack + Float + RandomMatrix + PivotedQRImpl {}

impl<A> ScalarType for A where A: Scalar<Real = A> + Lapack + Float + RandomMatrix + PivotedQRImpl {}

pub trait RelDiff {
    type A: ScalarType;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    fn rel_diff_fro(first: ArrayView2<Self::A>, second: ArrayView2<Self::A>) -> Self::A;

    /// Return the relative l2 vector norm difference of `first` and `second`.
    fn rel_diff_l2(first: ArrayView1<Self::A>, second: ArrayView1<Self::A>) -> Self::A;
}

impl<A: ScalarType> RelDiff for A {
    type A = A;

    fn rel_diff_fro(first: ArrayView2<A>, second: ArrayView2<A>) -> A {
        let diff = &first - &second;
        diff.norm_l2() / second.norm_l2()
    }

    fn rel_diff_l2(first: ArrayView1<A>, second: ArrayView1<A>) -> A {
        let diff = &first - &second;
        diff.norm_l2() / second.norm_l2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dimension_mismatch_message() {
        let error = ReductionError::DimensionMismatch {
            expected: (10, 1),
            found: (9, 1),
        };
        assert_eq!(
            error.to_string(),
            "Dimension mismatch: expected (10, 1), found (9, 1)"
        );
    }

    #[test]
    fn test_cadence_violation_message() {
        let error = ReductionError::CadenceViolation { counter: 7 };
        assert_eq!(
            error.to_string(),
            "History was not advanced by exactly one snapshot before sketch update 7"
        );
    }

    #[test]
    fn test_rel_diff() {
        let first = array![[1.0, 0.0], [0.0, 1.0]];
        let second = array![[1.0, 0.0], [0.0, 2.0]];

        let expected = 1.0 / 5.0_f64.sqrt();
        assert!((f64::rel_diff_fro(first.view(), second.view()) - expected).abs() < 1E-14);
        assert!(
            (f64::rel_diff_l2(first.row(1), second.row(1)) - 0.5).abs() < 1E-14
        );
    }
}
