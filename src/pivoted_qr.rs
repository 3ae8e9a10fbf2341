//! This module implements QR with pivoting by calling into the
//! corresponding Lapack routines. Pivoted QR is currently not
//! implemented in ndarray-linalg, making this module necessary.
//!
//! The pivoted QR decomposition of a matrix $A\in\mathbb{R}^{m\times n}$ is
//! $AP = QR$ with $Q\in\mathbb{R}^{m\times k}$ orthonormal, $R\in\mathbb{R}^{k\times n}$
//! upper triangular with $|r_{11}|\geq |r_{22}|\geq \dots$ and $k=\min(m, n)$.
//! Column pivoting moves linearly dependent columns to the end, so a
//! rank-deficient sketch shows up as small trailing diagonal entries of $R$
//! while $Q$ stays orthonormal.

use crate::types::{ReductionError, Result};
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2, ShapeBuilder};
use ndarray_linalg::{Lapack, Scalar};

pub struct QR<A: Scalar> {
    /// The Q matrix from the QR Decomposition
    pub q: Array2<A>,
    /// The R matrix from the QR Decomposition
    pub r: Array2<A>,
    /// An index array. If ind\[j\] = k then the
    /// jth column of Q * R is identical to the
    /// kth column of the original matrix A.
    pub ind: Array1<usize>,
}

impl<A: Scalar> QR<A> {
    /// Number of columns of Q.
    pub fn rank(&self) -> usize {
        self.q.ncols()
    }

    /// Convert the QR decomposition back to a matrix, undoing the pivoting.
    pub fn to_mat(&self) -> Array2<A> {
        let prod = self.q.dot(&self.r);
        let mut mat = Array2::<A>::zeros(prod.dim());

        for (col_index, col) in prod.axis_iter(Axis(1)).enumerate() {
            mat.index_axis_mut(Axis(1), self.ind[col_index]).assign(&col);
        }

        mat
    }
}

pub trait PivotedQR {
    type Q: Scalar + Lapack;

    fn pivoted_qr(&self) -> Result<QR<Self::Q>>;
}

impl<A, S> PivotedQR for ArrayBase<S, Ix2>
where
    A: PivotedQRImpl,
    S: Data<Elem = A>,
{
    type Q = A;

    fn pivoted_qr(&self) -> Result<QR<Self::Q>> {
        let m = self.nrows();
        let n = self.ncols();

        let mut mat_fortran = Array2::<A>::zeros((m, n).f());
        mat_fortran.assign(self);
        A::pivoted_qr_impl(mat_fortran)
    }
}

pub trait PivotedQRImpl
where
    Self: Scalar + Lapack,
{
    /// Factorize a column-major matrix in place.
    fn pivoted_qr_impl(mat: Array2<Self>) -> Result<QR<Self>>;
}

macro_rules! impl_qr_pivot {
    ($scalar:ty, $qrf:path, $qrf_name:expr, $orgqr:path, $orgqr_name:expr) => {
        impl PivotedQRImpl for $scalar {
            fn pivoted_qr_impl(mut mat: Array2<Self>) -> Result<QR<$scalar>> {
                let m = mat.nrows();
                let n = mat.ncols();
                let k = m.min(n);
                let lda = std::cmp::max(1, m) as i32;

                let mut tau = vec![0.0 as $scalar; k];
                let mut jpvt = vec![0i32; n];
                let mut info = 0;

                {
                    let data = mat
                        .as_slice_memory_order_mut()
                        .ok_or(ReductionError::LayoutError)?;

                    let mut work_size = [0.0 as $scalar];
                    unsafe {
                        $qrf(
                            m as i32,
                            n as i32,
                            data,
                            lda,
                            &mut jpvt,
                            &mut tau,
                            &mut work_size,
                            -1,
                            &mut info,
                        );
                    }
                    if info != 0 {
                        return Err(ReductionError::LapackError {
                            routine: $qrf_name,
                            info,
                        });
                    }

                    let lwork = std::cmp::max(1, work_size[0] as usize);
                    let mut work = vec![0.0 as $scalar; lwork];
                    unsafe {
                        $qrf(
                            m as i32,
                            n as i32,
                            data,
                            lda,
                            &mut jpvt,
                            &mut tau,
                            &mut work,
                            lwork as i32,
                            &mut info,
                        );
                    }
                    if info != 0 {
                        return Err(ReductionError::LapackError {
                            routine: $qrf_name,
                            info,
                        });
                    }
                }

                let mut r_mat = mat.slice(s![0..k, ..]).to_owned();
                for ((row, col), item) in r_mat.indexed_iter_mut() {
                    if row > col {
                        *item = 0.0;
                    }
                }

                {
                    // The first k columns of a column-major array are contiguous.
                    let data = mat
                        .as_slice_memory_order_mut()
                        .ok_or(ReductionError::LayoutError)?;
                    let reflectors = &mut data[..m * k];

                    let mut work_size = [0.0 as $scalar];
                    unsafe {
                        $orgqr(
                            m as i32,
                            k as i32,
                            k as i32,
                            reflectors,
                            lda,
                            &tau,
                            &mut work_size,
                            -1,
                            &mut info,
                        );
                    }
                    if info != 0 {
                        return Err(ReductionError::LapackError {
                            routine: $orgqr_name,
                            info,
                        });
                    }

                    let lwork = std::cmp::max(1, work_size[0] as usize);
                    let mut work = vec![0.0 as $scalar; lwork];
                    unsafe {
                        $orgqr(
                            m as i32,
                            k as i32,
                            k as i32,
                            reflectors,
                            lda,
                            &tau,
                            &mut work,
                            lwork as i32,
                            &mut info,
                        );
                    }
                    if info != 0 {
                        return Err(ReductionError::LapackError {
                            routine: $orgqr_name,
                            info,
                        });
                    }
                }

                let q_mat = mat.slice(s![.., 0..k]).to_owned();

                // Lapack counts pivots from one.
                let ind = jpvt.iter().map(|&item| (item - 1) as usize).collect();

                Ok(QR {
                    q: q_mat,
                    r: r_mat,
                    ind,
                })
            }
        }
    };
}

impl_qr_pivot!(f64, lapack::dgeqp3, "dgeqp3", lapack::dorgqr, "dorgqr");
impl_qr_pivot!(f32, lapack::sgeqp3, "sgeqp3", lapack::sorgqr, "sorgqr");
