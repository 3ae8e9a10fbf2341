//! Rolling history of snapshots.
//!
//! The history is a (dim, window) array whose columns are the `window` most
//! recent snapshots, oldest first. Every cycle the oldest column is evicted
//! and the newest snapshot is written into the last column.

use crate::types::{ReductionError, Result};
use ndarray::{ArrayView1, ArrayViewMut2, Axis};

/// Move every lane along `axis` one position towards the front.
///
/// The first lane is overwritten and the last lane keeps its old content.
pub(crate) fn shift_lanes<A: Clone>(mut mat: ArrayViewMut2<A>, axis: Axis) {
    let len = mat.len_of(axis);
    for index in 1..len {
        let (mut head, tail) = mat.view_mut().split_at(axis, index);
        head.index_axis_mut(axis, index - 1)
            .assign(&tail.index_axis(axis, 0));
    }
}

/// Append `snapshot` as the newest column of `history` and evict the oldest one.
pub fn push_snapshot<A: Clone>(mut history: ArrayViewMut2<A>, snapshot: ArrayView1<A>) -> Result<()> {
    let (dim, window) = history.dim();
    if snapshot.len() != dim {
        return Err(ReductionError::DimensionMismatch {
            expected: (dim, 1),
            found: (snapshot.len(), 1),
        });
    }
    if window == 0 {
        return Ok(());
    }

    shift_lanes(history.view_mut(), Axis(1));
    history.index_axis_mut(Axis(1), window - 1).assign(&snapshot);
    Ok(())
}
