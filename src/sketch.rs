//! Incrementally maintained random sketch of the snapshot history.
//!
//! For a history $X\in\mathbb{R}^{d\times M}$ and a Gaussian test matrix
//! $Z\in\mathbb{R}^{M\times s}$ the sketch is $\Omega = XZ$. Recomputing
//! $\Omega$ costs $O(dMs)$. Between two cycles the history only loses its
//! first column $x_0$ and gains a new last column $x_{new}$, so with a fresh
//! Gaussian row $z$
//!
//! $$\Omega_{new} = \Omega + x_{new} z^T - x_0 Z_{0,:}$$
//!
//! where $Z$ is shifted up by one row and $z$ becomes its last row. This costs
//! $O(ds)$. The subtracted term is cached at the end of the previous update.
//! Rounding errors accumulate over the incremental updates, so every
//! `freq`-th update draws a new $Z$ and recomputes $\Omega = XZ$ from scratch.

use crate::config::{CadencePolicy, ReductionConfig};
use crate::history::shift_lanes;
use crate::types::{ReductionError, Result, ScalarType};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use tracing::{debug, trace};

/// Which branch a sketch update took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SketchMode {
    /// New test matrix and $\Omega = XZ$ recomputed from scratch
    Full,
    /// Rank-one update for the newest and the evicted snapshot
    Incremental,
}

pub struct Sketch<A: ScalarType, R: Rng> {
    /// The (window, samples) Gaussian test matrix $Z$.
    test_matrix: Array2<A>,
    /// The (dim, samples) sketch $\Omega$.
    sketch: Array2<A>,
    /// Contribution of the current oldest snapshot, $x_0 Z_{0,:}$.
    eviction_correction: Array2<A>,
    new_row: Array1<A>,
    /// Newest snapshot of the last update, only kept under the strict cadence policy.
    newest: Array1<A>,
    counter: usize,
    freq: usize,
    cadence: CadencePolicy,
    rng: R,
}

impl<A: ScalarType, R: Rng> Sketch<A, R> {
    /// Allocate a zero sketch. The first update is always a full resync.
    pub fn new(
        dim: usize,
        window: usize,
        samples: usize,
        freq: usize,
        cadence: CadencePolicy,
        rng: R,
    ) -> Result<Self> {
        if dim == 0 || window == 0 || samples == 0 {
            return Err(ReductionError::InvalidParameter(format!(
                "dim, window and samples must be positive, got dim = {}, window = {}, samples = {}",
                dim, window, samples
            )));
        }
        if freq == 0 {
            return Err(ReductionError::InvalidParameter(
                "resync_freq must be positive".into(),
            ));
        }

        let newest_len = match cadence {
            CadencePolicy::Strict => dim,
            CadencePolicy::Unchecked => 0,
        };

        Ok(Self {
            test_matrix: Array2::zeros((window, samples)),
            sketch: Array2::zeros((dim, samples)),
            eviction_correction: Array2::zeros((dim, samples)),
            new_row: Array1::zeros(samples),
            newest: Array1::zeros(newest_len),
            counter: 0,
            freq,
            cadence,
            rng,
        })
    }

    pub fn from_config(config: &ReductionConfig, rng: R) -> Result<Self> {
        Self::new(
            config.dim,
            config.window,
            config.samples(),
            config.resync_freq,
            config.cadence,
            rng,
        )
    }

    pub fn sketch(&self) -> ArrayView2<A> {
        self.sketch.view()
    }

    pub fn test_matrix(&self) -> ArrayView2<A> {
        self.test_matrix.view()
    }

    pub fn eviction_correction(&self) -> ArrayView2<A> {
        self.eviction_correction.view()
    }

    /// Number of updates performed so far.
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn freq(&self) -> usize {
        self.freq
    }

    pub fn samples(&self) -> usize {
        self.sketch.ncols()
    }

    pub fn dim(&self) -> usize {
        self.sketch.nrows()
    }

    pub fn window(&self) -> usize {
        self.test_matrix.nrows()
    }

    /// The branch the next call to [`sketch_update`] will take.
    pub fn next_mode(&self) -> SketchMode {
        if self.counter % self.freq == 0 {
            SketchMode::Full
        } else {
            SketchMode::Incremental
        }
    }
}

/// Bring `sketch` up to date with the current history `solutions`.
///
/// Must be called exactly once per cycle, after the host has appended the
/// newest snapshot and evicted the oldest one.
pub fn sketch_update<A, R>(solutions: ArrayView2<A>, sketch: &mut Sketch<A, R>) -> Result<SketchMode>
where
    A: ScalarType,
    R: Rng,
{
    let expected = (sketch.dim(), sketch.window());
    if solutions.dim() != expected {
        return Err(ReductionError::DimensionMismatch {
            expected,
            found: solutions.dim(),
        });
    }
    let window = expected.1;

    let mode = sketch.next_mode();
    match mode {
        SketchMode::Full => {
            A::fill_gaussian(&mut sketch.test_matrix, &mut sketch.rng);
            general_mat_mul(
                num::one(),
                &solutions,
                &sketch.test_matrix,
                num::zero(),
                &mut sketch.sketch,
            );
            debug!(
                counter = sketch.counter,
                freq = sketch.freq,
                "full sketch resync"
            );
        }
        SketchMode::Incremental => {
            if sketch.cadence == CadencePolicy::Strict
                && window > 1
                && solutions.index_axis(Axis(1), window - 2) != sketch.newest
            {
                return Err(ReductionError::CadenceViolation {
                    counter: sketch.counter,
                });
            }

            A::fill_gaussian(&mut sketch.new_row, &mut sketch.rng);

            sketch.sketch -= &sketch.eviction_correction;
            let newest = solutions.index_axis(Axis(1), window - 1);
            general_mat_mul(
                num::one(),
                &newest.insert_axis(Axis(1)),
                &sketch.new_row.view().insert_axis(Axis(0)),
                num::one(),
                &mut sketch.sketch,
            );

            shift_lanes(sketch.test_matrix.view_mut(), Axis(0));
            sketch
                .test_matrix
                .index_axis_mut(Axis(0), window - 1)
                .assign(&sketch.new_row);
            trace!(counter = sketch.counter, "incremental sketch update");
        }
    }

    // Cache the part of the sketch that leaves with the oldest snapshot.
    let oldest = solutions.index_axis(Axis(1), 0);
    general_mat_mul(
        num::one(),
        &oldest.insert_axis(Axis(1)),
        &sketch.test_matrix.index_axis(Axis(0), 0).insert_axis(Axis(0)),
        num::zero(),
        &mut sketch.eviction_correction,
    );

    if sketch.cadence == CadencePolicy::Strict {
        sketch
            .newest
            .assign(&solutions.index_axis(Axis(1), window - 1));
    }

    sketch.counter += 1;
    Ok(mode)
}
