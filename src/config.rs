//! Construction parameters shared by all reduction strategies.

use crate::types::{ReductionError, Result};

/// Oversampling used when none is given.
pub const DEFAULT_OVERSAMPLING: usize = 0;

/// Number of sketch updates between two full resyncs when none is given.
pub const DEFAULT_RESYNC_FREQ: usize = 50;

/// The available strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// Truncated SVD of the full history
    POD,
    /// Randomized range finder on the incrementally maintained sketch
    RandomizedQR,
    /// Randomized SVD on the incrementally maintained sketch
    RandomizedSVD,
    /// Generalized Nystrom approximation with static sampling matrices
    Nystrom,
}

impl StrategyKind {
    /// Whether the strategy reads its basis from an incrementally updated sketch.
    pub fn is_sketched(&self) -> bool {
        matches!(self, StrategyKind::RandomizedQR | StrategyKind::RandomizedSVD)
    }

    /// Whether the produced basis has orthonormal columns.
    pub fn is_orthonormal(&self) -> bool {
        !matches!(self, StrategyKind::Nystrom)
    }
}

/// How strictly the sketch checks that the host advanced the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CadencePolicy {
    /// The host must append exactly one snapshot and evict the oldest before
    /// each reduction. This is not checked.
    Unchecked,
    /// Before each incremental update the sketch compares the previous newest
    /// column with its expected new position and fails with
    /// [`ReductionError::CadenceViolation`] if the history did not move by one.
    Strict,
}

impl Default for CadencePolicy {
    fn default() -> Self {
        CadencePolicy::Unchecked
    }
}

/// Dimensions and tuning knobs of a strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReductionConfig {
    /// Length of a single snapshot.
    pub dim: usize,
    /// Number of snapshots kept in the history.
    pub window: usize,
    /// Target rank of the basis.
    pub rank: usize,
    /// Additional random samples beyond `rank`.
    pub oversampling: usize,
    /// Sketch updates between two full resyncs.
    pub resync_freq: usize,
    pub cadence: CadencePolicy,
}

impl ReductionConfig {
    pub fn new(dim: usize, window: usize, rank: usize) -> Self {
        Self {
            dim,
            window,
            rank,
            oversampling: DEFAULT_OVERSAMPLING,
            resync_freq: DEFAULT_RESYNC_FREQ,
            cadence: CadencePolicy::default(),
        }
    }

    pub fn oversampling(mut self, oversampling: usize) -> Self {
        self.oversampling = oversampling;
        self
    }

    pub fn resync_freq(mut self, resync_freq: usize) -> Self {
        self.resync_freq = resync_freq;
        self
    }

    pub fn cadence(mut self, cadence: CadencePolicy) -> Self {
        self.cadence = cadence;
        self
    }

    /// Number of random samples, `rank + oversampling`.
    ///
    /// Saturates at `usize::MAX`, which [`ReductionConfig::validate`] rejects.
    pub fn samples(&self) -> usize {
        self.rank.saturating_add(self.oversampling)
    }

    /// Check that the parameters admit a strategy of the given kind.
    pub fn validate(&self, kind: StrategyKind) -> Result<()> {
        if self.dim == 0 || self.window == 0 || self.rank == 0 {
            return Err(ReductionError::InvalidParameter(format!(
                "dim, window and rank must be positive, got dim = {}, window = {}, rank = {}",
                self.dim, self.window, self.rank
            )));
        }

        let required = match kind {
            StrategyKind::POD => self.rank,
            _ => self.rank.checked_add(self.oversampling).ok_or_else(|| {
                ReductionError::InvalidParameter(format!(
                    "rank + oversampling overflows, got rank = {}, oversampling = {}",
                    self.rank, self.oversampling
                ))
            })?,
        };

        if required > self.window {
            return Err(ReductionError::InvalidParameter(format!(
                "{:?} needs a history of at least {} snapshots, got window = {}",
                kind, required, self.window
            )));
        }

        if required > self.dim {
            return Err(ReductionError::InvalidParameter(format!(
                "{:?} needs snapshots of length at least {}, got dim = {}",
                kind, required, self.dim
            )));
        }

        if kind.is_sketched() && self.resync_freq == 0 {
            return Err(ReductionError::InvalidParameter(
                "resync_freq must be positive".into(),
            ));
        }

        Ok(())
    }
}
