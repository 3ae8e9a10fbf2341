//! Streaming dimensionality reduction for snapshot histories.
//!
//! A host solver keeps a sliding window of its most recent solution vectors
//! and asks a strategy for a low-dimensional basis after every step. The
//! randomized strategies keep a sketch of the history that is updated in
//! $O(dk)$ work per step and periodically recomputed from scratch.

pub mod config;
pub mod helpers;
pub mod history;
pub mod nystrom;
pub mod pinv;
pub mod pivoted_qr;
pub mod pod;
pub mod random_matrix;
pub mod randomized_qr;
pub mod randomized_svd;
pub mod sketch;
pub mod strategy;
pub mod types;

pub use config::{CadencePolicy, ReductionConfig, StrategyKind};
pub use helpers::{orthonormality_defect, projection_residual, truncation_error};
pub use nystrom::Nystrom;
pub use pinv::PseudoInverse;
pub use pivoted_qr::{PivotedQR, QR};
pub use pod::POD;
pub use random_matrix::RandomMatrix;
pub use randomized_qr::RandomizedQR;
pub use randomized_svd::RandomizedSVD;
pub use sketch::{sketch_update, Sketch, SketchMode};
pub use strategy::{OrderReduction, Strategy};
pub use types::{ReductionError, RelDiff, Result, ScalarType};
