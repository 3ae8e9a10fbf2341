//! Streaming reduction of a travelling wave.
//!
//! A toy host solver produces one snapshot of two superposed travelling waves
//! per time step. Each strategy keeps the most recent snapshots and refreshes
//! its basis after every step. At the end we compare the projection error of
//! every strategy with the optimal error from the singular values.

use ndarray::Array1;
use ndarray_linalg::{Norm, SVD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rusty_reduction::*;
use std::f64::consts::PI;

fn snapshot(grid: &Array1<f64>, time: f64) -> Array1<f64> {
    grid.mapv(|x| (2.0 * PI * (x - time)).sin() + 0.5 * (6.0 * PI * (x - 0.3 * time)).cos())
}

pub fn main() {
    // Snapshot length, history window and target rank.
    let dim = 400;
    let window = 30;
    let rank = 4;

    // Two travelling waves span a four dimensional space.
    let config = ReductionConfig::new(dim, window, rank)
        .oversampling(4)
        .resync_freq(25);

    let grid = Array1::linspace(0.0, 1.0, dim);
    let time_step = 1E-2;
    let steps = 200;

    let kinds = [
        StrategyKind::POD,
        StrategyKind::RandomizedQR,
        StrategyKind::RandomizedSVD,
        StrategyKind::Nystrom,
    ];

    for &kind in kinds.iter() {
        let mut strategy = Strategy::<f64, _>::new(kind, &config, StdRng::seed_from_u64(0))
            .expect("Could not construct the strategy.");

        // The host loop: append the newest snapshot, then refresh the basis.
        for step in 0..steps {
            let time = step as f64 * time_step;
            strategy
                .push_snapshot(snapshot(&grid, time).view())
                .expect("Snapshot has the wrong length.");
            strategy
                .order_reduction()
                .expect("Could not compute the reduced basis.");
        }

        let solutions = strategy.get_solutions();
        let (_, sigma, _) = solutions.svd(false, false).unwrap();
        let optimal = truncation_error(sigma.view(), rank);

        // The Nystrom basis is not orthonormal, so we measure its reconstruction instead.
        let error = match &strategy {
            Strategy::Nystrom(nystrom) => {
                let diff = &solutions - &nystrom.reconstruct();
                diff.norm_l2()
            }
            _ => projection_residual(strategy.get_basis(), solutions).unwrap(),
        };

        println!(
            "{:?}: error {:1.2E}, optimal {:1.2E}",
            kind, error, optimal
        );
    }
}
