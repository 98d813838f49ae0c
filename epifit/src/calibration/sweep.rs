//! (ξ, c) grid sweep over a cell evaluator.
//!
//! The outer dimension selected by [`Orientation`] is split into lines (rows or
//! columns). A [`LineExecutor`] evaluates whole lines, so each worker owns a
//! disjoint slice of the output and nothing is shared while the grid fills.
//! If the executor itself fails, the sweep is rerun serially.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calibration::evaluate::{CellEvaluator, RelativeErrors};
use crate::error::{FitError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// One task per ξ value.
    Rows,
    /// One task per c value.
    Columns,
    /// Whichever dimension is longer (ties go to rows).
    #[default]
    Auto,
}

impl Orientation {
    pub fn resolve(self, n_xi: usize, n_c: usize) -> Orientation {
        match self {
            Orientation::Auto if n_c > n_xi => Orientation::Columns,
            Orientation::Auto => Orientation::Rows,
            other => other,
        }
    }
}

/// Two error matrices indexed by ξ (rows) and c (columns). NaN marks failed cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorGrid {
    pub xi: Vec<f64>,
    pub c: Vec<f64>,
    pub l2: Vec<Vec<f64>>,
    pub linf: Vec<Vec<f64>>,
}

impl ErrorGrid {
    pub fn rows(&self) -> usize {
        self.xi.len()
    }

    pub fn cols(&self) -> usize {
        self.c.len()
    }
}

#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub grid: ErrorGrid,
    pub used_parallel: bool,
    pub workers_used: usize,
}

/// Failure of the execution backend itself (not of a single cell).
#[derive(Error, Debug, Clone)]
#[error("executor failed: {0}")]
pub struct ExecutorError(pub String);

/// One line of results: (l2, linf) per cell along the line.
pub type Line = Vec<(f64, f64)>;

/// Task-execution strategy for the sweep.
pub trait LineExecutor {
    /// Evaluate `lines` independent lines, returned in index order.
    fn run(&self, lines: usize, line: &(dyn Fn(usize) -> Line + Sync)) -> std::result::Result<Vec<Line>, ExecutorError>;

    /// Workers this executor runs with; 0 for serial execution.
    fn workers(&self) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl LineExecutor for SerialExecutor {
    fn run(&self, lines: usize, line: &(dyn Fn(usize) -> Line + Sync)) -> std::result::Result<Vec<Line>, ExecutorError> {
        Ok((0..lines).map(line).collect())
    }

    fn workers(&self) -> usize {
        0
    }
}

/// Rayon thread pool with a bounded worker count.
#[derive(Debug, Clone, Copy)]
pub struct RayonExecutor {
    workers: usize,
}

impl RayonExecutor {
    /// Requests above the hardware concurrency are capped silently.
    pub fn new(requested: usize) -> Self {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self { workers: requested.clamp(1, cores) }
    }
}

impl LineExecutor for RayonExecutor {
    fn run(&self, lines: usize, line: &(dyn Fn(usize) -> Line + Sync)) -> std::result::Result<Vec<Line>, ExecutorError> {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| ExecutorError(e.to_string()))?;
        panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| (0..lines).into_par_iter().map(line).collect::<Vec<Line>>())
        }))
        .map_err(|_| ExecutorError("worker panicked".into()))
    }

    fn workers(&self) -> usize {
        self.workers
    }
}

/// Evaluate one cell, turning errors and panics into NaN.
fn isolated_cell<E: CellEvaluator + ?Sized>(evaluator: &E, xi: f64, c: f64) -> (f64, f64) {
    match panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate_cell(xi, c))) {
        Ok(Ok(RelativeErrors { l2, linf })) => (l2, linf),
        Ok(Err(e)) => {
            log::warn!("sweep cell xi={} c={} failed: {}", xi, c, e);
            (f64::NAN, f64::NAN)
        }
        Err(_) => {
            log::warn!("sweep cell xi={} c={} panicked", xi, c);
            (f64::NAN, f64::NAN)
        }
    }
}

fn assemble(xi: &[f64], c: &[f64], orientation: Orientation, lines: Vec<Line>) -> ErrorGrid {
    let mut l2 = vec![vec![f64::NAN; c.len()]; xi.len()];
    let mut linf = vec![vec![f64::NAN; c.len()]; xi.len()];
    for (a, line) in lines.into_iter().enumerate() {
        for (b, (e2, einf)) in line.into_iter().enumerate() {
            let (row, col) = match orientation {
                Orientation::Columns => (b, a),
                _ => (a, b),
            };
            l2[row][col] = e2;
            linf[row][col] = einf;
        }
    }
    ErrorGrid { xi: xi.to_vec(), c: c.to_vec(), l2, linf }
}

/// Evaluate every (ξ, c) pair of the Cartesian grid.
pub fn sweep<E, X>(
    xi: &[f64],
    c: &[f64],
    evaluator: &E,
    executor: &X,
    orientation: Orientation,
) -> Result<SweepOutcome>
where
    E: CellEvaluator + ?Sized,
    X: LineExecutor + ?Sized,
{
    if xi.is_empty() || c.is_empty() {
        return Err(FitError::InvalidGrid(format!(
            "empty axis (xi: {}, c: {})",
            xi.len(),
            c.len()
        )));
    }
    let orientation = orientation.resolve(xi.len(), c.len());
    let (outer, inner) = match orientation {
        Orientation::Columns => (c.len(), xi.len()),
        _ => (xi.len(), c.len()),
    };
    let line = |a: usize| -> Line {
        (0..inner)
            .map(|b| match orientation {
                Orientation::Columns => isolated_cell(evaluator, xi[b], c[a]),
                _ => isolated_cell(evaluator, xi[a], c[b]),
            })
            .collect()
    };

    log::info!(
        "sweeping {} x {} grid ({:?}, {} workers)",
        xi.len(),
        c.len(),
        orientation,
        executor.workers()
    );
    match executor.run(outer, &line) {
        Ok(lines) => Ok(SweepOutcome {
            grid: assemble(xi, c, orientation, lines),
            used_parallel: executor.workers() > 0,
            workers_used: executor.workers(),
        }),
        Err(e) => {
            log::warn!("{}; falling back to serial sweep", e);
            let lines = SerialExecutor.run(outer, &line).unwrap_or_default();
            Ok(SweepOutcome {
                grid: assemble(xi, c, orientation, lines),
                used_parallel: false,
                workers_used: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_longer_dimension() {
        assert_eq!(Orientation::Auto.resolve(3, 10), Orientation::Columns);
        assert_eq!(Orientation::Auto.resolve(10, 3), Orientation::Rows);
        assert_eq!(Orientation::Auto.resolve(4, 4), Orientation::Rows);
        assert_eq!(Orientation::Columns.resolve(10, 3), Orientation::Columns);
    }

    #[test]
    fn rayon_executor_caps_workers() {
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(RayonExecutor::new(10_000).workers(), cores);
        assert_eq!(RayonExecutor::new(0).workers(), 1);
    }

    #[test]
    fn empty_axis_is_rejected() {
        let eval = |_: f64, _: f64| -> Result<RelativeErrors> { Ok(RelativeErrors { l2: 0.0, linf: 0.0 }) };
        assert!(matches!(
            sweep(&[], &[0.0], &eval, &SerialExecutor, Orientation::Rows),
            Err(FitError::InvalidGrid(_))
        ));
    }
}
