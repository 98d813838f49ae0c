mod common;

use epifit::calibration::sweep::{ExecutorError, Line};
use epifit::calibration::{
    sweep, ErrorGrid, LineExecutor, Orientation, RayonExecutor, RelativeErrors, SeirsvbhEvaluator, SerialExecutor,
};
use epifit::error::Result;
use epifit::math::ode::OdeOptions;
use epifit::{FitError, QuadraticPsi};

/// Deterministic surface with a few failing cells.
fn surface(xi: f64, c: f64) -> Result<RelativeErrors> {
    if xi == 0.5 && c == 0.1 {
        return Err(FitError::InvalidGrid("synthetic failure".into()));
    }
    if xi == 1.0 && c == -0.1 {
        panic!("synthetic panic");
    }
    let l2 = (xi - 0.25).powi(2) + (c - 0.05).powi(2);
    Ok(RelativeErrors { l2, linf: 2.0 * l2 + c.abs() })
}

fn axes() -> (Vec<f64>, Vec<f64>) {
    (vec![0.0, 0.25, 0.5, 0.75, 1.0], vec![-0.1, 0.0, 0.1])
}

fn same_cells(a: &ErrorGrid, b: &ErrorGrid) {
    assert_eq!(a.xi, b.xi);
    assert_eq!(a.c, b.c);
    for (ma, mb) in [(&a.l2, &b.l2), (&a.linf, &b.linf)] {
        for (ra, rb) in ma.iter().zip(mb) {
            for (x, y) in ra.iter().zip(rb) {
                assert!(x == y || (x.is_nan() && y.is_nan()), "{} != {}", x, y);
            }
        }
    }
}

#[test]
fn serial_and_parallel_sweeps_agree() {
    let (xi, c) = axes();
    let serial = sweep(&xi, &c, &surface, &SerialExecutor, Orientation::Rows).expect("serial");
    assert!(!serial.used_parallel);
    assert_eq!(serial.workers_used, 0);

    for orientation in [Orientation::Rows, Orientation::Columns, Orientation::Auto] {
        let par = sweep(&xi, &c, &surface, &RayonExecutor::new(4), orientation).expect("parallel");
        assert!(par.used_parallel);
        assert!(par.workers_used >= 1);
        same_cells(&serial.grid, &par.grid);
    }
}

#[test]
fn failing_cells_become_nan() {
    let (xi, c) = axes();
    let out = sweep(&xi, &c, &surface, &RayonExecutor::new(2), Orientation::Columns).expect("sweep");
    let g = &out.grid;
    assert_eq!((g.rows(), g.cols()), (5, 3));
    assert!(g.l2[2][2].is_nan() && g.linf[2][2].is_nan());
    assert!(g.l2[4][0].is_nan() && g.linf[4][0].is_nan());
    assert_eq!(g.l2[1][1], (0.05f64).powi(2));
}

struct BrokenExecutor;

impl LineExecutor for BrokenExecutor {
    fn run(&self, _lines: usize, _line: &(dyn Fn(usize) -> Line + Sync)) -> std::result::Result<Vec<Line>, ExecutorError> {
        Err(ExecutorError("pool unavailable".into()))
    }

    fn workers(&self) -> usize {
        8
    }
}

#[test]
fn broken_executor_falls_back_to_serial() {
    let (xi, c) = axes();
    let out = sweep(&xi, &c, &surface, &BrokenExecutor, Orientation::Rows).expect("sweep");
    assert!(!out.used_parallel);
    assert_eq!(out.workers_used, 0);
    let serial = sweep(&xi, &c, &surface, &SerialExecutor, Orientation::Rows).expect("serial");
    same_cells(&serial.grid, &out.grid);
}

#[test]
fn sweep_over_synthetic_data() {
    let data = common::synthetic_data(12);
    let evaluator = SeirsvbhEvaluator { data: &data, h: 1.0, psi: &QuadraticPsi, opts: OdeOptions::default() };
    let xi = [0.0, 0.5, 1.0];
    let c = [-0.1, 0.0, 0.1];
    let serial = sweep(&xi, &c, &evaluator, &SerialExecutor, Orientation::Auto).expect("serial");
    let par = sweep(&xi, &c, &evaluator, &RayonExecutor::new(3), Orientation::Columns).expect("parallel");
    same_cells(&serial.grid, &par.grid);
    assert!(serial.grid.l2.iter().flatten().all(|v| *v >= 0.0));
}
