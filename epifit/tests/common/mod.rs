#![allow(dead_code)]

use epifit::math::ode::OdeOptions;
use epifit::model::data::Compartment;
use epifit::model::seirsvbh::{integrate_seirsvbh, DayParameters, ModelSolution};
use epifit::{InitialConditions, ReportedData};

/// Constant rates the synthetic data is generated with.
pub const BETA: f64 = 0.11;
pub const GAMMA: f64 = 0.1;
pub const RHO: f64 = 0.01;
pub const SIGMA: f64 = 0.05;
pub const TAU: f64 = 0.01;
pub const ALPHA: f64 = 0.001;
pub const OMEGA: f64 = 0.2;
pub const MU: f64 = 0.01;
pub const PHI: f64 = 0.5;

/// Demography and waning rates, all zero unless set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Background {
    pub birth: f64,
    pub theta: f64,
    pub lambda: f64,
    pub nu: f64,
}

pub fn true_parameters(days: usize) -> DayParameters {
    true_parameters_with(days, Background::default())
}

pub fn true_parameters_with(days: usize, bg: Background) -> DayParameters {
    let c = |v: f64| vec![v; days];
    DayParameters {
        birth: c(bg.birth),
        theta: c(bg.theta),
        omega: c(OMEGA),
        lambda: c(bg.lambda),
        nu: c(bg.nu),
        mu: c(MU),
        phi: c(PHI),
        alpha: c(ALPHA),
        beta: c(BETA),
        gamma: c(GAMMA),
        rho: c(RHO),
        sigma: c(SIGMA),
        tau: c(TAU),
    }
}

/// Near-endemic starting point: I and H close to their balance values.
pub fn initial_state() -> [f64; 11] {
    let i = 1000.0;
    let e = (GAMMA + RHO) * i / OMEGA;
    let h = RHO * i / (SIGMA + TAU);
    let n = 1.0e6;
    [n - e - i - h, e, i, 0.0, 0.0, 0.0, h, 0.0, 0.0, 0.0, 0.0]
}

pub fn forward(days: usize) -> ModelSolution {
    forward_with(days, Background::default())
}

pub fn forward_with(days: usize, bg: Background) -> ModelSolution {
    integrate_seirsvbh(&true_parameters_with(days, bg), initial_state(), 1.0, &OdeOptions::default())
        .expect("forward integration")
}

/// Reported data produced by the forward model with the rates above.
pub fn synthetic_data(days: usize) -> ReportedData {
    synthetic_data_with(days, Background::default())
}

pub fn synthetic_data_with(days: usize, bg: Background) -> ReportedData {
    let sol = forward_with(days, bg);
    let p = true_parameters_with(days, bg);
    let y0 = initial_state();
    ReportedData {
        birth: p.birth,
        theta: p.theta,
        omega: p.omega,
        lambda: p.lambda,
        nu: p.nu,
        mu: p.mu,
        phi: p.phi,
        active: sol.active(),
        hospitalized: sol.column(Compartment::H),
        r_total: sol.column(Compartment::RTotal),
        h_total: sol.column(Compartment::HTotal),
        v_total: sol.column(Compartment::VTotal),
        d_total: sol.column(Compartment::DTotal),
        initial: InitialConditions {
            n1: y0[..7].iter().sum(),
            i1: y0[2],
            r1: y0[3],
            v1: y0[4],
            b1: y0[5],
        },
    }
}

/// The three-day scenario with no hospital, vaccination or demography.
pub fn three_day_data() -> ReportedData {
    ReportedData {
        birth: vec![0.0; 2],
        theta: vec![0.0; 2],
        omega: vec![0.2, 0.2],
        lambda: vec![0.0; 2],
        nu: vec![0.0; 2],
        mu: vec![0.0; 2],
        phi: vec![0.0; 2],
        active: vec![10.0, 15.0, 18.0],
        hospitalized: vec![0.0; 3],
        r_total: vec![0.0; 3],
        h_total: vec![0.0; 3],
        v_total: vec![0.0; 3],
        d_total: vec![0.0; 3],
        initial: InitialConditions { n1: 1000.0, i1: 10.0, r1: 0.0, v1: 0.0, b1: 0.0 },
    }
}

pub fn assert_rel(actual: f64, expected: f64, tol: f64, what: &str) {
    let rel = ((actual - expected) / expected).abs();
    assert!(rel < tol, "{}: got {}, expected {} (rel err {:.3e})", what, actual, expected, rel);
}
