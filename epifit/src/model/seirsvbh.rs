use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::math::ode::{dopri45_advance, DopriWorkspace, OdeOptions};
use crate::model::data::{Compartment, Series};

pub const STATE_SIZE: usize = 11;

/// Per-day parameter arrays, entry d held constant over day d.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayParameters {
    // Known
    pub birth: Vec<f64>, // Λ
    pub theta: Vec<f64>,
    pub omega: Vec<f64>,
    pub lambda: Vec<f64>,
    pub nu: Vec<f64>,
    pub mu: Vec<f64>,
    pub phi: Vec<f64>,

    // Reconstructed
    pub alpha: Vec<f64>, // vaccination
    pub beta: Vec<f64>,  // transmission
    pub gamma: Vec<f64>, // recovery outside hospital
    pub rho: Vec<f64>,   // hospital admission
    pub sigma: Vec<f64>, // hospital recovery
    pub tau: Vec<f64>,   // hospital mortality
}

/// Parameters of a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayRates {
    pub birth: f64,
    pub theta: f64,
    pub omega: f64,
    pub lambda: f64,
    pub nu: f64,
    pub mu: f64,
    pub phi: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub rho: f64,
    pub sigma: f64,
    pub tau: f64,
}

impl DayParameters {
    /// Number of simulated days (length of β).
    pub fn days(&self) -> usize {
        self.beta.len()
    }

    fn named(&self) -> [(&'static str, &Vec<f64>); 13] {
        [
            ("birth", &self.birth),
            ("theta", &self.theta),
            ("omega", &self.omega),
            ("lambda", &self.lambda),
            ("nu", &self.nu),
            ("mu", &self.mu),
            ("phi", &self.phi),
            ("alpha", &self.alpha),
            ("beta", &self.beta),
            ("gamma", &self.gamma),
            ("rho", &self.rho),
            ("sigma", &self.sigma),
            ("tau", &self.tau),
        ]
    }

    pub fn check(&self) -> Result<()> {
        let k = self.days();
        for (name, v) in self.named() {
            if v.len() < k {
                return Err(FitError::length_mismatch("day parameters", name, v.len(), "beta", k));
            }
        }
        Ok(())
    }

    pub fn at(&self, d: usize) -> DayRates {
        DayRates {
            birth: self.birth[d],
            theta: self.theta[d],
            omega: self.omega[d],
            lambda: self.lambda[d],
            nu: self.nu[d],
            mu: self.mu[d],
            phi: self.phi[d],
            alpha: self.alpha[d],
            beta: self.beta[d],
            gamma: self.gamma[d],
            rho: self.rho[d],
            sigma: self.sigma[d],
            tau: self.tau[d],
        }
    }
}

/// Right-hand side of the SEIRSVBH system with one day's rates.
pub fn deriv(p: &DayRates, y: &[f64], dy: &mut [f64]) {
    let (s, e, i, r, v, b, h) = (y[0], y[1], y[2], y[3], y[4], y[5], y[6]);
    let n = s + e + i + r + v + b + h;
    let force = p.beta * i / n;

    dy[0] = -(p.alpha + p.theta + force) * s + p.birth * n + p.lambda * r + p.nu * b;
    dy[1] = -(p.omega + p.theta) * e + force * (s + v);
    dy[2] = -(p.gamma + p.rho + p.theta) * i + p.omega * e;
    dy[3] = -(p.lambda + p.theta) * r + p.gamma * i + p.sigma * h;
    dy[4] = -(p.mu + p.theta + force) * v + p.alpha * s;
    dy[5] = -(p.nu + p.theta) * b + p.mu * v;
    dy[6] = -(p.sigma + p.theta + p.tau) * h + p.rho * i;
    dy[7] = p.gamma * i + p.sigma * h;
    dy[8] = p.rho * i;
    dy[9] = if p.phi == 0.0 { 0.0 } else { p.alpha / p.phi * n };
    dy[10] = p.tau * h;
}

/// Day-end trajectory of the SEIRSVBH model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSolution {
    /// 0, h, 2h, ..., Kh
    pub t: Vec<f64>,
    /// One row per entry of `t`, columns in [`Compartment`] order.
    pub y: Vec<[f64; STATE_SIZE]>,
}

impl ModelSolution {
    pub fn column(&self, c: Compartment) -> Vec<f64> {
        self.y.iter().map(|row| row[c.index()]).collect()
    }

    /// A = E + I + H
    pub fn active(&self) -> Vec<f64> {
        self.y.iter().map(|row| row[1] + row[2] + row[6]).collect()
    }

    pub fn series(&self, s: Series) -> Vec<f64> {
        match s {
            Series::Active => self.active(),
            Series::Hospitalized => self.column(Compartment::H),
            Series::RTotal => self.column(Compartment::RTotal),
            Series::HTotal => self.column(Compartment::HTotal),
            Series::VTotal => self.column(Compartment::VTotal),
            Series::DTotal => self.column(Compartment::DTotal),
            Series::Removed => self
                .y
                .iter()
                .map(|row| row[Compartment::RTotal.index()] + row[Compartment::DTotal.index()])
                .collect(),
        }
    }

    pub fn population(&self) -> Vec<f64> {
        self.y.iter().map(|row| row[..7].iter().sum()).collect()
    }
}

/// Integrate day by day with piecewise-constant parameters.
///
/// Numerical blow-up is not caught here; negative or non-finite states are
/// visible in the returned solution.
pub fn integrate_seirsvbh(
    params: &DayParameters,
    y0: [f64; STATE_SIZE],
    h: f64,
    opts: &OdeOptions,
) -> Result<ModelSolution> {
    params.check()?;
    if !(h > 0.0 && h.is_finite()) {
        return Err(FitError::InvalidParameter { name: "h", value: h, reason: "step must be finite and > 0" });
    }
    let k = params.days();
    let mut t = Vec::with_capacity(k + 1);
    let mut out = Vec::with_capacity(k + 1);
    t.push(0.0);
    out.push(y0);

    let mut y = y0;
    let mut ws = DopriWorkspace::new(STATE_SIZE);
    for d in 0..k {
        let rates = params.at(d);
        let (t0, t1) = (d as f64 * h, (d + 1) as f64 * h);
        dopri45_advance(&mut y, t0, t1, opts, &mut ws, |_, yy, dy| deriv(&rates, yy, dy))
            .map_err(|message| FitError::Integration { day: d + 1, message })?;
        t.push(t1);
        out.push(y);
    }
    log::debug!("integrated {} days of SEIRSVBH dynamics", k);
    Ok(ModelSolution { t, y: out })
}
