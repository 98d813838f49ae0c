use serde::Serialize;

use crate::error::{FitError, Result};
use crate::math::ode::{dopri45_advance, DopriWorkspace, OdeOptions};
use crate::model::data::Series;

/// Day-end trajectory of the plain SEIR model, rows are [S, E, I, R].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeirSolution {
    pub t: Vec<f64>,
    pub y: Vec<[f64; 4]>,
    pub n: f64,
}

impl SeirSolution {
    pub fn column(&self, idx: usize) -> Vec<f64> {
        self.y.iter().map(|row| row[idx]).collect()
    }

    /// A = E + I
    pub fn active(&self) -> Vec<f64> {
        self.y.iter().map(|row| row[1] + row[2]).collect()
    }

    /// Only `Active` and `Removed` exist in this model.
    pub fn series(&self, s: Series) -> Option<Vec<f64>> {
        match s {
            Series::Active => Some(self.active()),
            Series::Removed => Some(self.column(3)),
            Series::Hospitalized
            | Series::RTotal
            | Series::HTotal
            | Series::VTotal
            | Series::DTotal => None,
        }
    }
}

/// Integrate the SEIR system day by day; N is held constant for the whole run
/// (supplied, or the sum of `y0`).
pub fn integrate_seir(
    beta: &[f64],
    gamma: &[f64],
    omega: &[f64],
    y0: [f64; 4],
    n: Option<f64>,
    h: f64,
    opts: &OdeOptions,
) -> Result<SeirSolution> {
    if beta.len() != gamma.len() {
        return Err(FitError::length_mismatch("SEIR integrator", "beta", beta.len(), "gamma", gamma.len()));
    }
    if beta.len() != omega.len() {
        return Err(FitError::length_mismatch("SEIR integrator", "beta", beta.len(), "omega", omega.len()));
    }
    if !(h > 0.0 && h.is_finite()) {
        return Err(FitError::InvalidParameter { name: "h", value: h, reason: "step must be finite and > 0" });
    }
    let n = n.unwrap_or_else(|| y0.iter().sum());

    let k = beta.len();
    let mut t = Vec::with_capacity(k + 1);
    let mut out = Vec::with_capacity(k + 1);
    t.push(0.0);
    out.push(y0);

    let mut y = y0;
    let mut ws = DopriWorkspace::new(4);
    for d in 0..k {
        let (b, g, w) = (beta[d], gamma[d], omega[d]);
        let (t0, t1) = (d as f64 * h, (d + 1) as f64 * h);
        dopri45_advance(&mut y, t0, t1, opts, &mut ws, |_, y, dy| {
            let inf = b * y[0] * y[2] / n;
            dy[0] = -inf;
            dy[1] = inf - w * y[1];
            dy[2] = w * y[1] - g * y[2];
            dy[3] = g * y[2];
        })
        .map_err(|message| FitError::Integration { day: d + 1, message })?;
        t.push(t1);
        out.push(y);
    }
    Ok(SeirSolution { t, y: out, n })
}
