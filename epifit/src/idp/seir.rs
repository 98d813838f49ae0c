use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::{FitError, Result};
use crate::model::data::ReportedData;

const CONTEXT: &str = "idp-seir";

/// Reconstruction for the plain SEIR model.
#[derive(Debug, Clone, Serialize)]
pub struct SeirIdpSolution {
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
    /// ω passed through, truncated to the same length as β
    pub omega: Vec<f64>,
    pub s: Vec<f64>,
    pub e: Vec<f64>,
    pub i: Vec<f64>,
    pub r: Vec<f64>,
    pub n: f64,
    pub diagnostics: Diagnostics,
}

/// Solve the SEIR inverse problem with N = N1 and R = Rtotal + Dtotal.
///
/// S is computed directly as N − A − R at every day, I by forward recursion.
pub fn solve_idp_seir(data: &ReportedData) -> Result<SeirIdpSolution> {
    let a = &data.active;
    let r: Vec<f64> = data.r_total.iter().zip(&data.d_total).map(|(x, y)| x + y).collect();
    if data.r_total.len() != data.d_total.len() {
        return Err(FitError::length_mismatch("SEIR IDP", "Rtotal", data.r_total.len(), "Dtotal", data.d_total.len()));
    }
    if a.len() != r.len() {
        return Err(FitError::length_mismatch("SEIR IDP", "A", a.len(), "R", r.len()));
    }
    let m = a.len();
    if m < 2 {
        return Err(FitError::TooShort { context: "SEIR IDP".into(), required: 2, got: m });
    }
    if data.omega.len() < m - 1 {
        return Err(FitError::length_mismatch("SEIR IDP", "omega", data.omega.len(), "A", m));
    }

    let mut diag = Diagnostics::new();
    let n = data.initial.n1;
    let s: Vec<f64> = a.iter().zip(&r).map(|(ak, rk)| n - ak - rk).collect();

    let mut i = vec![0.0; m];
    let mut e = vec![0.0; m];
    i[0] = data.initial.i1;
    e[0] = a[0] - i[0];

    let mut i_beta = vec![0.0; m - 1];
    let mut i_gamma = vec![0.0; m - 1];
    for k in 1..m {
        let j = k - 1;
        let w = data.omega[j];
        i_beta[j] = -n * (s[k] - s[j]) / s[j];
        i_gamma[j] = r[k] - r[j];
        i[k] = (1.0 - w) * i[j] + w * a[j] - i_gamma[j];
        e[k] = a[k] - i[k];
        diag.check_value(CONTEXT, "I", k + 1, i[k]);
        diag.check_value(CONTEXT, "E", k + 1, e[k]);
    }

    let mut beta = vec![0.0; m - 1];
    let mut gamma = vec![0.0; m - 1];
    for j in 0..m - 1 {
        if i[j] == 0.0 {
            diag.warn(CONTEXT, format!("I is zero at day {}, beta and gamma set to NaN", j + 1));
            beta[j] = f64::NAN;
            gamma[j] = f64::NAN;
        } else {
            beta[j] = i_beta[j] / i[j];
            gamma[j] = i_gamma[j] / i[j];
            diag.check_value(CONTEXT, "beta", j + 1, beta[j]);
            diag.check_value(CONTEXT, "gamma", j + 1, gamma[j]);
        }
    }

    Ok(SeirIdpSolution {
        beta,
        gamma,
        omega: data.omega[..m - 1].to_vec(),
        s,
        e,
        i,
        r,
        n,
        diagnostics: diag,
    })
}
