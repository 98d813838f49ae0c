use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::{FitError, Result};
use crate::math::psi::PsiFunction;
use crate::model::data::ReportedData;
use crate::model::seirsvbh::DayParameters;

const CONTEXT: &str = "idp";

/// Reconstructed SEIRSVBH parameters and states.
#[derive(Debug, Clone, Serialize)]
pub struct IdpSolution {
    // Length m-1, entry k-1 describes the interval [k-1, k]
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
    pub rho: Vec<f64>,
    pub sigma: Vec<f64>,
    pub tau: Vec<f64>,

    // Length m
    pub s: Vec<f64>,
    pub e: Vec<f64>,
    pub i: Vec<f64>,
    pub r: Vec<f64>,
    pub v: Vec<f64>,
    pub b: Vec<f64>,
    pub n: Vec<f64>,

    pub psi_h: f64,
    pub diagnostics: Diagnostics,
}

impl IdpSolution {
    /// Merge reconstructed rates with the known series of `data` (already aligned).
    pub fn day_parameters(&self, data: &ReportedData) -> DayParameters {
        let k = self.beta.len();
        let take = |v: &Vec<f64>| v.iter().copied().take(k).collect::<Vec<f64>>();
        DayParameters {
            birth: take(&data.birth),
            theta: take(&data.theta),
            omega: take(&data.omega),
            lambda: take(&data.lambda),
            nu: take(&data.nu),
            mu: take(&data.mu),
            phi: take(&data.phi),
            alpha: self.alpha.clone(),
            beta: self.beta.clone(),
            gamma: self.gamma.clone(),
            rho: self.rho.clone(),
            sigma: self.sigma.clone(),
            tau: self.tau.clone(),
        }
    }
}

pub(crate) fn check_numerics(xi: f64, h: f64, c: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&xi) {
        return Err(FitError::InvalidParameter { name: "xi", value: xi, reason: "must lie in [0, 1]" });
    }
    if !(h > 0.0 && h.is_finite()) {
        return Err(FitError::InvalidParameter { name: "h", value: h, reason: "must be finite and > 0" });
    }
    if !(c > -1.0 && c.is_finite()) {
        return Err(FitError::InvalidParameter { name: "c", value: c, reason: "must be finite and > -1" });
    }
    Ok(())
}

/// flow / size of the compartment it leaves.
///
/// No flow out of an empty compartment is a zero rate; any other zero
/// denominator propagates Inf/NaN.
fn rate(flow: f64, denom: f64, name: &str, day: usize, diag: &mut Diagnostics) -> f64 {
    if denom == 0.0 && flow == 0.0 {
        diag.info(CONTEXT, format!("{} set to 0 at day {}: no flow from an empty compartment", name, day));
        0.0
    } else {
        flow / denom
    }
}

/// Solve the inverse data problem for the full SEIRSVBH model.
///
/// Reported series are aligned first. Negative or non-finite reconstructions are
/// recorded as warnings and used as is. Divisions by S+V and N are not guarded;
/// see [`rate`] for the I and H denominators.
pub fn solve_idp(
    xi: f64,
    h: f64,
    c: f64,
    psi: &dyn PsiFunction,
    data: &ReportedData,
) -> Result<IdpSolution> {
    check_numerics(xi, h, c)?;
    let d = data.aligned()?;
    let m = d.active.len();
    if m < 2 {
        return Err(FitError::TooShort { context: "IDP solver".into(), required: 2, got: m });
    }

    let mut diag = Diagnostics::new();
    let ph = psi.psi(h, c);
    if !(ph > 0.0) {
        diag.warn(CONTEXT, format!("psi(h={}, c={}) = {} is not positive", h, c, ph));
    }

    // non-hospitalized active cases
    let g: Vec<f64> = d.active.iter().zip(&d.hospitalized).map(|(a, hh)| a - hh).collect();
    let hosp = &d.hospitalized;
    let init = d.initial;

    let mut s = vec![0.0; m];
    let mut e = vec![0.0; m];
    let mut i = vec![0.0; m];
    let mut r = vec![0.0; m];
    let mut v = vec![0.0; m];
    let mut b = vec![0.0; m];
    let mut n = vec![0.0; m];

    i[0] = init.i1;
    r[0] = init.r1;
    v[0] = init.v1;
    b[0] = init.b1;
    e[0] = g[0] - init.i1;
    s[0] = init.n1 - e[0] - i[0] - r[0] - v[0] - b[0] - hosp[0];
    n[0] = init.n1;
    diag.check_value(CONTEXT, "E", 1, e[0]);
    diag.check_value(CONTEXT, "S", 1, s[0]);

    let mut alpha = vec![0.0; m - 1];
    let mut beta_flow = vec![0.0; m - 1];
    let mut gamma_flow = vec![0.0; m - 1];
    let mut rho_flow = vec![0.0; m - 1];
    let mut sigma_flow = vec![0.0; m - 1];
    let mut tau_flow = vec![0.0; m - 1];

    for k in 1..m {
        let j = k - 1;
        let (theta, omega, lambda, nu, mu, phi, birth) =
            (d.theta[j], d.omega[j], d.lambda[j], d.nu[j], d.mu[j], d.phi[j], d.birth[j]);

        let tf = (d.d_total[k] - d.d_total[j]) / ph;
        let rf = (d.h_total[k] - d.h_total[j]) / ph;
        let sf = rf - (hosp[k] - hosp[j]) / ph - tf - theta * hosp[j];
        let gf = (d.r_total[k] - d.r_total[j]) / ph - sf;
        let a = phi * (d.v_total[k] - d.v_total[j]) / (ph * n[j]);
        let bf = n[j] * ((g[k] - g[j]) / ph + theta * g[j] + gf + rf) / (s[j] + v[j]);

        tau_flow[j] = tf;
        rho_flow[j] = rf;
        sigma_flow[j] = sf;
        gamma_flow[j] = gf;
        alpha[j] = a;
        beta_flow[j] = bf;

        let force = bf / n[j];
        r[k] = (1.0 - ph * (lambda + theta)) * r[j] + ph * (gf + sf);
        b[k] = (1.0 - ph * (nu + theta)) * b[j] + ph * mu * v[j];
        s[k] = (1.0 - ph * (a + theta + force)) * s[j] + ph * (birth * n[j] + lambda * r[j] + nu * b[j]);
        v[k] = (1.0 - ph * (mu + theta + force)) * v[j] + ph * a * s[j];
        i[k] = (1.0 - ph * theta) * i[j] + ph * (omega * e[j] - gf - rf);
        e[k] = g[k] - i[k];
        n[k] = s[k] + e[k] + i[k] + r[k] + v[k] + b[k] + hosp[k];

        let day = k + 1;
        for (name, value) in [("S", s[k]), ("E", e[k]), ("I", i[k]), ("R", r[k]), ("V", v[k]), ("B", b[k])] {
            diag.check_value(CONTEXT, name, day, value);
        }
    }

    let mut beta = vec![0.0; m - 1];
    let mut gamma = vec![0.0; m - 1];
    let mut rho = vec![0.0; m - 1];
    let mut sigma = vec![0.0; m - 1];
    let mut tau = vec![0.0; m - 1];
    for j in 0..m - 1 {
        let i_xi = xi * i[j] + (1.0 - xi) * i[j + 1];
        beta[j] = rate(beta_flow[j], i_xi, "beta", j + 1, &mut diag);
        gamma[j] = rate(gamma_flow[j], i_xi, "gamma", j + 1, &mut diag);
        rho[j] = rate(rho_flow[j], i_xi, "rho", j + 1, &mut diag);
        sigma[j] = rate(sigma_flow[j], hosp[j], "sigma", j + 1, &mut diag);
        tau[j] = rate(tau_flow[j], hosp[j], "tau", j + 1, &mut diag);
    }

    for (name, series) in [
        ("alpha", &alpha),
        ("beta", &beta),
        ("gamma", &gamma),
        ("rho", &rho),
        ("sigma", &sigma),
        ("tau", &tau),
    ] {
        for (j, &value) in series.iter().enumerate() {
            diag.check_value(CONTEXT, name, j + 1, value);
        }
    }

    Ok(IdpSolution {
        alpha,
        beta,
        gamma,
        rho,
        sigma,
        tau,
        s,
        e,
        i,
        r,
        v,
        b,
        n,
        psi_h: ph,
        diagnostics: diag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::psi::QuadraticPsi;
    use crate::model::data::InitialConditions;

    fn three_days() -> ReportedData {
        ReportedData {
            birth: vec![0.0; 2],
            theta: vec![0.0; 2],
            omega: vec![0.2; 2],
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
            initial: InitialConditions { n1: 1000.0, i1: 10.0, ..Default::default() },
        }
    }

    #[test]
    fn hand_computed_three_day_recursion() {
        let sol = solve_idp(0.5, 1.0, 0.0, &QuadraticPsi, &three_days()).unwrap();
        assert!((sol.s[1] - 985.0).abs() < 1e-9);
        assert_eq!(sol.i, vec![10.0, 10.0, 11.0]);
        assert_eq!(sol.e, vec![0.0, 5.0, 7.0]);
        assert!((sol.beta[0] - 5000.0 / 990.0 / 10.0).abs() < 1e-12);
        assert!((sol.beta[1] - 3000.0 / 985.0 / 10.5).abs() < 1e-12);
        assert_eq!(sol.gamma, vec![0.0, 0.0]);
    }

    #[test]
    fn empty_hospital_gives_zero_rates() {
        let sol = solve_idp(0.5, 1.0, 0.0, &QuadraticPsi, &three_days()).unwrap();
        assert_eq!(sol.sigma, vec![0.0, 0.0]);
        assert_eq!(sol.tau, vec![0.0, 0.0]);
        assert!(!sol.diagnostics.has_warnings());
    }

    #[test]
    fn deaths_from_empty_hospital_propagate_inf() {
        let mut d = three_days();
        d.d_total = vec![0.0, 1.0, 1.0];
        let sol = solve_idp(0.5, 1.0, 0.0, &QuadraticPsi, &d).unwrap();
        assert!(sol.tau[0].is_infinite());
        assert!(sol.diagnostics.warnings().any(|w| w.message.contains("tau")));
    }

    #[test]
    fn non_positive_psi_is_a_warning() {
        let sol = solve_idp(0.5, 1.0, 1.0, &QuadraticPsi, &three_days()).unwrap();
        assert_eq!(sol.psi_h, 0.0);
        assert!(sol
            .diagnostics
            .warnings()
            .any(|w| w.message == "psi(h=1, c=1) = 0 is not positive"));
    }

    #[test]
    fn rejects_out_of_range_xi() {
        let err = solve_idp(1.5, 1.0, 0.0, &QuadraticPsi, &three_days()).unwrap_err();
        assert!(matches!(err, FitError::InvalidParameter { name: "xi", .. }));
    }

    #[test]
    fn single_day_is_too_short() {
        let mut d = three_days();
        d.active.truncate(1);
        assert!(matches!(
            solve_idp(0.5, 1.0, 0.0, &QuadraticPsi, &d),
            Err(FitError::TooShort { got: 1, .. })
        ));
    }
}
