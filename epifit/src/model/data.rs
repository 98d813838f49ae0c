use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};

/// Initial compartment sizes on day 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub n1: f64, // initial population
    pub i1: f64,
    pub r1: f64,
    pub v1: f64,
    pub b1: f64,
}

/// Reported daily series plus known parameter series.
///
/// Loaded once per run and treated as read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedData {
    // Known parameters (per day, length L or L-1)
    pub birth: Vec<f64>,  // Λ, births / replenishment
    pub theta: Vec<f64>,  // natural death rate
    pub omega: Vec<f64>,  // incubation rate E -> I
    pub lambda: Vec<f64>, // waning R -> S
    pub nu: Vec<f64>,     // waning B -> S
    pub mu: Vec<f64>,     // V -> B transition
    pub phi: Vec<f64>,    // vaccination-reporting split factor

    // Observed (length L)
    pub active: Vec<f64>, // E + I + H
    pub hospitalized: Vec<f64>,
    pub r_total: Vec<f64>,
    pub h_total: Vec<f64>,
    pub v_total: Vec<f64>,
    pub d_total: Vec<f64>,

    pub initial: InitialConditions,
}

/// Reported/modeled series addressable by the evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Series {
    Active,
    Hospitalized,
    RTotal,
    HTotal,
    VTotal,
    DTotal,
    /// RTotal + DTotal, the removed compartment of the plain SEIR model.
    Removed,
}

impl Series {
    /// Series compared by the full SEIRSVBH evaluator.
    pub const TRACKED: [Series; 6] = [
        Series::Active,
        Series::Hospitalized,
        Series::RTotal,
        Series::VTotal,
        Series::HTotal,
        Series::DTotal,
    ];

    /// Series compared by the SEIR evaluator.
    pub const SEIR_TRACKED: [Series; 2] = [Series::Active, Series::Removed];

    pub fn name(self) -> &'static str {
        match self {
            Series::Active => "A",
            Series::Hospitalized => "H",
            Series::RTotal => "Rtotal",
            Series::HTotal => "Htotal",
            Series::VTotal => "Vtotal",
            Series::DTotal => "Dtotal",
            Series::Removed => "R",
        }
    }
}

/// State columns of the SEIRSVBH model, in integrator order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compartment {
    S,
    E,
    I,
    R,
    V,
    B,
    H,
    RTotal,
    HTotal,
    VTotal,
    DTotal,
}

impl Compartment {
    pub const ALL: [Compartment; 11] = [
        Compartment::S,
        Compartment::E,
        Compartment::I,
        Compartment::R,
        Compartment::V,
        Compartment::B,
        Compartment::H,
        Compartment::RTotal,
        Compartment::HTotal,
        Compartment::VTotal,
        Compartment::DTotal,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Compartment::S => "S",
            Compartment::E => "E",
            Compartment::I => "I",
            Compartment::R => "R",
            Compartment::V => "V",
            Compartment::B => "B",
            Compartment::H => "H",
            Compartment::RTotal => "Rtotal",
            Compartment::HTotal => "Htotal",
            Compartment::VTotal => "Vtotal",
            Compartment::DTotal => "Dtotal",
        }
    }
}

impl ReportedData {
    pub fn series(&self, s: Series) -> Cow<'_, [f64]> {
        match s {
            Series::Active => Cow::Borrowed(&self.active),
            Series::Hospitalized => Cow::Borrowed(&self.hospitalized),
            Series::RTotal => Cow::Borrowed(&self.r_total),
            Series::HTotal => Cow::Borrowed(&self.h_total),
            Series::VTotal => Cow::Borrowed(&self.v_total),
            Series::DTotal => Cow::Borrowed(&self.d_total),
            Series::Removed => Cow::Owned(
                self.r_total
                    .iter()
                    .zip(&self.d_total)
                    .map(|(r, d)| r + d)
                    .collect(),
            ),
        }
    }

    fn observed(&self) -> [&Vec<f64>; 6] {
        [
            &self.active,
            &self.hospitalized,
            &self.r_total,
            &self.h_total,
            &self.v_total,
            &self.d_total,
        ]
    }

    fn parameters(&self) -> [&Vec<f64>; 7] {
        [
            &self.birth,
            &self.theta,
            &self.omega,
            &self.lambda,
            &self.nu,
            &self.mu,
            &self.phi,
        ]
    }

    /// Common alignment length m over observed series and parameter series
    /// (parameters need m-1 entries).
    pub fn alignment_len(&self) -> usize {
        let obs = self.observed().iter().map(|v| v.len()).min().unwrap_or(0);
        let par = self.parameters().iter().map(|v| v.len()).min().unwrap_or(0);
        obs.min(par + 1)
    }

    /// Copy truncated to the common alignment length.
    ///
    /// Observed series get m entries, parameter series m-1. Fails only when m = 0.
    pub fn aligned(&self) -> Result<ReportedData> {
        let m = self.alignment_len();
        if m == 0 {
            return Err(FitError::empty_alignment("reported data"));
        }
        let obs = |v: &Vec<f64>| v[..m].to_vec();
        let par = |v: &Vec<f64>| v[..m - 1].to_vec();
        Ok(ReportedData {
            birth: par(&self.birth),
            theta: par(&self.theta),
            omega: par(&self.omega),
            lambda: par(&self.lambda),
            nu: par(&self.nu),
            mu: par(&self.mu),
            phi: par(&self.phi),
            active: obs(&self.active),
            hospitalized: obs(&self.hospitalized),
            r_total: obs(&self.r_total),
            h_total: obs(&self.h_total),
            v_total: obs(&self.v_total),
            d_total: obs(&self.d_total),
            initial: self.initial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportedData {
        ReportedData {
            birth: vec![0.0; 4],
            theta: vec![0.0; 3],
            omega: vec![0.2; 4],
            lambda: vec![0.0; 4],
            nu: vec![0.0; 4],
            mu: vec![0.0; 4],
            phi: vec![1.0; 4],
            active: vec![10.0, 12.0, 14.0, 16.0],
            hospitalized: vec![0.0; 4],
            r_total: vec![0.0; 5],
            h_total: vec![0.0; 4],
            v_total: vec![0.0; 4],
            d_total: vec![0.0; 4],
            initial: InitialConditions { n1: 1000.0, i1: 10.0, ..Default::default() },
        }
    }

    #[test]
    fn aligned_truncates_to_shortest() {
        let d = sample();
        assert_eq!(d.alignment_len(), 4);
        let a = d.aligned().unwrap();
        assert_eq!(a.r_total.len(), 4);
        assert_eq!(a.omega.len(), 3);

        let mut short = sample();
        short.active.truncate(2);
        let a = short.aligned().unwrap();
        assert_eq!(a.hospitalized.len(), 2);
        assert_eq!(a.theta.len(), 1);
    }

    #[test]
    fn aligned_rejects_empty() {
        let mut d = sample();
        d.h_total.clear();
        assert!(matches!(d.aligned(), Err(FitError::EmptyAlignment { .. })));
    }

    #[test]
    fn removed_series_sums_totals() {
        let mut d = sample();
        d.r_total = vec![1.0, 2.0];
        d.d_total = vec![0.5, 0.5, 9.0];
        assert_eq!(d.series(Series::Removed).as_ref(), &[1.5, 2.5]);
        assert_eq!(Compartment::DTotal.index(), 10);
    }
}
