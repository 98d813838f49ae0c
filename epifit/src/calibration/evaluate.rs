use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::{FitError, Result};
use crate::idp::seir::{solve_idp_seir, SeirIdpSolution};
use crate::idp::seirsvbh::{solve_idp, IdpSolution};
use crate::math::norms::relative_errors;
use crate::math::ode::OdeOptions;
use crate::math::psi::PsiFunction;
use crate::model::data::{ReportedData, Series};
use crate::model::seir::{integrate_seir, SeirSolution};
use crate::model::seirsvbh::{integrate_seirsvbh, ModelSolution, STATE_SIZE};

/// Aggregate relative errors, summed over the tracked series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelativeErrors {
    pub l2: f64,
    pub linf: f64,
}

/// Everything produced by one SEIRSVBH evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub xi: f64,
    pub c: f64,
    pub idp: IdpSolution,
    pub model: ModelSolution,
    pub errors: RelativeErrors,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeirFitReport {
    pub idp: SeirIdpSolution,
    pub model: SeirSolution,
    pub errors: RelativeErrors,
    pub diagnostics: Diagnostics,
}

/// Initial 11-state vector derived from day 1 of aligned reported data.
pub fn initial_state(data: &ReportedData, diag: &mut Diagnostics) -> [f64; STATE_SIZE] {
    let init = data.initial;
    let h1 = data.hospitalized[0];
    let e1 = data.active[0] - init.i1 - h1;
    if e1 < 0.0 {
        diag.warn("evaluate", format!("E1 = A1 - I1 - H1 is negative ({})", e1));
    }
    let s1 = init.n1 - e1 - init.i1 - init.r1 - init.v1 - init.b1 - h1;
    [
        s1,
        e1,
        init.i1,
        init.r1,
        init.v1,
        init.b1,
        h1,
        data.r_total[0],
        data.h_total[0],
        data.v_total[0],
        data.d_total[0],
    ]
}

fn sum_relative_errors<'a, I>(pairs: I) -> Result<RelativeErrors>
where
    I: IntoIterator<Item = (Series, &'a [f64], Vec<f64>)>,
{
    let mut out = RelativeErrors { l2: 0.0, linf: 0.0 };
    for (series, reported, model) in pairs {
        let (l2, linf) = relative_errors(reported, &model)
            .ok_or_else(|| FitError::empty_alignment(format!("series {}", series.name())))?;
        out.l2 += l2;
        out.linf += linf;
    }
    Ok(out)
}

/// Errors of a model solution against the reported data over `Series::TRACKED`.
pub fn compare_to_reported(data: &ReportedData, model: &ModelSolution) -> Result<RelativeErrors> {
    let modeled: Vec<(Series, Vec<f64>)> = Series::TRACKED.iter().map(|&s| (s, model.series(s))).collect();
    let reported: Vec<_> = Series::TRACKED.iter().map(|&s| data.series(s)).collect();
    sum_relative_errors(
        modeled
            .into_iter()
            .zip(reported.iter())
            .map(|((s, m), r)| (s, r.as_ref(), m)),
    )
}

/// IDP reconstruction, forward integration and comparison for one (ξ, c).
pub fn evaluate_detailed(
    xi: f64,
    c: f64,
    h: f64,
    psi: &dyn PsiFunction,
    data: &ReportedData,
    opts: &OdeOptions,
) -> Result<FitReport> {
    let aligned = data.aligned()?;
    let idp = solve_idp(xi, h, c, psi, &aligned)?;
    let mut diagnostics = idp.diagnostics.clone();

    let params = idp.day_parameters(&aligned);
    let y0 = initial_state(&aligned, &mut diagnostics);
    let model = integrate_seirsvbh(&params, y0, h, opts)?;
    let errors = compare_to_reported(&aligned, &model)?;

    if !(errors.l2 >= 0.0 && errors.linf >= 0.0) {
        diagnostics.info("evaluate", format!("degenerate errors at xi={}, c={}: {:?}", xi, c, errors));
    }
    Ok(FitReport { xi, c, idp, model, errors, diagnostics })
}

pub fn evaluate(
    xi: f64,
    c: f64,
    h: f64,
    psi: &dyn PsiFunction,
    data: &ReportedData,
    opts: &OdeOptions,
) -> Result<RelativeErrors> {
    evaluate_detailed(xi, c, h, psi, data, opts).map(|r| r.errors)
}

/// SEIR reference evaluator: sums relative errors over A and R = Rtotal + Dtotal only.
pub fn evaluate_seir_detailed(data: &ReportedData, h: f64, opts: &OdeOptions) -> Result<SeirFitReport> {
    let idp = solve_idp_seir(data)?;
    let diagnostics = idp.diagnostics.clone();
    let y0 = [idp.s[0], idp.e[0], idp.i[0], idp.r[0]];
    let model = integrate_seir(&idp.beta, &idp.gamma, &idp.omega, y0, Some(idp.n), h, opts)?;

    let reported: Vec<_> = Series::SEIR_TRACKED.iter().map(|&s| data.series(s)).collect();
    let errors = sum_relative_errors(Series::SEIR_TRACKED.iter().zip(reported.iter()).map(|(&s, r)| {
        // both series exist in the SEIR solution
        let m = model.series(s).unwrap_or_default();
        (s, r.as_ref(), m)
    }))?;
    Ok(SeirFitReport { idp, model, errors, diagnostics })
}

pub fn evaluate_seir(data: &ReportedData, h: f64, opts: &OdeOptions) -> Result<RelativeErrors> {
    evaluate_seir_detailed(data, h, opts).map(|r| r.errors)
}

/// One cell of the (ξ, c) sweep.
pub trait CellEvaluator: Sync {
    fn evaluate_cell(&self, xi: f64, c: f64) -> Result<RelativeErrors>;
}

impl<F> CellEvaluator for F
where
    F: Fn(f64, f64) -> Result<RelativeErrors> + Sync,
{
    fn evaluate_cell(&self, xi: f64, c: f64) -> Result<RelativeErrors> {
        self(xi, c)
    }
}

/// The full SEIRSVBH pipeline as a sweep cell evaluator.
pub struct SeirsvbhEvaluator<'a> {
    pub data: &'a ReportedData,
    pub h: f64,
    pub psi: &'a dyn PsiFunction,
    pub opts: OdeOptions,
}

impl CellEvaluator for SeirsvbhEvaluator<'_> {
    fn evaluate_cell(&self, xi: f64, c: f64) -> Result<RelativeErrors> {
        evaluate(xi, c, self.h, self.psi, self.data, &self.opts)
    }
}
