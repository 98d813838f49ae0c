use epifit::calibration::{evaluate_detailed, summarize, sweep, Orientation, RayonExecutor, SeirsvbhEvaluator};
use epifit::math::ode::OdeOptions;
use epifit::model::seirsvbh::integrate_seirsvbh;
use epifit::{Compartment, DayParameters, InitialConditions, QuadraticPsi, ReportedData};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Toy region: constant rates, 60 days
    let days = 60;
    let c = |v: f64| vec![v; days];
    let params = DayParameters {
        birth: c(0.0),
        theta: c(0.0),
        omega: c(1.0 / 5.0),
        lambda: c(1.0 / 180.0),
        nu: c(0.0),
        mu: c(1.0 / 90.0),
        phi: c(0.5),
        alpha: c(0.002),
        beta: c(0.25),
        gamma: c(1.0 / 7.0),
        rho: c(0.01),
        sigma: c(1.0 / 10.0),
        tau: c(0.005),
    };
    let y0 = [999_000.0, 400.0, 500.0, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.0];
    let opts = OdeOptions::default();
    let truth = integrate_seirsvbh(&params, y0, 1.0, &opts)?;

    let data = ReportedData {
        birth: params.birth.clone(),
        theta: params.theta.clone(),
        omega: params.omega.clone(),
        lambda: params.lambda.clone(),
        nu: params.nu.clone(),
        mu: params.mu.clone(),
        phi: params.phi.clone(),
        active: truth.active(),
        hospitalized: truth.column(Compartment::H),
        r_total: truth.column(Compartment::RTotal),
        h_total: truth.column(Compartment::HTotal),
        v_total: truth.column(Compartment::VTotal),
        d_total: truth.column(Compartment::DTotal),
        initial: InitialConditions { n1: y0[..7].iter().sum(), i1: y0[2], r1: 0.0, v1: 0.0, b1: 0.0 },
    };

    let report = evaluate_detailed(0.5, 0.0, 1.0, &QuadraticPsi, &data, &opts)?;
    println!("day,beta,gamma,rho");
    for (d, ((b, g), r)) in report.idp.beta.iter().zip(&report.idp.gamma).zip(&report.idp.rho).enumerate() {
        if d % 10 == 0 {
            println!("{},{:.4},{:.4},{:.4}", d + 1, b, g, r);
        }
    }
    println!("rel_l2={:.4e} rel_linf={:.4e}", report.errors.l2, report.errors.linf);

    let evaluator = SeirsvbhEvaluator { data: &data, h: 1.0, psi: &QuadraticPsi, opts };
    let xi: Vec<f64> = (0..=10).map(|k| k as f64 / 10.0).collect();
    let cs: Vec<f64> = (-4..=4).map(|k| k as f64 * 0.05).collect();
    let outcome = sweep(&xi, &cs, &evaluator, &RayonExecutor::new(4), Orientation::Auto)?;
    print!("{}", summarize(&outcome.grid, Some(2)));

    Ok(())
}
