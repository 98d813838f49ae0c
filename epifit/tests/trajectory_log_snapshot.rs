use epifit::io::debug_log::write_trajectory_log;
use epifit::math::ode::OdeOptions;
use epifit::model::seirsvbh::integrate_seirsvbh;
use epifit::DayParameters;

#[test]
fn trajectory_log_snapshot_small() {
    // no rates at all: the state stays where it starts
    let zero = vec![0.0; 2];
    let params = DayParameters {
        birth: zero.clone(),
        theta: zero.clone(),
        omega: zero.clone(),
        lambda: zero.clone(),
        nu: zero.clone(),
        mu: zero.clone(),
        phi: zero.clone(),
        alpha: zero.clone(),
        beta: zero.clone(),
        gamma: zero.clone(),
        rho: zero.clone(),
        sigma: zero.clone(),
        tau: zero,
    };
    let y0 = [990.0, 5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let solution = integrate_seirsvbh(&params, y0, 1.0, &OdeOptions::default()).expect("integrate");

    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_trajectory_log(tmp.path(), "TEST-SMALL", 0.5, 0.0, 1.0, &solution).expect("write log");
    assert!(path.ends_with("trajectory_TEST-SMALL.txt"));

    let s = std::fs::read_to_string(path).expect("read log");
    insta::assert_snapshot!(s, @r"
    run_id=TEST-SMALL
    xi=0.500000
    c=0.000000
    h_days=1.000000
    days=2

    t,S,E,I,R,V,B,H,Rtotal,Htotal,Vtotal,Dtotal
    0.000000,990.000,5.000,5.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000
    1.000000,990.000,5.000,5.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000
    2.000000,990.000,5.000,5.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000,0.000
    ");
}
