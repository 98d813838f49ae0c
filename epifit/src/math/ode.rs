//! Adaptive Dormand–Prince 5(4) stepping for autonomous-per-day ODE systems.
//!
//! State and derivative are represented as `&[f64]`; the right-hand side is a
//! closure `f(t, y, dy)`. Only the state at the end of the requested interval
//! is kept, intermediate accepted steps are discarded.

/// Tolerances and step bounds for [`dopri45_advance`].
#[derive(Debug, Clone, Copy)]
pub struct OdeOptions {
    pub rtol: f64,
    pub atol: f64,
    pub h_min: f64,
    /// Step budget per advanced interval.
    pub max_steps: usize,
}

impl Default for OdeOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-8,
            h_min: 1e-12,
            max_steps: 100_000,
        }
    }
}

// Butcher tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (advancing solution)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// y5 - y4
const E1: f64 = 35.0 / 384.0 - 5179.0 / 57600.0;
const E3: f64 = 500.0 / 1113.0 - 7571.0 / 16695.0;
const E4: f64 = 125.0 / 192.0 - 393.0 / 640.0;
const E5: f64 = -2187.0 / 6784.0 + 92097.0 / 339200.0;
const E6: f64 = 11.0 / 84.0 - 187.0 / 2100.0;
const E7: f64 = -1.0 / 40.0;

/// Workspace for allocation-free Dormand–Prince steps
pub struct DopriWorkspace {
    k: [Vec<f64>; 7],
    ytmp: Vec<f64>,
    ynew: Vec<f64>,
}

impl DopriWorkspace {
    pub fn new(n: usize) -> Self {
        Self {
            k: std::array::from_fn(|_| vec![0.0; n]),
            ytmp: vec![0.0; n],
            ynew: vec![0.0; n],
        }
    }

    pub fn resize(&mut self, n: usize) {
        if self.ytmp.len() != n {
            for k in self.k.iter_mut() {
                k.resize(n, 0.0);
            }
            self.ytmp.resize(n, 0.0);
            self.ynew.resize(n, 0.0);
        }
    }
}

/// Advance `y` from `t0` to `t1` in place. Returns the number of accepted steps.
///
/// A non-finite error estimate (NaN/Inf in the state or the derivative) accepts
/// the step as is, so degenerate inputs finish the interval and propagate.
pub fn dopri45_advance<F>(
    y: &mut [f64],
    t0: f64,
    t1: f64,
    opts: &OdeOptions,
    ws: &mut DopriWorkspace,
    mut f: F,
) -> Result<usize, String>
where
    F: FnMut(f64, &[f64], &mut [f64]),
{
    let n = y.len();
    ws.resize(n);
    let span = t1 - t0;
    if !(span > 0.0) {
        return Ok(0);
    }

    let DopriWorkspace { k, ytmp, ynew } = ws;
    let [k1, k2, k3, k4, k5, k6, k7] = k;

    let mut t = t0;
    let mut h = (span / 10.0).max(opts.h_min);
    let mut accepted = 0;
    f(t, y, k1);

    for _ in 0..opts.max_steps {
        if t >= t1 {
            return Ok(accepted);
        }
        h = h.min(t1 - t).max(opts.h_min);

        for i in 0..n {
            ytmp[i] = y[i] + h * A21 * k1[i];
        }
        f(t + C2 * h, ytmp, k2);

        for i in 0..n {
            ytmp[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        f(t + C3 * h, ytmp, k3);

        for i in 0..n {
            ytmp[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
        }
        f(t + C4 * h, ytmp, k4);

        for i in 0..n {
            ytmp[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
        }
        f(t + C5 * h, ytmp, k5);

        for i in 0..n {
            ytmp[i] = y[i]
                + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
        }
        f(t + h, ytmp, k6);

        for i in 0..n {
            ynew[i] = y[i] + h * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
        }
        // FSAL
        f(t + h, ynew, k7);

        let mut err = 0.0;
        for i in 0..n {
            let ei = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let sc = opts.atol + opts.rtol * y[i].abs().max(ynew[i].abs());
            err += (ei / sc) * (ei / sc);
        }
        let err = (err / n.max(1) as f64).sqrt();

        if !err.is_finite() || err <= 1.0 || h <= opts.h_min {
            t += h;
            // land exactly on the interval end
            if t1 - t < opts.h_min {
                t = t1;
            }
            y.copy_from_slice(ynew);
            k1.copy_from_slice(k7);
            accepted += 1;
        }

        let factor = if !err.is_finite() {
            1.0
        } else if err == 0.0 {
            5.0
        } else {
            (0.9 * err.powf(-0.2)).clamp(0.2, 5.0)
        };
        h *= factor;
    }

    if t >= t1 {
        Ok(accepted)
    } else {
        Err(format!(
            "exceeded max_steps={} at t={:.6e} before reaching t1={:.6e}",
            opts.max_steps, t, t1
        ))
    }
}
