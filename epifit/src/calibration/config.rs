use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::calibration::sweep::Orientation;
use crate::math::ode::OdeOptions;
use crate::math::psi::PsiKind;
use crate::model::data::InitialConditions;

/// Upper bound on the number of points per axis.
pub const MAX_AXIS_POINTS: usize = 1_000_000;

/// Inclusive axis start..=end with a fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: f64,
    pub step: f64,
    pub end: f64,
}

impl GridAxis {
    pub fn check(&self, name: &str) -> anyhow::Result<()> {
        anyhow::ensure!(self.start.is_finite() && self.end.is_finite(), "{} axis bounds must be finite", name);
        anyhow::ensure!(self.step.is_finite() && self.step > 0.0, "{} step must be finite and > 0", name);
        anyhow::ensure!(self.start <= self.end, "{} start must not exceed end", name);
        let points = self.steps() + 1.0;
        anyhow::ensure!(
            points.is_finite() && points <= MAX_AXIS_POINTS as f64,
            "{} axis has {:e} points, at most {} allowed",
            name,
            points,
            MAX_AXIS_POINTS
        );
        Ok(())
    }

    fn steps(&self) -> f64 {
        ((self.end - self.start) / self.step + 1e-6).floor()
    }

    /// Values start + i*step up to end (with a small tolerance on the last point).
    ///
    /// Never more than [`MAX_AXIS_POINTS`] values.
    pub fn values(&self) -> Vec<f64> {
        let count = (self.steps() as usize).checked_add(1).unwrap_or(MAX_AXIS_POINTS).min(MAX_AXIS_POINTS);
        (0..count).map(|i| (self.start + i as f64 * self.step).min(self.end)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    // Day length; must be exactly 1.0 on the daily grid
    #[serde(default = "default_h")]
    pub h: f64,
    #[serde(default)]
    pub psi: PsiKind,
    pub xi: GridAxis,
    pub c: GridAxis,

    // Execution
    #[serde(default = "default_workers")]
    pub max_workers: usize,
    #[serde(default)]
    pub orientation: Orientation,
    /// Column half-width of the neighborhood scans printed around minima.
    #[serde(default)]
    pub window_c: Option<usize>,

    // Forward integrator tolerances
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
}

fn default_h() -> f64 {
    1.0
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn default_rtol() -> f64 {
    OdeOptions::default().rtol
}

fn default_atol() -> f64 {
    OdeOptions::default().atol
}

impl SweepConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.h == 1.0, "h must be exactly 1.0 on a daily grid (got {})", self.h);
        self.xi.check("xi")?;
        self.c.check("c")?;
        anyhow::ensure!(self.xi.start >= 0.0 && self.xi.end <= 1.0, "xi axis must lie within [0, 1]");
        anyhow::ensure!(self.c.start >= -0.25 && self.c.end <= 0.25, "c axis must lie within [-0.25, 0.25]");
        anyhow::ensure!(self.max_workers >= 1, "max_workers must be >= 1");
        anyhow::ensure!(self.rtol > 0.0 && self.atol > 0.0, "rtol and atol must be > 0");
        Ok(())
    }

    pub fn ode_options(&self) -> OdeOptions {
        OdeOptions { rtol: self.rtol, atol: self.atol, ..OdeOptions::default() }
    }
}

/// Top-level run configuration: initial compartments plus sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub initial: InitialConditions,
    pub sweep: SweepConfig,
}

impl RunConfig {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let cfg: RunConfig = serde_json::from_str(s).context("invalid run config JSON")?;
        cfg.sweep.check()?;
        Ok(cfg)
    }

    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("Failed to read run config: {}", path))?;
        Self::from_json_str(&s).with_context(|| format!("in {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_values_include_end_point() {
        let axis = GridAxis { start: 0.0, step: 0.1, end: 1.0 };
        let v = axis.values();
        assert_eq!(v.len(), 11);
        assert!((v[10] - 1.0).abs() < 1e-12);
        assert_eq!(GridAxis { start: 0.5, step: 1.0, end: 0.5 }.values(), vec![0.5]);
    }

    #[test]
    fn parses_and_checks_run_config() {
        let json = r#"{
            "initial": {"n1": 1000.0, "i1": 10.0, "r1": 0.0, "v1": 0.0, "b1": 0.0},
            "sweep": {
                "xi": {"start": 0.0, "step": 0.25, "end": 1.0},
                "c": {"start": -0.2, "step": 0.1, "end": 0.2},
                "max_workers": 2,
                "orientation": "columns"
            }
        }"#;
        let cfg = RunConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.sweep.h, 1.0);
        assert_eq!(cfg.sweep.orientation, Orientation::Columns);
        assert_eq!(cfg.sweep.xi.values().len(), 5);
    }

    #[test]
    fn rejects_non_daily_step_and_bad_axes() {
        let mut cfg = SweepConfig {
            h: 0.5,
            psi: PsiKind::Quadratic,
            xi: GridAxis { start: 0.0, step: 0.5, end: 1.0 },
            c: GridAxis { start: 0.0, step: 0.1, end: 0.1 },
            max_workers: 1,
            orientation: Orientation::Auto,
            window_c: None,
            rtol: 1e-8,
            atol: 1e-8,
        };
        assert!(cfg.check().is_err());
        cfg.h = 1.0;
        assert!(cfg.check().is_ok());
        cfg.c.step = 0.0;
        assert!(cfg.check().is_err());
        cfg.c.step = 0.1;
        cfg.xi.end = 1.5;
        assert!(cfg.check().is_err());
    }

    #[test]
    fn rejects_axis_with_too_many_points() {
        let axis = GridAxis { start: 0.0, step: 1e-300, end: 1.0 };
        let err = axis.check("xi").unwrap_err();
        assert!(err.to_string().contains("at most"), "{}", err);
        assert_eq!(axis.values().len(), MAX_AXIS_POINTS);

        let dense = GridAxis { start: 0.0, step: 1e-7, end: 0.2 };
        assert!(dense.check("c").is_err());
        assert!(GridAxis { start: 0.0, step: 1e-6, end: 0.25 }.check("c").is_ok());
    }
}
