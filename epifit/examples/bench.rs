use std::time::Instant;

use epifit::calibration::{sweep, Orientation, RayonExecutor, RelativeErrors, SerialExecutor};
use epifit::error::Result;

fn main() -> anyhow::Result<()> {
    // Synthetic cell cost so timings reflect scheduling, not the model
    let cell = |xi: f64, c: f64| -> Result<RelativeErrors> {
        let mut acc = 0.0;
        for k in 0..200_000 {
            acc += ((k as f64) * xi + c).sin().abs();
        }
        Ok(RelativeErrors { l2: acc, linf: acc / 2.0 })
    };
    let xi: Vec<f64> = (0..=20).map(|k| k as f64 / 20.0).collect();
    let c: Vec<f64> = (-10..=10).map(|k| k as f64 * 0.025).collect();

    let t_start = Instant::now();
    let serial = sweep(&xi, &c, &cell, &SerialExecutor, Orientation::Rows)?;
    let dur1 = t_start.elapsed();

    let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let t_start2 = Instant::now();
    let parallel = sweep(&xi, &c, &cell, &RayonExecutor::new(workers), Orientation::Auto)?;
    let dur2 = t_start2.elapsed();
    anyhow::ensure!(serial.grid == parallel.grid, "serial and parallel grids differ");

    println!("serial_ms,parallel_ms,workers,speedup_x");
    let s_ms = dur1.as_secs_f64() * 1000.0;
    let p_ms = dur2.as_secs_f64() * 1000.0;
    println!("{:.3},{:.3},{},{:.2}", s_ms, p_ms, parallel.workers_used, s_ms.max(1e-9) / p_ms.max(1e-9));

    Ok(())
}
