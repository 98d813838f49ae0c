use anyhow::Context;

use crate::model::data::Compartment;
use crate::model::seirsvbh::ModelSolution;

/// Dump a model trajectory as `key=value` header lines followed by CSV rows.
pub fn write_trajectory_log(
    out_dir: impl AsRef<std::path::Path>,
    run_id: &str,
    xi: f64,
    c: f64,
    h: f64,
    solution: &ModelSolution,
) -> anyhow::Result<std::path::PathBuf> {
    use std::io::Write;

    std::fs::create_dir_all(out_dir.as_ref()).context("create logs dir failed")?;
    let path = out_dir.as_ref().join(format!("trajectory_{}.txt", run_id));
    let mut f = std::fs::File::create(&path)
        .with_context(|| format!("create trajectory log file failed (path={:?})", path))?;

    anyhow::ensure!(solution.t.len() == solution.y.len(), "timeline t mismatch");

    writeln!(f, "run_id={}", run_id)?;
    writeln!(f, "xi={:.6}", xi)?;
    writeln!(f, "c={:.6}", c)?;
    writeln!(f, "h_days={:.6}", h)?;
    writeln!(f, "days={}", solution.t.len().saturating_sub(1))?;
    writeln!(f)?;

    let header: Vec<&str> = Compartment::ALL.iter().map(|c| c.name()).collect();
    writeln!(f, "t,{}", header.join(","))?;
    for (t, row) in solution.t.iter().zip(&solution.y) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        writeln!(f, "{:.6},{}", t, cells.join(","))?;
    }

    Ok(path)
}
