use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::calibration::sweep::ErrorGrid;

/// JSON cannot carry NaN or ±Inf, so non-finite cells are written as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Cell::Number(v)
        } else if v.is_nan() {
            Cell::Text("NaN".into())
        } else if v > 0.0 {
            Cell::Text("Inf".into())
        } else {
            Cell::Text("-Inf".into())
        }
    }
}

impl Cell {
    fn value(&self) -> anyhow::Result<f64> {
        match self {
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Inf" => Ok(f64::INFINITY),
                "-Inf" => Ok(f64::NEG_INFINITY),
                other => anyhow::bail!("unexpected cell value '{}'", other),
            },
        }
    }
}

/// Persisted sweep: axes, their outer-product grids and both error matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Artifact {
    xi: Vec<f64>,
    c: Vec<f64>,
    xi_grid: Vec<Vec<f64>>,
    c_grid: Vec<Vec<f64>>,
    l2: Vec<Vec<Cell>>,
    linf: Vec<Vec<Cell>>,
}

fn to_cells(m: &[Vec<f64>]) -> Vec<Vec<Cell>> {
    m.iter().map(|row| row.iter().map(|&v| Cell::from(v)).collect()).collect()
}

fn from_cells(m: &[Vec<Cell>], rows: usize, cols: usize, name: &str) -> anyhow::Result<Vec<Vec<f64>>> {
    anyhow::ensure!(m.len() == rows, "{} has {} rows, expected {}", name, m.len(), rows);
    m.iter()
        .map(|row| -> anyhow::Result<Vec<f64>> {
            anyhow::ensure!(row.len() == cols, "{} row has {} columns, expected {}", name, row.len(), cols);
            row.iter().map(Cell::value).collect()
        })
        .collect()
}

pub fn error_grid_to_json(grid: &ErrorGrid) -> anyhow::Result<String> {
    let artifact = Artifact {
        xi: grid.xi.clone(),
        c: grid.c.clone(),
        xi_grid: grid.xi.iter().map(|&x| vec![x; grid.c.len()]).collect(),
        c_grid: grid.xi.iter().map(|_| grid.c.clone()).collect(),
        l2: to_cells(&grid.l2),
        linf: to_cells(&grid.linf),
    };
    serde_json::to_string_pretty(&artifact).context("serialize error grid")
}

pub fn error_grid_from_json(s: &str) -> anyhow::Result<ErrorGrid> {
    let a: Artifact = serde_json::from_str(s).context("parse error grid artifact")?;
    let (rows, cols) = (a.xi.len(), a.c.len());
    Ok(ErrorGrid {
        l2: from_cells(&a.l2, rows, cols, "l2")?,
        linf: from_cells(&a.linf, rows, cols, "linf")?,
        xi: a.xi,
        c: a.c,
    })
}

pub fn save_error_grid(path: impl AsRef<std::path::Path>, grid: &ErrorGrid) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = error_grid_to_json(grid)?;
    std::fs::write(path, json).with_context(|| format!("write error grid failed (path={:?})", path))
}

pub fn load_error_grid(path: impl AsRef<std::path::Path>) -> anyhow::Result<ErrorGrid> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).with_context(|| format!("read error grid failed (path={:?})", path))?;
    error_grid_from_json(&s).with_context(|| format!("in {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_cells_survive_json() {
        let grid = ErrorGrid {
            xi: vec![0.0, 1.0],
            c: vec![-0.1, 0.0, 0.1],
            l2: vec![vec![1.5, f64::NAN, f64::INFINITY], vec![0.25, 2.0, 3.0]],
            linf: vec![vec![f64::NEG_INFINITY, 0.0, 1.0], vec![1.0, 1.0, 1.0]],
        };
        let json = error_grid_to_json(&grid).unwrap();
        assert!(json.contains("xi_grid"));
        let back = error_grid_from_json(&json).unwrap();
        assert!(back.l2[0][1].is_nan());
        assert_eq!(back.l2[0][2], f64::INFINITY);
        assert_eq!(back.linf[0][0], f64::NEG_INFINITY);
        assert_eq!(back.l2[1], grid.l2[1]);
        assert_eq!(back.c, grid.c);
    }
}
