use std::fmt;

use serde::Serialize;

use crate::calibration::sweep::ErrorGrid;
use crate::math::norms::nan_min_max;

/// A grid location labelled with its parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub xi: f64,
    pub c: f64,
}

/// An extreme value and every cell holding exactly that value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatrixExtrema {
    Found { min: Extremum, max: Extremum },
    /// Every entry is NaN.
    NoEntries,
}

impl MatrixExtrema {
    pub fn min(&self) -> Option<&Extremum> {
        match self {
            MatrixExtrema::Found { min, .. } => Some(min),
            MatrixExtrema::NoEntries => None,
        }
    }

    pub fn max(&self) -> Option<&Extremum> {
        match self {
            MatrixExtrema::Found { max, .. } => Some(max),
            MatrixExtrema::NoEntries => None,
        }
    }

    /// Cells of the minimum; empty when there are no entries.
    pub fn min_cells(&self) -> &[GridCell] {
        self.min().map(|m| m.cells.as_slice()).unwrap_or(&[])
    }
}

/// Metric values across a column window at the row of a minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodScan {
    pub metric: &'static str,
    pub center: GridCell,
    /// (col, c, value), left to right
    pub cells: Vec<(usize, f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub l2: MatrixExtrema,
    pub linf: MatrixExtrema,
    /// Minimum of l2 + linf, None when every sum is NaN.
    pub combined: Option<Extremum>,
    pub scans: Vec<NeighborhoodScan>,
}

fn cells_equal_to(grid: &ErrorGrid, m: &[Vec<f64>], value: f64) -> Vec<GridCell> {
    let mut out = Vec::new();
    for (row, line) in m.iter().enumerate() {
        for (col, &v) in line.iter().enumerate() {
            if v.to_bits() == value.to_bits() {
                out.push(GridCell { row, col, xi: grid.xi[row], c: grid.c[col] });
            }
        }
    }
    out
}

fn extrema_of(grid: &ErrorGrid, m: &[Vec<f64>]) -> MatrixExtrema {
    match nan_min_max(m) {
        None => MatrixExtrema::NoEntries,
        Some((lo, hi)) => MatrixExtrema::Found {
            min: Extremum { value: lo, cells: cells_equal_to(grid, m, lo) },
            max: Extremum { value: hi, cells: cells_equal_to(grid, m, hi) },
        },
    }
}

fn scan(grid: &ErrorGrid, m: &[Vec<f64>], metric: &'static str, center: GridCell, window: usize) -> NeighborhoodScan {
    let lo = center.col.saturating_sub(window);
    let hi = (center.col + window).min(grid.cols() - 1);
    let cells = (lo..=hi).map(|col| (col, grid.c[col], m[center.row][col])).collect();
    NeighborhoodScan { metric, center, cells }
}

/// Locate minima and maxima of both error matrices, ties included.
///
/// With `window_c`, every minimum cell of l2 and of linf gets a neighborhood scan
/// over columns `col ± window_c` at its row.
pub fn summarize(grid: &ErrorGrid, window_c: Option<usize>) -> Summary {
    let l2 = extrema_of(grid, &grid.l2);
    let linf = extrema_of(grid, &grid.linf);

    let sum: Vec<Vec<f64>> = grid
        .l2
        .iter()
        .zip(&grid.linf)
        .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x + y).collect())
        .collect();
    let combined = extrema_of(grid, &sum).min().cloned();

    let mut scans = Vec::new();
    if let Some(w) = window_c {
        for &cell in l2.min_cells() {
            scans.push(scan(grid, &grid.l2, "l2", cell, w));
        }
        for &cell in linf.min_cells() {
            scans.push(scan(grid, &grid.linf, "linf", cell, w));
        }
    }

    for (name, ext) in [("l2", &l2), ("linf", &linf)] {
        match ext.min() {
            Some(min) => log::info!("min {} = {:.6e} at {} cell(s)", name, min.value, min.cells.len()),
            None => log::info!("{}: no finite entries", name),
        }
    }
    Summary { l2, linf, combined, scans }
}

impl fmt::Display for NeighborhoodScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} around xi={:.4}, c={:.4} (row {}, col {}):",
            self.metric, self.center.xi, self.center.c, self.center.row, self.center.col
        )?;
        for &(col, c, v) in &self.cells {
            if col == self.center.col {
                writeln!(f, "  c={:+.4}  [{:.6e}]", c, v)?;
            } else {
                writeln!(f, "  c={:+.4}   {:.6e}", c, v)?;
            }
        }
        Ok(())
    }
}

fn write_extremum(f: &mut fmt::Formatter<'_>, label: &str, ext: &Extremum) -> fmt::Result {
    writeln!(f, "{} = {:.6e}", label, ext.value)?;
    for cell in &ext.cells {
        writeln!(f, "  xi={:.4} c={:.4} (row {}, col {})", cell.xi, cell.c, cell.row, cell.col)?;
    }
    Ok(())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, ext) in [("l2", &self.l2), ("linf", &self.linf)] {
            match ext {
                MatrixExtrema::Found { min, max } => {
                    write_extremum(f, &format!("min {}", name), min)?;
                    write_extremum(f, &format!("max {}", name), max)?;
                }
                MatrixExtrema::NoEntries => writeln!(f, "{}: no finite entries", name)?,
            }
        }
        match &self.combined {
            Some(ext) => write_extremum(f, "min l2+linf", ext)?,
            None => writeln!(f, "l2+linf: no finite entries")?,
        }
        for s in &self.scans {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}
