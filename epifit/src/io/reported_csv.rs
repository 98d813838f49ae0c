use anyhow::Context;

use crate::model::data::{InitialConditions, ReportedData};

/// Column names, in the order of `ReportedData` fields.
pub const COLUMNS: [&str; 13] = [
    "birth",
    "theta",
    "omega",
    "lambda",
    "nu",
    "mu",
    "phi",
    "active",
    "hospitalized",
    "r_total",
    "h_total",
    "v_total",
    "d_total",
];

/// Load daily reported series from a CSV file with a header row naming `COLUMNS`
/// (extra columns are ignored, column order is free).
///
/// A blank cell ends its column, so parameter columns may be one row shorter than
/// the observed ones.
pub fn read_reported_csv<R: std::io::Read>(rdr: R, initial: InitialConditions) -> anyhow::Result<ReportedData> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(rdr);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();

    let mut index = [0usize; 13];
    for (slot, name) in index.iter_mut().zip(COLUMNS.iter()) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .with_context(|| format!("Missing column '{}'", name))?;
    }

    let mut cols: Vec<Vec<f64>> = vec![Vec::new(); COLUMNS.len()];
    let mut ended = [false; 13];
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Bad CSV record at data row {}", line + 1))?;
        for (k, &idx) in index.iter().enumerate() {
            let field = record.get(idx).unwrap_or("").trim();
            if field.is_empty() {
                ended[k] = true;
                continue;
            }
            anyhow::ensure!(!ended[k], "column '{}' resumes after a blank cell at data row {}", COLUMNS[k], line + 1);
            let v: f64 = field
                .parse()
                .with_context(|| format!("Non-numeric value '{}' in column '{}' at data row {}", field, COLUMNS[k], line + 1))?;
            cols[k].push(v);
        }
    }

    let mut it = cols.into_iter();
    let mut next = || it.next().unwrap_or_default();
    Ok(ReportedData {
        birth: next(),
        theta: next(),
        omega: next(),
        lambda: next(),
        nu: next(),
        mu: next(),
        phi: next(),
        active: next(),
        hospitalized: next(),
        r_total: next(),
        h_total: next(),
        v_total: next(),
        d_total: next(),
        initial,
    })
}

pub fn load_reported_csv(path: &str, initial: InitialConditions) -> anyhow::Result<ReportedData> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open reported CSV: {}", path))?;
    read_reported_csv(file, initial).with_context(|| format!("in {}", path))
}
