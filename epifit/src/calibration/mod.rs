//! Error-surface exploration over the numerical tuning parameters (ξ, c).

pub mod config;
pub mod evaluate;
pub mod extrema;
pub mod sweep;

pub use config::{GridAxis, RunConfig, SweepConfig};
pub use evaluate::{
    evaluate, evaluate_detailed, evaluate_seir, evaluate_seir_detailed, CellEvaluator, FitReport,
    RelativeErrors, SeirsvbhEvaluator,
};
pub use extrema::{summarize, Extremum, GridCell, MatrixExtrema, NeighborhoodScan, Summary};
pub use sweep::{sweep, ErrorGrid, LineExecutor, Orientation, RayonExecutor, SerialExecutor, SweepOutcome};
