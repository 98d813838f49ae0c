//! Inverse-problem fitting of an SEIRSVBH epidemic model to reported daily series.
//!
//! Pipeline: [`ReportedData`] → [`idp::seirsvbh::solve_idp`] → forward integration
//! ([`model::seirsvbh::integrate_seirsvbh`]) → relative errors → (ξ, c) sweep →
//! extrema summary.

pub mod calibration;
pub mod diagnostics;
pub mod error;
pub mod idp;
pub mod io;
pub mod math;
pub mod model;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::FitError;
pub use math::psi::{PsiFunction, PsiKind, QuadraticPsi};
pub use model::data::{Compartment, InitialConditions, ReportedData, Series};
pub use model::seirsvbh::{DayParameters, ModelSolution};
