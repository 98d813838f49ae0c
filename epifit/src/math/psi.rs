use serde::{Deserialize, Serialize};

/// Step-size reshaping function used by the inverse solvers.
///
/// The rest of the crate only depends on the signature `(h, c) -> scalar`.
pub trait PsiFunction: Send + Sync {
    fn psi(&self, h: f64, c: f64) -> f64;
}

/// ψ(h, c) = h − c·h². Documented domain c > −1.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticPsi;

impl PsiFunction for QuadraticPsi {
    fn psi(&self, h: f64, c: f64) -> f64 {
        h - c * h * h
    }
}

impl<F> PsiFunction for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn psi(&self, h: f64, c: f64) -> f64 {
        self(h, c)
    }
}

/// Config-level ψ selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsiKind {
    #[default]
    Quadratic,
}

impl PsiKind {
    pub fn build(self) -> Box<dyn PsiFunction> {
        match self {
            PsiKind::Quadratic => Box::new(QuadraticPsi),
        }
    }
}
