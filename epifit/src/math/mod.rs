pub mod norms;
pub mod ode;
pub mod psi;
