//! Error types for the explicit solver.
//!
//! Mirrors the propagation policy of the original: `InvalidMesh`,
//! `InvalidMaterial`, and `ConfigOutOfRange` are checked once at
//! initialization and abort before any step runs; `DegenerateElement` and
//! the `NonConvergent*` variants occur mid-step and carry enough context
//! to reconstruct the diagnostic the original printed to stdout before
//! calling `exit`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DynelaError>;

#[derive(Error, Debug)]
pub enum DynelaError {
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("element {element} has no material bound")]
    InvalidMaterial { element: u64 },

    #[error(
        "element {element} integration point {int_point} is degenerate: det(F) = {det_f:.6e} <= 0 at t = {time:.6e}"
    )]
    DegenerateElement { element: u64, int_point: usize, det_f: f64, time: f64 },

    #[error(
        "radial return did not converge for element {element} integration point {int_point} \
         after {iterations} iterations (gamma = {gamma:.6e}, bracket = [{gamma_min:.6e}, {gamma_max:.6e}], dt = {dt:.6e})"
    )]
    NonConvergentReturn {
        element: u64,
        int_point: usize,
        iterations: usize,
        gamma: f64,
        gamma_min: f64,
        gamma_max: f64,
        dt: f64,
    },

    #[error("polar decomposition did not converge within {sweeps} sweeps")]
    NonConvergentDecomposition { sweeps: usize },

    #[error("configuration value out of range: {0}")]
    ConfigOutOfRange(String),

    #[error("boundary conflict on node {node} dof {dof}: {value_a} vs {value_b}")]
    BoundaryConflict { node: u64, dof: usize, value_a: f64, value_b: f64 },

    #[error("result sink error: {0}")]
    Sink(#[from] dynela_io::IoError),
}

impl DynelaError {
    /// True for the mid-step failures that should trigger an emergency
    /// snapshot before the run terminates.
    pub fn is_fatal_mid_step(&self) -> bool {
        matches!(
            self,
            DynelaError::DegenerateElement { .. }
                | DynelaError::NonConvergentReturn { .. }
                | DynelaError::NonConvergentDecomposition { .. }
        )
    }
}
