//! Explicit dynamic finite-element engine for large-deformation
//! elasto-(visco)plastic solid mechanics.
//!
//! The crate is organized bottom-up: [`tensor`] and [`materials`] provide
//! the numerical and constitutive primitives, [`state`] and [`mesh`] hold
//! the mutable simulation data, [`elements`] and [`kinematics`] turn nodal
//! positions into strains and internal forces element by element,
//! [`constitutive`] turns strains into stresses, [`model`] assembles the
//! per-element contributions into a structure, and [`explicit`] drives all
//! of it forward in time with a Chung-Hulbert predictor/corrector scheme.
//! [`boundary`] and [`sinks`] are the input/output seams: prescribed
//! kinematics going in, result snapshots and history traces coming out.

pub mod boundary;
pub mod constitutive;
pub mod elements;
pub mod error;
pub mod explicit;
pub mod kinematics;
pub mod materials;
pub mod mesh;
pub mod model;
pub mod sinks;
pub mod state;
pub mod tensor;
pub mod timing;

pub use boundary::{AxisMask, BoundaryCondition, Fixed, PrescribedVelocity, ALL_AXES};
pub use constitutive::{update_pressure, update_stress};
pub use elements::{ElementFamily, ElementTable, IntegrationPointRow};
pub use error::DynelaError;
pub use explicit::{ChungHulbertConfig, ChungHulbertConstants, Solver};
pub use materials::{HardeningLaw, JohnsonCookHardening, LinearHardening, Material};
pub use mesh::{Element, Mesh};
pub use model::Model;
pub use sinks::{HistorySink, ResultSink};
pub use state::{IntegrationPoint, Node, NodeFields};
pub use tensor::{polar_decompose, SymTensor2, Tensor2, Vec3};
pub use timing::{CpuTimes, PHASES};
