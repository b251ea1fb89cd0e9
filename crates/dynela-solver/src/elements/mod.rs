//! Element topology tables.
//!
//! An element's behavior is fixed entirely by the immutable [`ElementTable`]
//! it's built from (one per topology, shared by every element instantiated
//! from it) plus the family tag the table carries: the tagged variant
//! `{Planar, Axisymmetric, ThreeDimensional}` replaces a class hierarchy per
//! element family, and the few places that need family-specific behavior
//! (the axisymmetric hoop term, the hexahedron volume formula) switch on the
//! tag directly rather than dispatching through a trait object.

pub mod hex8;
pub mod quad4;
pub mod table;

pub use table::{ElementFamily, ElementTable, IntegrationPointRow, TABLE_MAGIC_WORD};
