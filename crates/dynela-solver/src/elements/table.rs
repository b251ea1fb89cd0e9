//! Immutable, per-topology element tables.
//!
//! Replaces a class hierarchy per element family with a tagged variant
//! (`ElementFamily`) plus a single data-only `ElementTable`, shared by every
//! element instantiated from the same topology. Tables are built once and
//! never mutated; the few places that need family-specific behavior (the
//! axisymmetric hoop term, the hexahedron volume formula) switch on the
//! family tag rather than dispatching through a trait object.

use nalgebra::DMatrix;

use crate::tensor::Vec3;

/// A sentinel written into every table at construction and checked once at
/// element binding time, guarding against a corrupted or partially
/// initialized static table.
pub const TABLE_MAGIC_WORD: u32 = 0xDEC0_0D15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementFamily {
    Planar,
    Axisymmetric,
    ThreeDimensional,
}

/// One row of the integration-point tables: parametric location, weight,
/// and the shape-function/gradient data evaluated there.
#[derive(Debug, Clone)]
pub struct IntegrationPointRow {
    pub parametric: Vec3,
    pub weight: f64,
    /// Shape-function value at each node, length `node_count`.
    pub shape: Vec<f64>,
    /// Shape-function parametric gradient at each node: `(d/dxi, d/deta, d/dzeta)`.
    pub gradient: Vec<Vec3>,
}

/// Static, read-only description of one element topology.
#[derive(Debug, Clone)]
pub struct ElementTable {
    pub magic_word: u32,
    pub name: &'static str,
    pub family: ElementFamily,
    pub dimension: usize,
    pub dofs_per_node: usize,
    pub vtk_code: i32,
    pub node_count: usize,
    /// Natural coordinates of each node, used for building reduced-order
    /// tables.
    pub node_parametric_coords: Vec<Vec3>,
    /// Full-order integration rule.
    pub integration_points: Vec<IntegrationPointRow>,
    /// Under-integrated rule with the same topology, kept for future
    /// hourglass stabilization; currently unused in force assembly.
    pub reduced_integration_points: Vec<IntegrationPointRow>,
    /// Node-index lists for each face, used by `characteristic_length`.
    pub faces: Vec<Vec<usize>>,
    /// `extrapolation_weights[node][ip]`: weight of integration point `ip`'s
    /// value when extrapolating to `node`, used to build nodal fields (e.g.
    /// for a result snapshot) from integration-point state.
    pub extrapolation_weights: Vec<Vec<f64>>,
}

impl ElementTable {
    pub fn is_valid(&self) -> bool {
        self.magic_word == TABLE_MAGIC_WORD
            && self.node_parametric_coords.len() == self.node_count
            && self.integration_points.iter().all(|row| row.shape.len() == self.node_count)
            && self.extrapolation_weights.len() == self.node_count
            && self.extrapolation_weights.iter().all(|row| row.len() == self.integration_points.len())
    }
}

/// Invert the full-integration shape-function matrix `A[ip][node] =
/// N_node(xi_ip)` to get the extrapolation weights `W = A^-1`, so that
/// `value_at_node = sum_ip W[node][ip] * value_at_ip` recovers the nodal
/// value implied by a linear field sampled at the integration points.
/// Requires a square, full-rank rule: one full integration point per node,
/// true of every topology in this crate (2x2x2 Gauss for 8-node hexahedra,
/// 2x2 Gauss for 4-node quadrilaterals).
pub fn build_extrapolation_weights(full_integration_points: &[IntegrationPointRow], node_count: usize) -> Vec<Vec<f64>> {
    assert_eq!(
        full_integration_points.len(),
        node_count,
        "extrapolation requires as many full integration points as nodes"
    );

    let mut a = DMatrix::<f64>::zeros(node_count, node_count);
    for (ip, row) in full_integration_points.iter().enumerate() {
        for (node, &n) in row.shape.iter().enumerate() {
            a[(ip, node)] = n;
        }
    }

    let a_inv = a.try_inverse().expect("integration-point shape matrix must be invertible for extrapolation");

    (0..node_count).map(|node| (0..node_count).map(|ip| a_inv[(node, ip)]).collect()).collect()
}
