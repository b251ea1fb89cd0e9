//! The 8-node trilinear hexahedron topology table.
//!
//! Node ordering follows the common convention of a bottom quad (0-3) and a
//! top quad (4-7), matched up edge-to-edge:
//!
//! ```text
//!        7----------6
//!       /|         /|
//!      / |        / |
//!     4----------5  |
//!     |  3-------|--2
//!     | /        | /
//!     |/         |/
//!     0----------1
//! ```

use crate::elements::table::{build_extrapolation_weights, ElementFamily, ElementTable, IntegrationPointRow, TABLE_MAGIC_WORD};
use crate::tensor::Vec3;

const XI_N: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
const ETA_N: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
const ZETA_N: [f64; 8] = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];

pub fn shape_functions(xi: f64, eta: f64, zeta: f64) -> [f64; 8] {
    let mut n = [0.0; 8];
    for i in 0..8 {
        n[i] = (1.0 + xi * XI_N[i]) * (1.0 + eta * ETA_N[i]) * (1.0 + zeta * ZETA_N[i]) / 8.0;
    }
    n
}

/// Parametric gradient `(dN/dxi, dN/deta, dN/dzeta)` at each node.
pub fn shape_gradients(xi: f64, eta: f64, zeta: f64) -> [Vec3; 8] {
    let mut grad = [Vec3::zeros(); 8];
    for i in 0..8 {
        let dxi = XI_N[i] * (1.0 + eta * ETA_N[i]) * (1.0 + zeta * ZETA_N[i]) / 8.0;
        let deta = (1.0 + xi * XI_N[i]) * ETA_N[i] * (1.0 + zeta * ZETA_N[i]) / 8.0;
        let dzeta = (1.0 + xi * XI_N[i]) * (1.0 + eta * ETA_N[i]) * ZETA_N[i] / 8.0;
        grad[i] = Vec3::new(dxi, deta, dzeta);
    }
    grad
}

fn integration_point_row(xi: f64, eta: f64, zeta: f64, weight: f64) -> IntegrationPointRow {
    IntegrationPointRow {
        parametric: Vec3::new(xi, eta, zeta),
        weight,
        shape: shape_functions(xi, eta, zeta).to_vec(),
        gradient: shape_gradients(xi, eta, zeta).to_vec(),
    }
}

/// Build the full 2x2x2 Gauss-quadrature table and the one-point reduced
/// table for the `ThreeDimensional` family.
pub fn build_table() -> ElementTable {
    let g = 1.0 / 3.0f64.sqrt();
    let mut full = Vec::with_capacity(8);
    for &zeta in &[-g, g] {
        for &eta in &[-g, g] {
            for &xi in &[-g, g] {
                full.push(integration_point_row(xi, eta, zeta, 1.0));
            }
        }
    }

    let reduced = vec![integration_point_row(0.0, 0.0, 0.0, 8.0)];

    let node_parametric_coords = (0..8).map(|i| Vec3::new(XI_N[i], ETA_N[i], ZETA_N[i])).collect();

    let faces = vec![
        vec![0, 1, 2, 3],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![3, 2, 6, 7],
        vec![0, 3, 7, 4],
        vec![1, 2, 6, 5],
    ];

    let extrapolation_weights = build_extrapolation_weights(&full, 8);

    ElementTable {
        magic_word: TABLE_MAGIC_WORD,
        name: "C3D8R",
        family: ElementFamily::ThreeDimensional,
        dimension: 3,
        dofs_per_node: 3,
        vtk_code: 12,
        node_count: 8,
        node_parametric_coords,
        integration_points: full,
        reduced_integration_points: reduced,
        faces,
        extrapolation_weights,
    }
}
