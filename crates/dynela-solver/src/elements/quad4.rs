//! The 4-node bilinear quadrilateral topology table, shared by the
//! `Planar` and `Axisymmetric` families.
//!
//! Node ordering is the usual counter-clockwise convention:
//!
//! ```text
//!     3----------2
//!     |          |
//!     |          |
//!     0----------1
//! ```
//!
//! Local coordinate 0 is radial/horizontal (`r` for axisymmetric), local
//! coordinate 1 is axial/vertical (`z`).

use crate::elements::table::{build_extrapolation_weights, ElementFamily, ElementTable, IntegrationPointRow, TABLE_MAGIC_WORD};
use crate::tensor::Vec3;

const XI_N: [f64; 4] = [-1.0, 1.0, 1.0, -1.0];
const ETA_N: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

pub fn shape_functions(xi: f64, eta: f64) -> [f64; 4] {
    let mut n = [0.0; 4];
    for i in 0..4 {
        n[i] = (1.0 + xi * XI_N[i]) * (1.0 + eta * ETA_N[i]) / 4.0;
    }
    n
}

/// Parametric gradient `(dN/dxi, dN/deta)` at each node, stored in a
/// [`Vec3`] with the unused third component left at zero.
pub fn shape_gradients(xi: f64, eta: f64) -> [Vec3; 4] {
    let mut grad = [Vec3::zeros(); 4];
    for i in 0..4 {
        let dxi = XI_N[i] * (1.0 + eta * ETA_N[i]) / 4.0;
        let deta = (1.0 + xi * XI_N[i]) * ETA_N[i] / 4.0;
        grad[i] = Vec3::new(dxi, deta, 0.0);
    }
    grad
}

fn integration_point_row(xi: f64, eta: f64, weight: f64) -> IntegrationPointRow {
    IntegrationPointRow {
        parametric: Vec3::new(xi, eta, 0.0),
        weight,
        shape: shape_functions(xi, eta).to_vec(),
        gradient: shape_gradients(xi, eta).to_vec(),
    }
}

fn build(family: ElementFamily, name: &'static str, vtk_code: i32) -> ElementTable {
    let g = 1.0 / 3.0f64.sqrt();
    let mut full = Vec::with_capacity(4);
    for &eta in &[-g, g] {
        for &xi in &[-g, g] {
            full.push(integration_point_row(xi, eta, 1.0));
        }
    }

    let reduced = vec![integration_point_row(0.0, 0.0, 4.0)];

    let node_parametric_coords = (0..4).map(|i| Vec3::new(XI_N[i], ETA_N[i], 0.0)).collect();

    // A single "face" covering the whole quad, used by `characteristic_length`
    // in place of a 3D element's separate faces.
    let faces = vec![vec![0, 1, 2, 3]];

    let extrapolation_weights = build_extrapolation_weights(&full, 4);

    ElementTable {
        magic_word: TABLE_MAGIC_WORD,
        name,
        family,
        dimension: 2,
        dofs_per_node: 2,
        vtk_code,
        node_count: 4,
        node_parametric_coords,
        integration_points: full,
        reduced_integration_points: reduced,
        faces,
        extrapolation_weights,
    }
}

/// Plane-strain 4-node quadrilateral (`CPE4R`-style VTK quad).
pub fn build_planar_table() -> ElementTable {
    build(ElementFamily::Planar, "CPE4", 9)
}

/// Axisymmetric 4-node quadrilateral: same shape functions and
/// quadrature as the planar table, but local coordinate 0 is interpreted
/// as the radius and the element carries the hoop stress/strain
/// component through the kinematics and force-assembly hoop terms.
pub fn build_axisymmetric_table() -> ElementTable {
    build(ElementFamily::Axisymmetric, "CAX4", 9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_functions_sum_to_one_everywhere() {
        for &(xi, eta) in &[(0.0, 0.0), (0.3, -0.6), (-1.0, 1.0)] {
            let n = shape_functions(xi, eta);
            assert_relative_eq!(n.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn shape_function_is_one_at_its_own_node_and_zero_at_the_rest() {
        for i in 0..4 {
            let n = shape_functions(XI_N[i], ETA_N[i]);
            for (j, &value) in n.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(value, expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn planar_and_axisymmetric_tables_are_well_formed() {
        let planar = build_planar_table();
        assert!(planar.is_valid());
        assert_eq!(planar.family, ElementFamily::Planar);

        let axisym = build_axisymmetric_table();
        assert!(axisym.is_valid());
        assert_eq!(axisym.family, ElementFamily::Axisymmetric);
    }

    #[test]
    fn extrapolation_weights_recover_a_uniform_field_exactly() {
        let table = build_planar_table();
        let ip_values = [1.0; 4];
        for node_weights in &table.extrapolation_weights {
            let extrapolated: f64 = node_weights.iter().zip(&ip_values).map(|(w, v)| w * v).sum();
            assert_relative_eq!(extrapolated, 1.0, epsilon = 1e-10);
        }
    }
}
