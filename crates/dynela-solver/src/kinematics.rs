//! Per-element kinematics: reference/current Jacobians, incremental Hencky
//! strain via polar decomposition, internal-force integration, lumped-mass
//! contribution, element volume and characteristic length.
//!
//! `ThreeDimensional` elements use the full 3x3 machinery directly.
//! `Planar`/`Axisymmetric` elements embed their 2x2 in-plane Jacobian into
//! the same 3x3 [`Tensor2`] with the third row/column left at the identity,
//! so [`polar_decompose`] and the rest of the tensor algebra need no
//! 2D-specific variant; only the few places the hoop term and the `2*pi*r`
//! integration measure enter switch on [`ElementFamily`].

use std::f64::consts::PI;

use crate::elements::table::ElementFamily;
use crate::error::DynelaError;
use crate::mesh::Element;
use crate::state::Node;
use crate::tensor::{polar_decompose, Tensor2, Vec3};

/// Evaluate the reference-configuration Jacobian at every integration point
/// and cache its determinant as `det_j0`. Runs once, at element
/// construction, since the reference configuration never changes.
pub fn initialize_reference_jacobians(element: &mut Element, nodes: &[Node]) -> Result<(), DynelaError> {
    let family = element.family();
    for (ip_index, ip) in element.integration_points.iter_mut().enumerate() {
        let row = &element.table.integration_points[ip_index];
        let positions: Vec<Vec3> =
            element.node_indices.iter().map(|&i| nodes[i].reference_position).collect();

        let jacobian = build_jacobian(family, row, &positions);
        let det = jacobian.determinant();
        if det <= 0.0 {
            return Err(DynelaError::DegenerateElement {
                element: element.id,
                int_point: ip_index,
                det_f: det,
                time: 0.0,
            });
        }

        ip.det_j0 = match family {
            ElementFamily::Axisymmetric => {
                let radius = interpolate_scalar(&row.shape, &positions, |p| p.x);
                det * radius
            }
            _ => det,
        };
    }
    Ok(())
}

/// Evaluate the current-configuration Jacobian at every integration point;
/// fails fast if the element has inverted (`det <= 0`).
pub fn compute_jacobian(element: &mut Element, nodes: &[Node], time: f64) -> Result<(), DynelaError> {
    let family = element.family();
    for (ip_index, ip) in element.integration_points.iter_mut().enumerate() {
        let row = &element.table.integration_points[ip_index];
        let positions: Vec<Vec3> = element.node_indices.iter().map(|&i| nodes[i].position).collect();

        let jacobian = build_jacobian(family, row, &positions);
        let det = jacobian.determinant();
        if det <= 0.0 {
            return Err(DynelaError::DegenerateElement { element: element.id, int_point: ip_index, det_f: det, time });
        }
        ip.det_j = det;
    }
    Ok(())
}

/// Compute the incremental (relative) deformation gradient over the step
/// from the predicted incremental displacement, polar-decompose it, and
/// accumulate `strain`/`strain_inc`/`rotation`.
///
/// For `Axisymmetric` elements the hoop (circumferential) entry of the
/// relative deformation gradient is the ratio of new to old radius,
/// `1 + (sum N_I du_{r,I}) / (sum N_I r_I)`, so the accumulated `ln U`
/// naturally carries the hoop log-strain in its third diagonal slot.
pub fn compute_strains(element: &mut Element, nodes: &[Node]) -> Result<(), DynelaError> {
    let family = element.family();
    let node_count = element.node_indices.len();
    for (ip_index, ip) in element.integration_points.iter_mut().enumerate() {
        let row = &element.table.integration_points[ip_index];
        let positions: Vec<Vec3> = element.node_indices.iter().map(|&i| nodes[i].position).collect();

        let jacobian = build_jacobian(family, row, &positions);
        let jacobian_inv = jacobian.try_inverse().ok_or(DynelaError::DegenerateElement {
            element: element.id,
            int_point: ip_index,
            det_f: jacobian.determinant(),
            time: 0.0,
        })?;

        let mut f_rel = Tensor2::identity();
        for local in 0..node_count {
            let du = nodes[element.node_indices[local]].new_fields().incremental_displacement;
            let spatial_grad = jacobian_inv * row.gradient[local];
            f_rel += outer_rows(spatial_grad, du);
        }

        if family == ElementFamily::Axisymmetric {
            let radius = interpolate_scalar(&row.shape, &positions, |p| p.x);
            let du_r: f64 = (0..node_count)
                .map(|local| {
                    row.shape[local]
                        * nodes[element.node_indices[local]].new_fields().incremental_displacement.x
                })
                .sum();
            f_rel[(2, 2)] = 1.0 + du_r / radius;
        }

        let decomposition = polar_decompose(&f_rel)?;
        ip.strain_inc = decomposition.ln_u;
        ip.strain += decomposition.ln_u;
        ip.rotation = decomposition.r;
    }
    Ok(())
}

/// `Bᵀσ` internal-force integration: returns one force vector per local
/// node, summed over integration points and weighted by `w · detJ` (times
/// `2*pi*r` for axisymmetric). Axisymmetric elements additionally add the
/// hoop contribution `N_I · sigma_theta_theta · w · detJ · 2*pi` to the
/// radial component of each node's force.
pub fn compute_internal_forces(element: &Element, nodes: &[Node]) -> Vec<Vec3> {
    let family = element.family();
    let node_count = element.node_indices.len();
    let mut forces = vec![Vec3::zeros(); node_count];

    for (ip_index, ip) in element.integration_points.iter().enumerate() {
        let row = &element.table.integration_points[ip_index];
        let positions: Vec<Vec3> = element.node_indices.iter().map(|&i| nodes[i].position).collect();

        let jacobian = build_jacobian(family, row, &positions);
        let Some(jacobian_inv) = jacobian.try_inverse() else { continue };

        let base_weight = row.weight * ip.det_j;
        let sigma = ip.stress.as_dense();

        let axis_factor = if family == ElementFamily::Axisymmetric {
            let radius = interpolate_scalar(&row.shape, &positions, |p| p.x);
            2.0 * PI * radius
        } else {
            1.0
        };
        let weight = base_weight * axis_factor;

        for local in 0..node_count {
            let spatial_grad = jacobian_inv * row.gradient[local];
            forces[local] += weight * (sigma * spatial_grad);
        }

        if family == ElementFamily::Axisymmetric {
            let hoop_stress = ip.stress.zz();
            let hoop_weight = base_weight * 2.0 * PI;
            for local in 0..node_count {
                forces[local].x += row.shape[local] * hoop_stress * hoop_weight;
            }
        }
    }

    forces
}

/// Diagonal per-node mass contribution, using the reference (undeformed)
/// Jacobian so the lumped mass never changes once computed. For
/// axisymmetric elements `det_j0` already carries the reference radius; the
/// remaining `2*pi` factor is applied here.
pub fn compute_mass_contribution(element: &Element) -> Vec<f64> {
    let family = element.family();
    let node_count = element.node_indices.len();
    let mut mass = vec![0.0; node_count];

    let axis_factor = if family == ElementFamily::Axisymmetric { 2.0 * PI } else { 1.0 };

    for (ip_index, ip) in element.integration_points.iter().enumerate() {
        let row = &element.table.integration_points[ip_index];
        let weight = row.weight * ip.det_j0 * ip.density * axis_factor;
        for local in 0..node_count {
            mass[local] += weight * row.shape[local];
        }
    }

    mass
}

/// Element reference "volume": a solid hexahedron's true volume for
/// `ThreeDimensional` elements, or the in-plane area for `Planar`/
/// `Axisymmetric` elements (area, not volume-of-revolution, since the
/// `2*pi*r` factor belongs to the force/mass integration measure, not the
/// characteristic length used for the Courant estimate).
pub fn element_volume(element: &Element, nodes: &[Node]) -> f64 {
    let p: Vec<Vec3> = element.node_indices.iter().map(|&i| nodes[i].position).collect();
    match element.family() {
        ElementFamily::ThreeDimensional => {
            tetra_volume(p[0], p[1], p[3], p[4])
                + tetra_volume(p[1], p[2], p[3], p[6])
                + tetra_volume(p[1], p[3], p[4], p[6])
        }
        ElementFamily::Planar | ElementFamily::Axisymmetric => quad_face_area(p[0], p[1], p[2], p[3]),
    }
}

fn tetra_volume(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> f64 {
    ((b - a).cross(&(c - a)).dot(&(d - a))).abs() / 6.0
}

/// `volume / max face area` for 3D elements, using the closed-form
/// planar-quadrilateral area from its two diagonals: `area = 1/2 |d1 x d2|`.
/// For 2D elements, `area / max edge length` plays the same role, using the
/// quad's longest edge as the characteristic transverse dimension.
pub fn characteristic_length(element: &Element, nodes: &[Node]) -> f64 {
    let p: Vec<Vec3> = element.node_indices.iter().map(|&i| nodes[i].position).collect();
    match element.family() {
        ElementFamily::ThreeDimensional => {
            let max_face_area = element
                .table
                .faces
                .iter()
                .map(|face| quad_face_area(p[face[0]], p[face[1]], p[face[2]], p[face[3]]))
                .fold(0.0_f64, f64::max);
            element_volume(element, nodes) / max_face_area
        }
        ElementFamily::Planar | ElementFamily::Axisymmetric => {
            let edges = [(p[0], p[1]), (p[1], p[2]), (p[2], p[3]), (p[3], p[0])];
            let max_edge = edges.iter().map(|(a, b)| (b - a).norm()).fold(0.0_f64, f64::max);
            element_volume(element, nodes) / max_edge
        }
    }
}

fn quad_face_area(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> f64 {
    let d1 = c - a;
    let d2 = d - b;
    0.5 * d1.cross(&d2).norm()
}

/// Build the Jacobian `J_rc = dN/dxi_r * x_c` at an integration point: the
/// full 3x3 gradient-outer-position sum for `ThreeDimensional` elements, or
/// the 2x2 in-plane block embedded with an identity third row/column for
/// `Planar`/`Axisymmetric` elements (so a plain 3x3 `determinant()`/
/// `try_inverse()` already gives the right 2D answer).
fn build_jacobian(family: ElementFamily, row: &crate::elements::table::IntegrationPointRow, positions: &[Vec3]) -> Tensor2 {
    let mut jacobian = match family {
        ElementFamily::ThreeDimensional => Tensor2::zeros(),
        ElementFamily::Planar | ElementFamily::Axisymmetric => Tensor2::identity(),
    };
    let in_plane_only = family != ElementFamily::ThreeDimensional;
    if in_plane_only {
        jacobian[(2, 2)] = 1.0;
        jacobian[(0, 2)] = 0.0;
        jacobian[(1, 2)] = 0.0;
        jacobian[(2, 0)] = 0.0;
        jacobian[(2, 1)] = 0.0;
        for r in 0..2 {
            jacobian[(r, 0)] = 0.0;
            jacobian[(r, 1)] = 0.0;
        }
        for (local, &x) in positions.iter().enumerate() {
            let grad = row.gradient[local];
            jacobian[(0, 0)] += grad.x * x.x;
            jacobian[(0, 1)] += grad.x * x.y;
            jacobian[(1, 0)] += grad.y * x.x;
            jacobian[(1, 1)] += grad.y * x.y;
        }
    } else {
        for (local, &x) in positions.iter().enumerate() {
            jacobian += outer_rows(row.gradient[local], x);
        }
    }
    jacobian
}

/// Interpolate a nodal scalar (extracted by `pick`) to an integration point
/// via its shape functions.
fn interpolate_scalar(shape: &[f64], positions: &[Vec3], pick: impl Fn(&Vec3) -> f64) -> f64 {
    shape.iter().zip(positions).map(|(&n, p)| n * pick(p)).sum()
}

/// Column-major outer product `grad ⊗ value`, i.e. a matrix whose row `r`
/// is `grad[r] * value`. Matches the convention `J_rc = dN/dxi_r · x_c`
/// used for both the reference and current Jacobians.
fn outer_rows(grad: Vec3, value: Vec3) -> Tensor2 {
    Tensor2::new(
        grad.x * value.x, grad.x * value.y, grad.x * value.z,
        grad.y * value.x, grad.y * value.y, grad.y * value.z,
        grad.z * value.x, grad.z * value.y, grad.z * value.z,
    )
}
