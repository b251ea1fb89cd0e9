//! `Model`: mesh ownership plus the assembly and Courant-scan operations
//! that sit above per-element kinematics.

use crate::error::DynelaError;
use crate::kinematics;
use crate::mesh::Mesh;
use crate::tensor::Vec3;

/// Owns the mesh, the scattered internal-force vector, and the lazily
/// cached lumped mass (stored directly on each `Node`).
pub struct Model {
    pub mesh: Mesh,
    pub internal_force: Vec<Vec3>,
    mass_computed: bool,
}

impl Model {
    pub fn new(mesh: Mesh) -> Result<Self, DynelaError> {
        let mut mesh = mesh;
        for element in &mut mesh.elements {
            kinematics::initialize_reference_jacobians(element, &mesh.nodes)?;
        }
        let node_count = mesh.nodes.len();
        Ok(Model { mesh, internal_force: vec![Vec3::zeros(); node_count], mass_computed: false })
    }

    /// Assemble the lumped mass onto every node. Cached; pass `force` to
    /// recompute even if already assembled once.
    pub fn compute_mass_matrix(&mut self, force: bool) {
        if self.mass_computed && !force {
            return;
        }
        for node in &mut self.mesh.nodes {
            node.mass = 0.0;
        }
        for element in &self.mesh.elements {
            let contributions = kinematics::compute_mass_contribution(element);
            for (local, &node_index) in element.node_indices.iter().enumerate() {
                self.mesh.nodes[node_index].mass += contributions[local];
            }
        }
        self.mass_computed = true;
    }

    /// Zero and re-scatter the global internal-force vector from each
    /// element's local contribution.
    pub fn assemble_internal_forces(&mut self) {
        for f in &mut self.internal_force {
            *f = Vec3::zeros();
        }
        for element in &self.mesh.elements {
            let local_forces = kinematics::compute_internal_forces(element, &self.mesh.nodes);
            for (local, &node_index) in element.node_indices.iter().enumerate() {
                self.internal_force[node_index] += local_forces[local];
            }
        }
    }

    /// `min_e(L_e / c_e)` over every element, recomputed each accepted step.
    pub fn courant_timestep(&self) -> f64 {
        self.mesh
            .elements
            .iter()
            .map(|element| {
                let mean_density: f64 = element.integration_points.iter().map(|ip| ip.density).sum::<f64>()
                    / element.integration_points.len() as f64;
                let length = kinematics::characteristic_length(element, &self.mesh.nodes);
                let wave_speed = element.material.elongation_wave_speed(mean_density);
                length / wave_speed
            })
            .fold(f64::INFINITY, f64::min)
    }

    pub fn total_mass(&self) -> f64 {
        self.mesh.nodes.iter().map(|n| n.mass).sum()
    }

    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        self.mesh.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::hex8;
    use crate::materials::{LinearHardening, Material};
    use crate::mesh::Element;
    use crate::state::Node;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn unit_cube_model() -> Model {
        let coords = [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ];
        let nodes: Vec<Node> = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| Node::new(i as u64 + 1, Vec3::new(x, y, z)))
            .collect();
        let material = Arc::new(Material::new(
            "steel", 210.0e9, 0.3, 7800.0, 460.0, 0.9, 293.15,
            Arc::new(LinearHardening { y0: 300.0e6, h: 1.0e9 }),
        ));
        let table = Arc::new(hex8::build_table());
        let element = Element::new(1, table, (0..8).collect(), material).unwrap();
        let mesh = Mesh::build(nodes, vec![element]).unwrap();
        Model::new(mesh).unwrap()
    }

    #[test]
    fn total_mass_matches_density_times_volume() {
        let mut model = unit_cube_model();
        model.compute_mass_matrix(false);
        assert_relative_eq!(model.total_mass(), 7800.0, epsilon = 1e-6);
    }

    #[test]
    fn mass_is_cached_until_forced() {
        let mut model = unit_cube_model();
        model.compute_mass_matrix(false);
        model.mesh.nodes[0].mass = 999.0;
        model.compute_mass_matrix(false);
        assert_eq!(model.mesh.nodes[0].mass, 999.0);
        model.compute_mass_matrix(true);
        assert_ne!(model.mesh.nodes[0].mass, 999.0);
    }

    #[test]
    fn courant_timestep_is_positive_and_finite() {
        let model = unit_cube_model();
        let dt = model.courant_timestep();
        assert!(dt.is_finite());
        assert!(dt > 0.0);
    }
}
