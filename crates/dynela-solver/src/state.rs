//! Per-node and per-integration-point mutable state.
//!
//! Nodal fields are kept as two array slots (`current`, `new`) flipped by an
//! index at end-of-step rather than two heap-owned structs swapped by
//! pointer, so the swap never reallocates and is safe to read from multiple
//! worker threads during a step (only the driver flips the index).

use crate::tensor::{SymTensor2, Tensor2, Vec3};

/// One time-level's worth of per-node kinematic/thermal fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFields {
    pub displacement: Vec3,
    pub incremental_displacement: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub external_force: Vec3,
    pub temperature: f64,
    pub density: f64,
    pub internal_energy_rate: f64,
}

/// A mesh node: identity, reference geometry, two flipped field slots, mass,
/// and the elements that reference it.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: u64,
    pub reference_position: Vec3,
    pub position: Vec3,
    slots: [NodeFields; 2],
    active: usize,
    pub mass: f64,
    /// Indices into `Model::elements` of every element citing this node.
    pub elements: Vec<usize>,
}

impl Node {
    pub fn new(id: u64, reference_position: Vec3) -> Self {
        Node {
            id,
            reference_position,
            position: reference_position,
            slots: [NodeFields::default(), NodeFields::default()],
            active: 0,
            mass: 0.0,
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> &NodeFields {
        &self.slots[self.active]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut NodeFields {
        &mut self.slots[self.active]
    }

    #[inline]
    pub fn new_fields(&self) -> &NodeFields {
        &self.slots[1 - self.active]
    }

    #[inline]
    pub fn new_fields_mut(&mut self) -> &mut NodeFields {
        &mut self.slots[1 - self.active]
    }

    /// Flip the active slot: what was `new` becomes `current`. Must run
    /// only on the driver thread, once per accepted step.
    pub fn swap_fields(&mut self) {
        self.active = 1 - self.active;
    }
}

/// Mutable state at a single integration point, plus a link back to the
/// static table row (parametric coordinate, weight, shape functions) that
/// describes its geometry within the element.
#[derive(Debug, Clone)]
pub struct IntegrationPoint {
    pub stress: SymTensor2,
    pub strain: SymTensor2,
    pub strain_inc: SymTensor2,
    pub plastic_strain: SymTensor2,
    pub plastic_strain_inc: SymTensor2,
    pub rotation: Tensor2,
    pub plastic_strain_scalar: f64,
    pub plastic_strain_rate_scalar: f64,
    pub yield_stress: f64,
    pub temperature: f64,
    pub density: f64,
    pub pressure: f64,
    pub internal_energy: f64,
    pub inelastic_energy: f64,
    /// Last converged plastic multiplier, used as the next step's Newton seed.
    pub gamma: f64,
    pub gamma_cumulate: f64,
    /// Current-configuration Jacobian determinant.
    pub det_j: f64,
    /// Reference-configuration Jacobian determinant (times radius for
    /// axisymmetric elements).
    pub det_j0: f64,
    /// Index into the owning `ElementTable`'s integration-point arrays.
    pub table_row: usize,
}

impl IntegrationPoint {
    pub fn new(table_row: usize, initial_density: f64, initial_temperature: f64) -> Self {
        IntegrationPoint {
            stress: SymTensor2::ZERO,
            strain: SymTensor2::ZERO,
            strain_inc: SymTensor2::ZERO,
            plastic_strain: SymTensor2::ZERO,
            plastic_strain_inc: SymTensor2::ZERO,
            rotation: Tensor2::identity(),
            plastic_strain_scalar: 0.0,
            plastic_strain_rate_scalar: 0.0,
            yield_stress: 0.0,
            temperature: initial_temperature,
            density: initial_density,
            pressure: 0.0,
            internal_energy: 0.0,
            inelastic_energy: 0.0,
            gamma: 0.0,
            gamma_cumulate: 0.0,
            det_j: 1.0,
            det_j0: 1.0,
            table_row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_flips_without_losing_data() {
        let mut node = Node::new(1, Vec3::new(0.0, 0.0, 0.0));
        node.new_fields_mut().displacement = Vec3::new(1.0, 0.0, 0.0);
        node.swap_fields();
        assert_eq!(node.current().displacement, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(node.new_fields().displacement, Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn fresh_integration_point_has_zero_gamma() {
        let ip = IntegrationPoint::new(0, 7800.0, 293.15);
        assert_eq!(ip.gamma, 0.0);
        assert!(ip.det_j > 0.0);
    }
}
