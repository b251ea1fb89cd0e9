//! Mesh ownership: nodes, elements, and the per-element integration-point
//! arrays they own.

use std::collections::HashSet;
use std::sync::Arc;

use crate::elements::table::{ElementFamily, ElementTable};
use crate::error::DynelaError;
use crate::materials::Material;
use crate::state::{IntegrationPoint, Node};
use crate::tensor::Vec3;

/// One element: a topology table reference, its ordered node handles, the
/// bound material, and its owned integration-point state.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: u64,
    pub table: Arc<ElementTable>,
    /// Indices into `Mesh::nodes`, ordered per the table's node convention.
    pub node_indices: Vec<usize>,
    pub material: Arc<Material>,
    pub integration_points: Vec<IntegrationPoint>,
}

impl Element {
    pub fn new(
        id: u64,
        table: Arc<ElementTable>,
        node_indices: Vec<usize>,
        material: Arc<Material>,
    ) -> Result<Self, DynelaError> {
        if !table.is_valid() {
            return Err(DynelaError::InvalidMesh(format!(
                "element table {} failed magic-word validation",
                table.name
            )));
        }
        if node_indices.len() != table.node_count {
            return Err(DynelaError::InvalidMesh(format!(
                "element {id} has {} nodes but topology {} expects {}",
                node_indices.len(),
                table.name,
                table.node_count
            )));
        }

        let integration_points = (0..table.integration_points.len())
            .map(|row| IntegrationPoint::new(row, material.density, material.initial_temperature))
            .collect();

        Ok(Element { id, table, node_indices, material, integration_points })
    }

    pub fn family(&self) -> ElementFamily {
        self.table.family
    }
}

/// Owns the node and element arrays, kept sorted by number. Node
/// back-references (`Node::elements`) are populated once at build time.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
}

impl Mesh {
    /// Validate and assemble a mesh from freshly-constructed nodes/elements.
    pub fn build(mut nodes: Vec<Node>, mut elements: Vec<Element>) -> Result<Self, DynelaError> {
        nodes.sort_by_key(|n| n.id);
        elements.sort_by_key(|e| e.id);

        let mut seen_node_ids = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen_node_ids.insert(node.id) {
                return Err(DynelaError::InvalidMesh(format!("duplicate node number {}", node.id)));
            }
        }

        let mut seen_element_ids = HashSet::with_capacity(elements.len());
        for element in &elements {
            if !seen_element_ids.insert(element.id) {
                return Err(DynelaError::InvalidMesh(format!(
                    "duplicate element number {}",
                    element.id
                )));
            }
        }

        if let Some(first_family) = elements.first().map(|e| e.family()) {
            if elements.iter().any(|e| e.family() != first_family) {
                return Err(DynelaError::InvalidMesh(
                    "model mixes element families within one mesh".into(),
                ));
            }
        }

        for (element_index, element) in elements.iter().enumerate() {
            for &node_index in &element.node_indices {
                if node_index >= nodes.len() {
                    return Err(DynelaError::InvalidMesh(format!(
                        "element {} references missing node index {}",
                        element.id, node_index
                    )));
                }
                nodes[node_index].elements.push(element_index);
            }
        }

        Ok(Mesh { nodes, elements })
    }

    /// Global min/max bounding box over current nodal coordinates.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.nodes.iter();
        let first = iter.next()?.position;
        let mut min = first;
        let mut max = first;
        for node in iter {
            min = min.inf(&node.position);
            max = max.sup(&node.position);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::hex8;
    use crate::materials::LinearHardening;

    fn unit_cube_material() -> Arc<Material> {
        Arc::new(Material::new(
            "steel",
            210.0e9,
            0.3,
            7800.0,
            460.0,
            0.9,
            293.15,
            Arc::new(LinearHardening { y0: 300.0e6, h: 1.0e9 }),
        ))
    }

    fn unit_cube_nodes() -> Vec<Node> {
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
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| Node::new(i as u64 + 1, Vec3::new(x, y, z)))
            .collect()
    }

    #[test]
    fn builds_single_hex_mesh_and_populates_back_references() {
        let table = Arc::new(hex8::build_table());
        let nodes = unit_cube_nodes();
        let material = unit_cube_material();
        let element = Element::new(1, table, (0..8).collect(), material).unwrap();

        let mesh = Mesh::build(nodes, vec![element]).unwrap();
        assert_eq!(mesh.nodes.len(), 8);
        assert_eq!(mesh.nodes[0].elements, vec![0]);

        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn rejects_duplicate_node_numbers() {
        let mut nodes = unit_cube_nodes();
        nodes[1].id = nodes[0].id;
        let table = Arc::new(hex8::build_table());
        let material = unit_cube_material();
        let element = Element::new(1, table, (0..8).collect(), material).unwrap();

        let result = Mesh::build(nodes, vec![element]);
        assert!(matches!(result, Err(DynelaError::InvalidMesh(_))));
    }

    #[test]
    fn rejects_element_with_wrong_node_count() {
        let table = Arc::new(hex8::build_table());
        let material = unit_cube_material();
        let result = Element::new(1, table, vec![0, 1, 2], material);
        assert!(matches!(result, Err(DynelaError::InvalidMesh(_))));
    }
}
