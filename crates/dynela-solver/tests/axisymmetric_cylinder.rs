//! End-to-end check: a thin radial stack of axisymmetric quad4 elements,
//! driven outward at the inner face and clamped at the outer face, behaves
//! like the inner layer of a pressurized thick-walled cylinder: the bore
//! displaces outward and develops a tensile hoop stress.

use std::collections::HashMap;
use std::sync::Arc;

use dynela_solver::elements::quad4;
use dynela_solver::{
    BoundaryCondition, ChungHulbertConfig, Element, Fixed, LinearHardening, Material, Mesh,
    Model, Node, PrescribedVelocity, Solver, Vec3,
};

fn node_key(p: Vec3) -> (i64, i64) {
    let scale = 1.0e9;
    ((p.x * scale).round() as i64, (p.y * scale).round() as i64)
}

fn add_node(nodes: &mut Vec<Node>, index: &mut HashMap<(i64, i64), usize>, p: Vec3) -> usize {
    let key = node_key(p);
    *index.entry(key).or_insert_with(|| {
        let id = nodes.len() as u64 + 1;
        nodes.push(Node::new(id, p));
        nodes.len() - 1
    })
}

fn steel_elastic() -> Arc<Material> {
    Arc::new(Material::new(
        "steel",
        210.0e9,
        0.3,
        7800.0,
        460.0,
        0.9,
        293.15,
        Arc::new(LinearHardening { y0: 1.0e12, h: 0.0 }),
    ))
}

#[test]
fn pressurized_bore_displaces_outward_with_tensile_hoop_stress() {
    let material = steel_elastic();
    let table = Arc::new(quad4::build_axisymmetric_table());

    let inner_radius = 0.1;
    let outer_radius = 0.2;
    let layers = 3;
    let height = 0.05;

    let mut nodes = Vec::new();
    let mut index = HashMap::new();
    let mut elements = Vec::new();
    for layer in 0..layers {
        let r0 = inner_radius + (outer_radius - inner_radius) * layer as f64 / layers as f64;
        let r1 = inner_radius + (outer_radius - inner_radius) * (layer + 1) as f64 / layers as f64;
        let corners = [(r0, 0.0), (r1, 0.0), (r1, height), (r0, height)];
        let node_indices: Vec<usize> = corners
            .iter()
            .map(|&(r, z)| add_node(&mut nodes, &mut index, Vec3::new(r, z, 0.0)))
            .collect();
        elements.push(Element::new(layer as u64 + 1, table.clone(), node_indices, material.clone()).unwrap());
    }

    let mesh = Mesh::build(nodes, elements).unwrap();
    let mut bcs = vec![None; mesh.nodes.len()];

    let fixed_radial: Arc<dyn BoundaryCondition> = Arc::new(Fixed { mask: [true, false, false] });
    let driven: Arc<dyn BoundaryCondition> = Arc::new(PrescribedVelocity {
        mask: [true, false, false],
        velocity: Vec3::new(1.0e-3, 0.0, 0.0),
    });
    let mut inner_node = None;
    for (i, node) in mesh.nodes.iter().enumerate() {
        if (node.reference_position.x - outer_radius).abs() < 1.0e-9 {
            bcs[i] = Some(fixed_radial.clone());
        } else if (node.reference_position.x - inner_radius).abs() < 1.0e-9 {
            bcs[i] = Some(driven.clone());
            inner_node = Some(i);
        }
    }
    let inner_node = inner_node.expect("an inner-face node must exist");

    let model = Model::new(mesh).unwrap();
    let mut solver = Solver::new(model, ChungHulbertConfig::default(), bcs).unwrap();
    let dt = solver.current_timestep();
    solver.solve(dt * 50.0).unwrap();

    assert!(
        solver.model.mesh.nodes[inner_node].current().displacement.x > 0.0,
        "the driven bore should displace outward"
    );

    let inner_element = &solver.model.mesh.elements[0];
    let mean_hoop_stress: f64 = inner_element.integration_points.iter().map(|ip| ip.stress.zz()).sum::<f64>()
        / inner_element.integration_points.len() as f64;
    assert!(
        mean_hoop_stress > 0.0,
        "the innermost layer of a radially-expanded cylinder should carry tensile hoop stress, got {mean_hoop_stress}"
    );
}
