//! End-to-end check: a single hex8 element driven in uniaxial tension
//! below yield stays fully elastic and develops tensile axial stress.

use std::sync::Arc;

use dynela_solver::elements::hex8;
use dynela_solver::{
    BoundaryCondition, ChungHulbertConfig, Element, Fixed, LinearHardening, Material, Mesh,
    Model, Node, PrescribedVelocity, Solver, Vec3, ALL_AXES,
};

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
fn driven_bar_stays_elastic_and_develops_tensile_axial_stress() {
    let nodes = unit_cube_nodes();
    let table = Arc::new(hex8::build_table());
    let element = Element::new(1, table, (0..8).collect(), steel_elastic()).unwrap();
    let mesh = Mesh::build(nodes, vec![element]).unwrap();
    let model = Model::new(mesh).unwrap();

    let fixed_face: Arc<dyn BoundaryCondition> = Arc::new(Fixed::all());
    let driven_face: Arc<dyn BoundaryCondition> =
        Arc::new(PrescribedVelocity { mask: ALL_AXES, velocity: Vec3::new(1.0e-3, 0.0, 0.0) });
    let mut bcs = vec![None; 8];
    for &n in &[0usize, 3, 4, 7] {
        bcs[n] = Some(fixed_face.clone());
    }
    for &n in &[1usize, 2, 5, 6] {
        bcs[n] = Some(driven_face.clone());
    }

    let mut solver = Solver::new(model, ChungHulbertConfig::default(), bcs).unwrap();
    let dt = solver.current_timestep();
    solver.solve(dt * 50.0).unwrap();

    for element in &solver.model.mesh.elements {
        for ip in &element.integration_points {
            assert_eq!(ip.gamma, 0.0, "purely elastic loading must not trigger plastic flow");
            assert_eq!(ip.plastic_strain_scalar, 0.0);
            assert!(ip.stress.xx() > 0.0, "axial component should be tensile, got {}", ip.stress.xx());
            assert!(ip.stress.xx() < 1.0e9, "axial stress implausibly large: {}", ip.stress.xx());
        }
    }
}
