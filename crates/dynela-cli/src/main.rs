//! Command-line entry point: assemble a couple of small explicit-dynamics
//! demos in-process, run them to a fixed number of stable timesteps, and
//! report the step-phase timing breakdown.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use dynela_solver::elements::{hex8, quad4};
use dynela_solver::sinks::{NodeHistorySink, VtkResultSink};
use dynela_solver::{
    BoundaryCondition, ChungHulbertConfig, DynelaError, Element, Fixed, LinearHardening, Material,
    Mesh, Model, Node, PrescribedVelocity, Solver, Vec3, ALL_AXES,
};

fn usage() {
    eprintln!("usage:");
    eprintln!("  dynela run-bar <output_dir>");
    eprintln!("  dynela run-cylinder <output_dir>");
    eprintln!("  dynela --help");
    eprintln!("  dynela --version");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  dynela run-bar out/bar");
    eprintln!("  dynela run-cylinder out/cylinder");
}

fn steel() -> Arc<Material> {
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

/// Quantizes a coordinate to a hashable key so the corners shared by
/// neighboring elements collapse onto a single node.
fn node_key(p: Vec3) -> (i64, i64, i64) {
    let scale = 1.0e9;
    ((p.x * scale).round() as i64, (p.y * scale).round() as i64, (p.z * scale).round() as i64)
}

fn add_node(nodes: &mut Vec<Node>, index: &mut HashMap<(i64, i64, i64), usize>, p: Vec3) -> usize {
    let key = node_key(p);
    *index.entry(key).or_insert_with(|| {
        let id = nodes.len() as u64 + 1;
        nodes.push(Node::new(id, p));
        nodes.len() - 1
    })
}

/// Two hex8 elements stacked along x: a uniaxial tension bar with the
/// x=0 face clamped and the x=2 face driven at a constant velocity.
fn build_bar() -> Result<(Model, Vec<Option<Arc<dyn BoundaryCondition>>>), DynelaError> {
    let material = steel();
    let table = Arc::new(hex8::build_table());

    let mut nodes = Vec::new();
    let mut index = HashMap::new();
    let mut elements = Vec::new();

    for slab in 0..2 {
        let x0 = slab as f64;
        let x1 = x0 + 1.0;
        let corners = [
            (x0, 0.0, 0.0),
            (x1, 0.0, 0.0),
            (x1, 1.0, 0.0),
            (x0, 1.0, 0.0),
            (x0, 0.0, 1.0),
            (x1, 0.0, 1.0),
            (x1, 1.0, 1.0),
            (x0, 1.0, 1.0),
        ];
        let node_indices: Vec<usize> = corners
            .iter()
            .map(|&(x, y, z)| add_node(&mut nodes, &mut index, Vec3::new(x, y, z)))
            .collect();
        elements.push(Element::new(slab as u64 + 1, table.clone(), node_indices, material.clone())?);
    }

    let mesh = Mesh::build(nodes, elements)?;
    let mut bcs = vec![None; mesh.nodes.len()];

    let fixed: Arc<dyn BoundaryCondition> = Arc::new(Fixed::all());
    let driven: Arc<dyn BoundaryCondition> =
        Arc::new(PrescribedVelocity { mask: ALL_AXES, velocity: Vec3::new(0.05, 0.0, 0.0) });
    for (i, node) in mesh.nodes.iter().enumerate() {
        if node.reference_position.x <= 1.0e-9 {
            bcs[i] = Some(fixed.clone());
        } else if node.reference_position.x >= 2.0 - 1.0e-9 {
            bcs[i] = Some(driven.clone());
        }
    }

    let model = Model::new(mesh)?;
    Ok((model, bcs))
}

/// Three axisymmetric quad4 elements stacked along the radius: a
/// thick-walled cylinder segment with the inner face driven radially
/// outward and the outer face clamped.
fn build_cylinder() -> Result<(Model, Vec<Option<Arc<dyn BoundaryCondition>>>), DynelaError> {
    let material = steel();
    let table = Arc::new(quad4::build_axisymmetric_table());

    let inner_radius = 1.0;
    let outer_radius = 2.0;
    let layers = 3;
    let height = 1.0;

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
        elements.push(Element::new(layer as u64 + 1, table.clone(), node_indices, material.clone())?);
    }

    let mesh = Mesh::build(nodes, elements)?;
    let mut bcs = vec![None; mesh.nodes.len()];

    let fixed_radial: Arc<dyn BoundaryCondition> = Arc::new(Fixed { mask: [true, false, false] });
    let driven: Arc<dyn BoundaryCondition> =
        Arc::new(PrescribedVelocity { mask: [true, false, false], velocity: Vec3::new(0.02, 0.0, 0.0) });
    for (i, node) in mesh.nodes.iter().enumerate() {
        if (node.reference_position.x - outer_radius).abs() < 1.0e-9 {
            bcs[i] = Some(fixed_radial.clone());
        } else if (node.reference_position.x - inner_radius).abs() < 1.0e-9 {
            bcs[i] = Some(driven.clone());
        }
    }

    let model = Model::new(mesh)?;
    Ok((model, bcs))
}

fn run_demo(name: &'static str, output_dir: &Path) -> Result<(), String> {
    log::info!("{name}: starting at {}", chrono::Local::now().to_rfc3339());

    let (model, bcs) = match name {
        "bar" => build_bar(),
        "cylinder" => build_cylinder(),
        _ => unreachable!("unhandled demo name {name}"),
    }
    .map_err(|err| format!("failed to build {name} model: {err}"))?;

    let mut solver = Solver::new(model, ChungHulbertConfig::default(), bcs)
        .map_err(|err| format!("failed to construct solver: {err}"))?;

    std::fs::create_dir_all(output_dir)
        .map_err(|err| format!("failed to create {}: {err}", output_dir.display()))?;

    let dt = solver.current_timestep();
    let end_time = dt * 200.0;
    log::info!("{name}: dt0 = {dt:e} s, target end time = {end_time:e} s");

    let vtk_sink = VtkResultSink::new(output_dir, name, 0.0, end_time, dt * 20.0)
        .map_err(|err| format!("failed to open vtk sink: {err}"))?;
    solver.add_result_sink(Box::new(vtk_sink));

    let history_path = output_dir.join(format!("{name}_history.txt"));
    let history_sink = NodeHistorySink::new(&history_path, 0)
        .map_err(|err| format!("failed to open history sink: {err}"))?;
    solver.add_history_sink(Box::new(history_sink));

    solver.solve(end_time).map_err(|err| format!("solve failed: {err}"))?;

    println!("{name}: reached t = {:e} s", solver.current_time());
    println!("{}", solver.timing.report());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            usage();
            ExitCode::SUCCESS
        }
        Some("--version") | Some("-V") => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some("run-bar") => {
            if args.len() != 3 {
                usage();
                return ExitCode::from(2);
            }
            let output_dir = PathBuf::from(&args[2]);
            match run_demo("bar", &output_dir) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("run-bar error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        Some("run-cylinder") => {
            if args.len() != 3 {
                usage();
                return ExitCode::from(2);
            }
            let output_dir = PathBuf::from(&args[2]);
            match run_demo("cylinder", &output_dir) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("run-cylinder error: {err}");
                    ExitCode::from(1)
                }
            }
        }
        _ => {
            usage();
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_model_has_two_elements_and_twelve_nodes() {
        let (model, bcs) = build_bar().unwrap();
        assert_eq!(model.mesh.elements.len(), 2);
        assert_eq!(model.mesh.nodes.len(), 12);
        assert!(bcs.iter().any(Option::is_some));
    }

    #[test]
    fn cylinder_model_has_three_layers_and_driven_inner_face() {
        let (model, bcs) = build_cylinder().unwrap();
        assert_eq!(model.mesh.elements.len(), 3);
        let driven_count = model
            .mesh
            .nodes
            .iter()
            .zip(bcs.iter())
            .filter(|(node, bc)| bc.is_some() && (node.reference_position.x - 1.0).abs() < 1.0e-9)
            .count();
        assert_eq!(driven_count, 2);
    }
}
