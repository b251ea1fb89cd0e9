//! Result and history sinks: collaborators the integrator drives at
//! end-of-step without being coupled to a concrete file format.

use std::path::{Path, PathBuf};

use dynela_io::{HistoryWriter, Snapshot, SnapshotCell, SnapshotSchedule, VtkWriter};

use crate::error::DynelaError;
use crate::model::Model;

/// Fired each accepted step; decides on its own schedule whether to write.
pub trait ResultSink: Send {
    fn maybe_write(&mut self, t: f64, model: &Model) -> Result<(), DynelaError>;

    /// Called once, right before a fatal mid-step error terminates the run,
    /// with the last consistent (`current`) state.
    fn write_emergency(&mut self, t: f64, model: &Model) -> Result<(), DynelaError>;
}

/// Fired each accepted step with the full model; free to extract whatever
/// scalar/vector time series it was built to record.
pub trait HistorySink: Send {
    fn record(&mut self, t: f64, model: &Model) -> Result<(), DynelaError>;
}

fn build_snapshot(t: f64, model: &Model) -> Snapshot {
    let coordinates: Vec<[f64; 3]> = model.mesh.nodes.iter().map(|n| [n.position.x, n.position.y, n.position.z]).collect();

    let displacement: Vec<[f64; 3]> = model
        .mesh
        .nodes
        .iter()
        .map(|n| {
            let d = n.current().displacement;
            [d.x, d.y, d.z]
        })
        .collect();
    let velocity: Vec<[f64; 3]> = model
        .mesh
        .nodes
        .iter()
        .map(|n| {
            let v = n.current().velocity;
            [v.x, v.y, v.z]
        })
        .collect();
    let temperature: Vec<f64> = model.mesh.nodes.iter().map(|n| n.current().temperature).collect();

    let cells: Vec<SnapshotCell> = model
        .mesh
        .elements
        .iter()
        .map(|e| SnapshotCell { vtk_type: e.table.vtk_code, node_indices: e.node_indices.clone() })
        .collect();

    let mises: Vec<f64> = model
        .mesh
        .elements
        .iter()
        .map(|e| {
            e.integration_points.iter().map(|ip| ip.stress.mises_equivalent()).sum::<f64>()
                / e.integration_points.len() as f64
        })
        .collect();
    let plastic_strain: Vec<f64> = model
        .mesh
        .elements
        .iter()
        .map(|e| {
            e.integration_points.iter().map(|ip| ip.plastic_strain_scalar).sum::<f64>()
                / e.integration_points.len() as f64
        })
        .collect();

    let (nodal_mises, nodal_plastic_strain) = extrapolate_to_nodes(model);

    Snapshot {
        time: t,
        coordinates,
        node_vector_fields: vec![("displacement".to_string(), displacement), ("velocity".to_string(), velocity)],
        node_scalar_fields: vec![
            ("temperature".to_string(), temperature),
            ("mises".to_string(), nodal_mises),
            ("plastic_strain".to_string(), nodal_plastic_strain),
        ],
        cells,
        cell_scalar_fields: vec![("mises".to_string(), mises), ("plastic_strain".to_string(), plastic_strain)],
    }
}

/// Extrapolate von Mises stress and accumulated plastic strain from
/// integration points to nodes using each element's table of
/// [`crate::elements::table::ElementTable::extrapolation_weights`],
/// averaging across every element sharing a node.
fn extrapolate_to_nodes(model: &Model) -> (Vec<f64>, Vec<f64>) {
    let node_count = model.mesh.nodes.len();
    let mut mises_sum = vec![0.0; node_count];
    let mut plastic_strain_sum = vec![0.0; node_count];
    let mut contributions = vec![0usize; node_count];

    for e in &model.mesh.elements {
        let ip_mises: Vec<f64> = e.integration_points.iter().map(|ip| ip.stress.mises_equivalent()).collect();
        let ip_plastic_strain: Vec<f64> = e.integration_points.iter().map(|ip| ip.plastic_strain_scalar).collect();

        for (local_node, &global_node) in e.node_indices.iter().enumerate() {
            let weights = &e.table.extrapolation_weights[local_node];
            mises_sum[global_node] += weights.iter().zip(&ip_mises).map(|(w, v)| w * v).sum::<f64>();
            plastic_strain_sum[global_node] += weights.iter().zip(&ip_plastic_strain).map(|(w, v)| w * v).sum::<f64>();
            contributions[global_node] += 1;
        }
    }

    let average = |sum: Vec<f64>| -> Vec<f64> {
        sum.into_iter().zip(&contributions).map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 }).collect()
    };
    (average(mises_sum), average(plastic_strain_sum))
}

/// Periodic VTK snapshot sink, grounded on `dynela_io::{VtkWriter,
/// SnapshotSchedule}`.
pub struct VtkResultSink {
    directory: PathBuf,
    writer: VtkWriter,
    schedule: SnapshotSchedule,
    emergency_index: usize,
}

impl VtkResultSink {
    pub fn new(
        directory: impl Into<PathBuf>,
        base_name: impl Into<String>,
        start: f64,
        end: f64,
        increment: f64,
    ) -> Result<Self, DynelaError> {
        let schedule = SnapshotSchedule::new(start, end, increment)?;
        Ok(VtkResultSink {
            directory: directory.into(),
            writer: VtkWriter::new(base_name),
            schedule,
            emergency_index: 900,
        })
    }
}

impl ResultSink for VtkResultSink {
    fn maybe_write(&mut self, t: f64, model: &Model) -> Result<(), DynelaError> {
        if let Some(index) = self.schedule.poll(t) {
            let snapshot = build_snapshot(t, model);
            self.writer.write(&self.directory, index, &snapshot)?;
        }
        Ok(())
    }

    fn write_emergency(&mut self, t: f64, model: &Model) -> Result<(), DynelaError> {
        let snapshot = build_snapshot(t, model);
        self.writer.write(&self.directory, self.emergency_index, &snapshot)?;
        self.emergency_index += 1;
        Ok(())
    }
}

/// Records a fixed node's displacement and velocity components every step.
pub struct NodeHistorySink {
    writer: HistoryWriter,
    node_index: usize,
}

impl NodeHistorySink {
    pub fn new(path: &Path, node_index: usize) -> Result<Self, DynelaError> {
        let writer = HistoryWriter::create(
            path,
            &["ux", "uy", "uz", "vx", "vy", "vz"],
        )?;
        Ok(NodeHistorySink { writer, node_index })
    }

    pub fn flush(&mut self) -> Result<(), DynelaError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl HistorySink for NodeHistorySink {
    fn record(&mut self, t: f64, model: &Model) -> Result<(), DynelaError> {
        let fields = model.mesh.nodes[self.node_index].current();
        let d = fields.displacement;
        let v = fields.velocity;
        self.writer.record(t, &[d.x, d.y, d.z, v.x, v.y, v.z])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::hex8;
    use crate::materials::{LinearHardening, Material};
    use crate::mesh::{Element, Mesh};
    use crate::state::Node;
    use crate::tensor::Vec3;
    use std::sync::Arc;
    use tempfile::tempdir;

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
    fn extrapolate_to_nodes_recovers_a_uniform_field_at_every_node() {
        let mut model = unit_cube_model();
        for ip in &mut model.mesh.elements[0].integration_points {
            ip.plastic_strain_scalar = 0.2;
        }

        let (_mises, plastic_strain) = extrapolate_to_nodes(&model);
        assert_eq!(plastic_strain.len(), 8);
        for value in plastic_strain {
            assert!((value - 0.2).abs() < 1.0e-10);
        }
    }

    #[test]
    fn vtk_result_sink_writes_on_schedule() {
        let dir = tempdir().unwrap();
        let model = unit_cube_model();
        let mut sink = VtkResultSink::new(dir.path(), "bar", 0.0, 1.0, 0.5).unwrap();

        sink.maybe_write(0.0, &model).unwrap();
        assert!(dir.path().join("bar000.vtk").exists());
    }

    #[test]
    fn node_history_sink_records_a_row() {
        let dir = tempdir().unwrap();
        let model = unit_cube_model();
        let path = dir.path().join("history.txt");
        let mut sink = NodeHistorySink::new(&path, 0).unwrap();

        sink.record(0.0, &model).unwrap();
        sink.flush().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().count() >= 2);
    }
}
