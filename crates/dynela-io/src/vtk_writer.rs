//! Legacy-format VTK snapshot writer.
//!
//! The core solver has no notion of a file format; it hands this module a
//! plain [`Snapshot`] (nodal coordinates/fields, element connectivity, and
//! per-element scalar fields already averaged over integration points) and
//! this module is solely responsible for the on-disk representation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// One element's connectivity and VTK cell-type code for a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotCell {
    pub vtk_type: i32,
    /// Indices into [`Snapshot::coordinates`] (not raw node numbers).
    pub node_indices: Vec<usize>,
}

/// A single time-step's worth of nodal/element state, ready to be written
/// to disk by a [`VtkWriter`].
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub time: f64,
    pub coordinates: Vec<[f64; 3]>,
    /// Vector nodal fields (displacement, velocity, ...), keyed by name.
    pub node_vector_fields: Vec<(String, Vec<[f64; 3]>)>,
    /// Scalar nodal fields (temperature, mass, ...), keyed by name.
    pub node_scalar_fields: Vec<(String, Vec<f64>)>,
    pub cells: Vec<SnapshotCell>,
    /// Per-element scalar fields (von Mises stress, plastic strain, ...),
    /// typically the integration-point-averaged value.
    pub cell_scalar_fields: Vec<(String, Vec<f64>)>,
}

/// Writes [`Snapshot`]s in the legacy ASCII VTK format.
pub struct VtkWriter {
    /// File-name stem; snapshots are written to `<base><index:03>.vtk`.
    base_name: String,
}

impl VtkWriter {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self { base_name: base_name.into() }
    }

    /// Write one indexed snapshot file into `directory`.
    pub fn write(&self, directory: &Path, index: usize, snapshot: &Snapshot) -> Result<()> {
        let path = directory.join(format!("{}{:03}.vtk", self.base_name, index));
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# vtk DataFile Version 3.0")?;
        writeln!(w, "dynela result t={:.6e}", snapshot.time)?;
        writeln!(w, "ASCII")?;
        writeln!(w, "DATASET UNSTRUCTURED_GRID")?;

        writeln!(w, "POINTS {} float", snapshot.coordinates.len())?;
        for c in &snapshot.coordinates {
            writeln!(w, "{} {} {}", c[0], c[1], c[2])?;
        }

        let total_size: usize = snapshot.cells.iter().map(|c| 1 + c.node_indices.len()).sum();
        writeln!(w, "CELLS {} {}", snapshot.cells.len(), total_size)?;
        for cell in &snapshot.cells {
            write!(w, "{}", cell.node_indices.len())?;
            for idx in &cell.node_indices {
                write!(w, " {}", idx)?;
            }
            writeln!(w)?;
        }

        writeln!(w, "CELL_TYPES {}", snapshot.cells.len())?;
        for cell in &snapshot.cells {
            writeln!(w, "{}", cell.vtk_type)?;
        }

        if !snapshot.node_scalar_fields.is_empty() || !snapshot.node_vector_fields.is_empty() {
            writeln!(w, "POINT_DATA {}", snapshot.coordinates.len())?;
            for (name, values) in &snapshot.node_scalar_fields {
                writeln!(w, "SCALARS {} float 1", sanitize(name))?;
                writeln!(w, "LOOKUP_TABLE default")?;
                for v in values {
                    writeln!(w, "{}", v)?;
                }
            }
            for (name, values) in &snapshot.node_vector_fields {
                writeln!(w, "VECTORS {} float", sanitize(name))?;
                for v in values {
                    writeln!(w, "{} {} {}", v[0], v[1], v[2])?;
                }
            }
        }

        if !snapshot.cell_scalar_fields.is_empty() {
            writeln!(w, "CELL_DATA {}", snapshot.cells.len())?;
            for (name, values) in &snapshot.cell_scalar_fields {
                writeln!(w, "SCALARS {} float 1", sanitize(name))?;
                writeln!(w, "LOOKUP_TABLE default")?;
                for v in values {
                    writeln!(w, "{}", v)?;
                }
            }
        }

        Ok(())
    }
}

fn sanitize(name: &str) -> String {
    name.replace(' ', "_")
}

/// Periodic-snapshot policy: fires at `start`, `start + increment`, ... up
/// to `end`.
#[derive(Debug, Clone)]
pub struct SnapshotSchedule {
    end: f64,
    increment: f64,
    next_time: f64,
    index: usize,
}

impl SnapshotSchedule {
    pub fn new(start: f64, end: f64, increment: f64) -> Result<Self> {
        if start > end {
            return Err(crate::error::IoError::InvalidSnapshotWindow { start, end });
        }
        Ok(Self { end, increment, next_time: start, index: 0 })
    }

    /// If `t` has reached the next scheduled snapshot time (and the window
    /// hasn't closed), return the index to write and advance the schedule.
    pub fn poll(&mut self, t: f64) -> Option<usize> {
        if t >= self.next_time && t <= self.end {
            let index = self.index;
            self.index += 1;
            self.next_time += self.increment;
            Some(index)
        } else {
            None
        }
    }
}
