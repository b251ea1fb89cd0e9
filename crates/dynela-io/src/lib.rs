//! Result sinks for the dynela explicit solver.
//!
//! This crate provides:
//! - **VTK legacy-format export** (`vtk_writer`) for visualization
//! - **History-stream writer** (`history`) for scalar time-series samples
//! - A typed `IoError` shared by both

pub mod error;
pub mod history;
pub mod vtk_writer;

pub use error::{IoError, Result};
pub use history::HistoryWriter;
pub use vtk_writer::{Snapshot, SnapshotCell, SnapshotSchedule, VtkWriter};
