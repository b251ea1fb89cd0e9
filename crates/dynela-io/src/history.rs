//! Plain-text history-stream writer.
//!
//! A history record is one scalar (or small vector) sampled at a node or
//! element every few steps, e.g. the tip displacement of a bar or the
//! equatorial radius of a pressure vessel. The core only produces the
//! samples; this module owns the on-disk representation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Appends whitespace-separated `time value0 value1 ...` rows to a single
/// file, writing a header comment line on creation.
pub struct HistoryWriter {
    file: BufWriter<File>,
}

impl HistoryWriter {
    pub fn create(path: &Path, column_names: &[&str]) -> Result<Self> {
        let file = File::create(path)?;
        let mut file = BufWriter::new(file);
        write!(file, "# time")?;
        for name in column_names {
            write!(file, " {name}")?;
        }
        writeln!(file)?;
        Ok(Self { file })
    }

    pub fn record(&mut self, time: f64, values: &[f64]) -> Result<()> {
        write!(self.file, "{time:.9e}")?;
        for v in values {
            write!(self.file, " {v:.9e}")?;
        }
        writeln!(self.file)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }
}
