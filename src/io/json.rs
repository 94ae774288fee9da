//! Projection output.

use std::{fs::File, io::{BufReader, BufWriter}, path::Path};

use anyhow::{Context, Result};

use crate::projection::Projection;

/// Writes a projection as a pretty JSON array of `{name, id, results, percents, swings}`,
/// with display names sanitized.
pub fn write_projection(path: &Path, projection: &Projection) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::json] Failed to create output file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &projection.sanitized())
        .with_context(|| format!("[io::json] Failed to write projection to {}", path.display()))?;
    Ok(())
}

/// Reads a projection previously written by `write_projection`.
pub fn read_projection(path: &Path) -> Result<Projection> {
    let file = File::open(path)
        .with_context(|| format!("[io::json] Failed to read projection file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("[io::json] Invalid projection file: {}", path.display()))
}
