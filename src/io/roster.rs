//! Candidate roster reading.

use std::{fs::File, path::Path};

use anyhow::{ensure, Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, StringChunked}};

use crate::results::{Roster, RosterBook};

/// Build rosters from a headerless frame of `district, LIB, PC, NDP` rows.
fn frame_to_rosters(df: &DataFrame) -> Result<RosterBook> {
    let columns = df.get_columns();
    ensure!(columns.len() >= 4, "[io::roster] expected at least 4 columns, found {}", columns.len());

    let names = columns[..4].iter()
        .map(|column| column.str().context("[io::roster] roster columns must be text"))
        .collect::<Result<Vec<&StringChunked>>>()?;
    let cell = |col: usize, row: usize| names[col].get(row).unwrap_or_default();

    let mut book = RosterBook::new();
    for row in 0..df.height() {
        let district = cell(0, row);
        if district.trim().is_empty() { continue }
        book.insert(district, Roster::from_candidates(cell(1, row), cell(2, row), cell(3, row)));
    }
    Ok(book)
}

/// Reads a headerless roster CSV: district name, then the LIB, PC and NDP candidate names.
pub fn read_roster(path: &Path) -> Result<RosterBook> {
    let file = File::open(path)
        .with_context(|| format!("[io::roster] Failed to open roster file: {}", path.display()))?;
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::roster] Failed to read roster from {:?}", path))?;
    frame_to_rosters(&df)
}
