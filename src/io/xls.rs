//! Results workbook reading: each district's poll-by-poll results as a grid of raw cells.

use std::{fs, path::Path, sync::LazyLock};

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use regex::Regex;

use crate::{
    results::{Cell, CellGrid, ResultSheet, YearLayout},
    types::DistrictId,
};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xls", "xlsx", "xlsm", "ods"];

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(n) => Cell::Number(*n),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

/// Convert a worksheet range to a grid addressed from A1, padding any leading offset.
fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let (row0, col0) = range.start().map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row0];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; col0];
        cells.extend(row.iter().map(to_cell));
        cells
    }));
    CellGrid::new(rows)
}

/// Read the first worksheet of a workbook.
pub fn read_workbook(path: &Path) -> Result<CellGrid> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("[io::xls] Failed to open workbook: {}", path.display()))?;
    let range = workbook.worksheet_range_at(0)
        .ok_or_else(|| anyhow!("[io::xls] Workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("[io::xls] Failed to read first worksheet of {}", path.display()))?;
    Ok(range_to_grid(&range))
}

/// District number in a results file name: the `index`-th run of digits.
pub fn district_number(file_name: &str, index: usize) -> Option<u32> {
    DIGITS.find_iter(file_name).nth(index)?.as_str().parse().ok()
}

/// Read every results workbook in `dir`, in file name order.
pub fn read_results_dir(dir: &Path, layout: &YearLayout) -> Result<Vec<ResultSheet>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("[io::xls] Failed to list results directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.retain(|path| path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())));
    paths.sort();

    paths.iter()
        .map(|path| {
            let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
            let district = district_number(file_name, layout.file_number_index)
                .ok_or_else(|| anyhow!("[io::xls] No district number in results file name: {}", path.display()))?;
            log::debug!("[io::xls] reading results of district {district} from {}", path.display());
            Ok(ResultSheet { district: DistrictId(district), grid: read_workbook(path)? })
        })
        .collect()
}
